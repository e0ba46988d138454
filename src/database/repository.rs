use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use super::models::{NewToken, Token};

/// Rows returned by the read path, independent of the sync window size.
const TOP_TOKENS_LIMIT: i64 = 100;

pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bulk idempotent upsert keyed by (address, network). The batch runs in
    /// one transaction: either every row lands or the failure rolls all of
    /// them back. Decimals and token type are set on insert only; the
    /// remaining fields follow each refresh.
    pub async fn upsert_tokens(&self, tokens: &[NewToken]) -> Result<u64> {
        if tokens.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for token in tokens {
            sqlx::query(
                r#"
                INSERT INTO tokens (address, network, symbol, name, decimals,
                                    price_usd, circulating_market_cap, total_supply,
                                    holders, icon_url, token_type)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                ON CONFLICT (address, network) DO UPDATE SET
                    symbol = EXCLUDED.symbol,
                    name = EXCLUDED.name,
                    price_usd = EXCLUDED.price_usd,
                    circulating_market_cap = EXCLUDED.circulating_market_cap,
                    holders = EXCLUDED.holders,
                    icon_url = EXCLUDED.icon_url,
                    total_supply = EXCLUDED.total_supply,
                    updated_at = NOW()
                "#,
            )
            .bind(&token.address)
            .bind(&token.network)
            .bind(&token.symbol)
            .bind(&token.name)
            .bind(token.decimals)
            .bind(token.price_usd)
            .bind(token.circulating_market_cap)
            .bind(token.total_supply)
            .bind(token.holders)
            .bind(&token.icon_url)
            .bind(&token.token_type)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        info!("Upserted batch of {} tokens", tokens.len());
        Ok(tokens.len() as u64)
    }

    /// The served token set: top rows for a network by market cap descending.
    pub async fn get_top_tokens(&self, network: &str) -> Result<Vec<Token>> {
        let tokens = sqlx::query_as::<_, Token>(
            r#"
            SELECT address, symbol, name, decimals, price_usd,
                   circulating_market_cap, total_supply, holders, icon_url,
                   token_type, network, created_at, updated_at
            FROM tokens
            WHERE network = $1
            ORDER BY circulating_market_cap DESC NULLS LAST
            LIMIT $2
            "#,
        )
        .bind(network)
        .bind(TOP_TOKENS_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens)
    }
}
