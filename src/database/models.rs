use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::token_sync::RankedToken;

/// A persisted token row, serialized in the field names the dashboard client
/// consumes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: i32,
    pub price_usd: Option<Decimal>,
    pub circulating_market_cap: Option<Decimal>,
    pub total_supply: Option<Decimal>,
    pub holders: i64,
    pub icon_url: Option<String>,
    #[serde(rename = "type")]
    pub token_type: String,
    pub network: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert/update payload for one token, with upstream string numerics already
/// converted into store types.
#[derive(Debug, Clone)]
pub struct NewToken {
    pub address: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: i32,
    pub price_usd: Option<Decimal>,
    pub circulating_market_cap: Option<Decimal>,
    pub total_supply: Option<Decimal>,
    pub holders: i64,
    pub icon_url: Option<String>,
    pub token_type: String,
    pub network: String,
}

/// A numeric field that could not be converted. Carries the offending token's
/// address so the record can be traced in logs.
#[derive(Debug, thiserror::Error)]
#[error("non-numeric {field} for token {address}")]
pub struct ConversionError {
    pub field: &'static str,
    pub address: String,
}

fn parse_decimal(
    raw: Option<&str>,
    field: &'static str,
    address: &str,
) -> Result<Option<Decimal>, ConversionError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .parse::<Decimal>()
            .map(Some)
            .map_err(|_| ConversionError {
                field,
                address: address.to_string(),
            }),
    }
}

impl NewToken {
    /// Normalizes one ranked record into the store's schema. Absent decimals
    /// and holder counts coerce to zero; a present-but-non-numeric field is a
    /// `ConversionError` for the caller to report and exclude.
    pub fn from_ranked(ranked: &RankedToken, network: &str) -> Result<Self, ConversionError> {
        let token = &ranked.token;

        let decimals = match token.decimals.as_deref() {
            None => 0,
            Some(raw) => raw.parse::<i32>().map_err(|_| ConversionError {
                field: "decimals",
                address: token.address.clone(),
            })?,
        };
        let holders = match token.holders.as_deref() {
            None => 0,
            Some(raw) => raw.parse::<i64>().map_err(|_| ConversionError {
                field: "holders",
                address: token.address.clone(),
            })?,
        };
        let price_usd = parse_decimal(
            token.exchange_rate.as_deref(),
            "exchange_rate",
            &token.address,
        )?;
        let total_supply = parse_decimal(
            token.total_supply.as_deref(),
            "total_supply",
            &token.address,
        )?;

        Ok(Self {
            address: token.address.clone(),
            symbol: token.symbol.clone(),
            name: token.name.clone(),
            decimals,
            price_usd,
            circulating_market_cap: Some(ranked.market_cap),
            total_supply,
            holders,
            icon_url: token.icon_url.clone(),
            token_type: token.token_type.clone(),
            network: network.to_string(),
        })
    }
}
