use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Duration;
use tracing::warn;

use super::{ExplorerToken, NextPageParams, TokenPage};

pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.mantle.xyz/api/v2/tokens";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Explorer API error: {0}")]
    Api(String),
}

/// A source of token-listing pages. The aggregator drives this one page at a
/// time, feeding each page's cursor into the next call.
#[async_trait]
pub trait TokenPageSource: Send + Sync {
    async fn fetch_page(&self, cursor: Option<&NextPageParams>)
        -> Result<TokenPage, ExplorerError>;
    fn source_name(&self) -> &str;
}

pub struct ExplorerClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct RawPage {
    items: Vec<Value>,
    next_page_params: Option<NextPageParams>,
}

impl ExplorerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

/// Converts raw page items into typed records one by one. A malformed item is
/// logged and skipped; it never fails the page it arrived on.
fn parse_items(items: Vec<Value>) -> Vec<ExplorerToken> {
    let mut tokens = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<ExplorerToken>(item) {
            Ok(token) => tokens.push(token),
            Err(e) => warn!("Skipping malformed token item: {}", e),
        }
    }
    tokens
}

#[async_trait]
impl TokenPageSource for ExplorerClient {
    async fn fetch_page(
        &self,
        cursor: Option<&NextPageParams>,
    ) -> Result<TokenPage, ExplorerError> {
        let mut request = self
            .client
            .get(&self.base_url)
            .timeout(REQUEST_TIMEOUT)
            .header("Accept", "application/json");
        if let Some(cursor) = cursor {
            request = request.query(&cursor.as_query());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ExplorerError::Api(format!(
                "unexpected status {} from {}",
                response.status(),
                self.base_url
            )));
        }

        let body = response.text().await?;
        let page: RawPage = serde_json::from_str(&body)?;

        Ok(TokenPage {
            items: parse_items(page.items),
            next_page_params: page.next_page_params,
        })
    }

    fn source_name(&self) -> &str {
        "mantle_explorer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cursor_query_forwards_values_verbatim() {
        let cursor = NextPageParams {
            contract_address_hash: "0xABC".to_string(),
            items_count: 50,
        };

        let query = cursor.as_query();
        assert_eq!(query[0], ("contract_address_hash", "0xABC".to_string()));
        assert_eq!(query[1], ("items_count", "50".to_string()));
    }

    #[test]
    fn malformed_items_are_quarantined_individually() {
        let items = vec![
            json!({
                "address": "0x1111",
                "circulating_market_cap": "1000.5",
                "decimals": "18",
                "exchange_rate": "1.02",
                "holders": "250",
                "icon_url": null,
                "name": "Wrapped Ether",
                "symbol": "WETH",
                "total_supply": "1000000000000000000000",
                "type": "ERC-20"
            }),
            // address must be a string; this item is dropped, not the page
            json!({ "address": 42, "type": "ERC-20" }),
        ];

        let tokens = parse_items(items);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].address, "0x1111");
        assert_eq!(tokens[0].symbol.as_deref(), Some("WETH"));
    }

    #[test]
    fn page_decodes_with_and_without_cursor() {
        let body = json!({
            "items": [],
            "next_page_params": {
                "contract_address_hash": "0xDEF",
                "items_count": 50,
                "holder_count": 7,
                "is_name_null": false
            }
        });
        let page: RawPage = serde_json::from_value(body).unwrap();
        assert_eq!(
            page.next_page_params,
            Some(NextPageParams {
                contract_address_hash: "0xDEF".to_string(),
                items_count: 50
            })
        );

        let last: RawPage = serde_json::from_value(json!({ "items": [] })).unwrap();
        assert!(last.next_page_params.is_none());
    }
}
