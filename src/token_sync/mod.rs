pub mod aggregator;
pub mod explorer;
pub mod ranking;
pub mod scheduler;
pub mod service;

pub use aggregator::TokenAggregator;
pub use explorer::{ExplorerClient, ExplorerError, TokenPageSource};
pub use ranking::{filter_and_rank, merge_by_address};
pub use scheduler::TokenRefreshScheduler;
pub use service::{RefreshError, RefreshOutcome, TokenSyncService};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One raw token record as the explorer's `/tokens` listing returns it.
/// All numeric fields arrive as strings and are converted only at the
/// persistence boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerToken {
    pub address: String,
    pub circulating_market_cap: Option<String>,
    pub decimals: Option<String>,
    pub exchange_rate: Option<String>,
    pub holders: Option<String>,
    pub icon_url: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub total_supply: Option<String>,
    #[serde(rename = "type")]
    pub token_type: String,
}

/// Pagination cursor echoed back to the explorer verbatim. The upstream
/// response carries more cursor fields than these; only these two are
/// required to continue the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextPageParams {
    pub contract_address_hash: String,
    pub items_count: u32,
}

impl NextPageParams {
    /// Query parameters for the follow-up page request.
    pub fn as_query(&self) -> [(&'static str, String); 2] {
        [
            ("contract_address_hash", self.contract_address_hash.clone()),
            ("items_count", self.items_count.to_string()),
        ]
    }
}

/// One decoded page of the token listing.
#[derive(Debug, Clone)]
pub struct TokenPage {
    pub items: Vec<ExplorerToken>,
    pub next_page_params: Option<NextPageParams>,
}

/// A token that survived filtering, with its market cap parsed as the
/// ranking sort key.
#[derive(Debug, Clone)]
pub struct RankedToken {
    pub token: ExplorerToken,
    pub market_cap: Decimal,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Upper bound on explorer page fetches per refresh cycle.
    pub max_pages: usize,
    /// Size of the ranked window retained after filtering.
    pub top_n: usize,
    pub refresh_interval: Duration,
    /// Bound on a read-triggered synchronous refresh.
    pub cache_miss_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_pages: 3,
            top_n: 100,
            refresh_interval: Duration::from_secs(20 * 60),
            cache_miss_timeout: Duration::from_secs(30),
        }
    }
}
