use std::sync::Arc;
use tracing::info;

use super::{ExplorerError, ExplorerToken, TokenPageSource};

/// Walks the paginated token listing, concatenating pages until the cursor
/// runs out or the page cap is hit. Any fetch failure aborts the whole
/// aggregation so a refresh never persists a partial listing.
pub struct TokenAggregator {
    source: Arc<dyn TokenPageSource>,
    max_pages: usize,
}

impl TokenAggregator {
    pub fn new(source: Arc<dyn TokenPageSource>, max_pages: usize) -> Self {
        Self { source, max_pages }
    }

    pub async fn collect(&self) -> Result<Vec<ExplorerToken>, ExplorerError> {
        let mut all_tokens = Vec::new();
        let mut cursor = None;

        for page_number in 0..self.max_pages {
            let page = self.source.fetch_page(cursor.as_ref()).await?;
            info!(
                "Fetched page {} with {} tokens from {}",
                page_number + 1,
                page.items.len(),
                self.source.source_name()
            );
            all_tokens.extend(page.items);

            match page.next_page_params {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(all_tokens)
    }
}
