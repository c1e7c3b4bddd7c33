use std::sync::Arc;

use crate::db::Repository;
use crate::error::Result;
use crate::models::SearchHistoryEntry;

/// Recent search keywords, deduplicated and most recent first.
#[derive(Clone)]
pub struct SearchHistory {
    repository: Arc<Repository>,
}

impl SearchHistory {
    pub fn new(repository: Arc<Repository>) -> Self {
        Self { repository }
    }

    /// Record a search and return the refreshed list. Blank input is ignored.
    pub async fn record(&self, keyword: &str) -> Result<Vec<SearchHistoryEntry>> {
        let keyword = keyword.trim();
        if !keyword.is_empty() {
            self.repository.upsert_search_keyword(keyword).await?;
        }
        Ok(self.list().await)
    }

    pub async fn list(&self) -> Vec<SearchHistoryEntry> {
        self.repository.fetch_search_history().await
    }

    pub async fn keywords(&self) -> Vec<String> {
        self.list().await.into_iter().map(|e| e.keyword).collect()
    }

    pub async fn clear(&self) -> Result<()> {
        self.repository.clear_search_history().await
    }
}
