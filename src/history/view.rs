use std::sync::Arc;

use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{HistoryGroup, NewViewEntry, ViewedArticle};

/// Articles the user has opened, one row per label, grouped by day.
#[derive(Clone)]
pub struct ViewHistory {
    repository: Arc<Repository>,
}

impl ViewHistory {
    pub fn new(repository: Arc<Repository>) -> Self {
        Self { repository }
    }

    pub async fn record(&self, article: ViewedArticle) -> Result<()> {
        if article.label.trim().is_empty() {
            return Err(AppError::InvalidInput("article label is required".to_string()));
        }
        if article.title.trim().is_empty() {
            return Err(AppError::InvalidInput(format!(
                "article {} has no title",
                article.label
            )));
        }
        self.repository
            .upsert_view_history(NewViewEntry::from(article))
            .await
    }

    pub async fn list(&self) -> Vec<HistoryGroup> {
        self.repository.fetch_view_history().await
    }

    pub async fn clear(&self) -> Result<()> {
        self.repository.clear_view_history().await
    }
}
