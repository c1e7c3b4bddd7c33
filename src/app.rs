use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::db::Repository;
use crate::error::Result;
use crate::history::{SearchHistory, ViewHistory};
use crate::models::{Article, ContentItem, SearchResult, ViewHistoryEntry, ViewedArticle};
use crate::services::ArticleClient;

/// Composition root: one store shared by both history managers.
pub struct App {
    pub repository: Arc<Repository>,
    pub search_history: SearchHistory,
    pub view_history: ViewHistory,
    api: ArticleClient,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let mut repository = Repository::new(&config.db_path);
        if let Some(offset) = config.utc_offset()? {
            repository = repository.with_offset(offset);
        }
        let api = ArticleClient::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self::with_parts(repository, api).await)
    }

    /// Initialize the store and wire the managers. A store that fails to
    /// initialize leaves the app running without history.
    pub async fn with_parts(repository: Repository, api: ArticleClient) -> Self {
        if let Err(e) = repository.initialize().await {
            tracing::error!("Failed to initialize database, history is disabled: {}", e);
        }

        let repository = Arc::new(repository);
        Self {
            search_history: SearchHistory::new(Arc::clone(&repository)),
            view_history: ViewHistory::new(Arc::clone(&repository)),
            repository,
            api,
        }
    }

    pub async fn content(&self) -> Vec<ContentItem> {
        self.repository.fetch_all_content().await
    }

    /// Record a carousel item as viewed.
    pub async fn open_content(&self, item: &ContentItem) {
        self.record_view(ViewedArticle::from(item)).await;
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        if let Err(e) = self.search_history.record(query).await {
            tracing::warn!("Failed to record search {:?}: {}", query, e);
        }
        self.api.search(query.trim()).await
    }

    pub async fn open_article(&self, label: &str) -> Result<Article> {
        let article = self.api.fetch_article(label).await?;
        self.record_view(article.viewed(label)).await;
        Ok(article)
    }

    pub async fn open_search_result(&self, result: &SearchResult) -> Result<Article> {
        self.record_view(result.viewed()).await;
        self.api.fetch_article(&result.label).await
    }

    /// Re-open an article from the history list, refreshing its timestamp.
    pub async fn reopen(&self, entry: &ViewHistoryEntry) -> Result<Article> {
        self.record_view(ViewedArticle::from(entry)).await;
        self.api.fetch_article(&entry.label).await
    }

    async fn record_view(&self, article: ViewedArticle) {
        let label = article.label.clone();
        if let Err(e) = self.view_history.record(article).await {
            tracing::warn!("Failed to record view of {}: {}", label, e);
        }
    }
}
