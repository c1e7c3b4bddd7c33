use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Article, SearchResult};

/// Client for the remote article lookup and search endpoints.
pub struct ArticleClient {
    client: Client,
    base_url: Url,
}

impl ArticleClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("invalid api_base_url {}: {}", base_url, e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("explore-history/1.0")
            .build()?;
        Ok(Self { client, base_url })
    }

    fn article_url(&self, label: &str) -> Result<Url> {
        let path = format!("article/{}", urlencoding::encode(label));
        self.base_url
            .join(&path)
            .map_err(|e| anyhow::anyhow!("Bad article url for {}: {}", label, e).into())
    }

    fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = self
            .base_url
            .join("search")
            .map_err(|e| anyhow::anyhow!("Bad search url: {}", e))?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    pub async fn fetch_article(&self, label: &str) -> Result<Article> {
        let response = self.client.get(self.article_url(label)?).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Api(format!(
                "Failed to fetch article {}: HTTP {}",
                label,
                response.status()
            )));
        }

        let article: Article = response.json().await?;
        Ok(article)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let response = self.client.get(self.search_url(query)?).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AppError::Api(format!("Search failed: {}", error_text)));
        }

        let results: Vec<SearchResult> = response.json().await?;
        tracing::debug!("Search for {:?} returned {} results", query, results.len());
        Ok(results)
    }
}
