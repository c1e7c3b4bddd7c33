use serde::{Deserialize, Serialize};

use super::ViewedArticle;

/// Full article as returned by the article lookup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub teaser: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Article {
    pub fn viewed(&self, label: &str) -> ViewedArticle {
        ViewedArticle {
            label: label.to_string(),
            title: self.title.clone(),
            image: self.image.clone(),
            teaser: self.teaser.clone(),
        }
    }
}

/// One hit from the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub label: String,
    pub title: String,
    #[serde(default)]
    pub teaser: Option<String>,
    #[serde(rename = "searchRelevance", default)]
    pub search_relevance: Option<f64>,
}

impl SearchResult {
    pub fn viewed(&self) -> ViewedArticle {
        ViewedArticle {
            label: self.label.clone(),
            title: self.title.clone(),
            image: None,
            teaser: self.teaser.clone(),
        }
    }
}
