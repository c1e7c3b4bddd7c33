use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Long-form calendar label, e.g. "December 10, 2025".
pub fn display_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub id: i64,
    pub keyword: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewHistoryEntry {
    pub id: i64,
    pub label: String,
    pub title: String,
    pub image: String,
    pub teaser: String,
    pub timestamp: DateTime<Utc>,
    /// Calendar day of `timestamp` in the store's offset
    pub date: NaiveDate,
}

/// What a screen knows about an article when it is opened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewedArticle {
    pub label: String,
    pub title: String,
    pub image: Option<String>,
    pub teaser: Option<String>,
}

/// Row payload written by the store; optional fields already defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewViewEntry {
    pub label: String,
    pub title: String,
    pub image: String,
    pub teaser: String,
}

impl From<ViewedArticle> for NewViewEntry {
    fn from(article: ViewedArticle) -> Self {
        Self {
            label: article.label,
            title: article.title,
            image: article.image.unwrap_or_default(),
            teaser: article.teaser.unwrap_or_default(),
        }
    }
}

impl From<&ViewHistoryEntry> for ViewedArticle {
    fn from(entry: &ViewHistoryEntry) -> Self {
        Self {
            label: entry.label.clone(),
            title: entry.title.clone(),
            image: Some(entry.image.clone()).filter(|s| !s.is_empty()),
            teaser: Some(entry.teaser.clone()).filter(|s| !s.is_empty()),
        }
    }
}

/// Views from a single calendar day, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryGroup {
    pub date: NaiveDate,
    pub entries: Vec<ViewHistoryEntry>,
}

impl HistoryGroup {
    pub fn title(&self) -> String {
        display_date(self.date)
    }
}
