use serde::{Deserialize, Serialize};

use super::ViewedArticle;

const TEASER_CHARS: usize = 150;

/// A markdown document shown in the Explore carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    pub markdown: String,
}

impl ContentItem {
    pub fn label(&self) -> String {
        format!("content-{}", self.id)
    }

    /// Text of the first level-one heading.
    pub fn heading(&self) -> Option<&str> {
        self.markdown.lines().find_map(|line| {
            line.strip_prefix('#')
                .filter(|rest| rest.starts_with(char::is_whitespace))
                .map(str::trim)
                .filter(|title| !title.is_empty())
        })
    }
}

impl From<&ContentItem> for ViewedArticle {
    fn from(item: &ContentItem) -> Self {
        let teaser: String = item.markdown.chars().take(TEASER_CHARS).collect();
        Self {
            label: item.label(),
            title: item.heading().unwrap_or("Article").to_string(),
            image: None,
            teaser: Some(format!("{}...", teaser)),
        }
    }
}
