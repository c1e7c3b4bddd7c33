mod article;
mod content;
mod history;

pub use article::{Article, SearchResult};
pub use content::ContentItem;
pub use history::{
    display_date, HistoryGroup, NewViewEntry, SearchHistoryEntry, ViewHistoryEntry, ViewedArticle,
};
