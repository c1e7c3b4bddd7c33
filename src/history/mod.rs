mod search;
mod view;

pub use search::SearchHistory;
pub use view::ViewHistory;
