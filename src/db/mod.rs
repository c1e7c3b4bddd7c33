mod repository;
mod schema;

pub use repository::{Repository, SEARCH_HISTORY_LIMIT};
pub use schema::SEED_CONTENT;
