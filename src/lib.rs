//! Local persistence for the Explore content browser: seeded carousel
//! content, search history and view history over an embedded SQLite store.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod models;
pub mod services;

pub use app::App;
pub use config::Config;
pub use db::Repository;
pub use error::{AppError, Result};
