mod article_api;

pub use article_api::ArticleClient;
