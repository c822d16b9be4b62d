//! nf-core: Core types and traits for news-fetch
//!
//! This crate provides the response schema and its validator, the article
//! records passed between pipeline stages, and the seams (search backends,
//! extraction strategies, agent tools) the rest of the workspace plugs into.

pub mod article;
pub mod error;
pub mod extract;
pub mod response;
pub mod schema;
pub mod search;
pub mod tool;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use article::{Article, ArticleContent};
pub use error::Error;
pub use extract::{DownloadState, ExtractionStrategy};
pub use response::{validate, NewsResponse, Overview};
pub use schema::response_schema;
pub use search::{ArticleSearch, SearchQuery};
pub use tool::{PropertySchema, Tool, ToolDefinition, ToolOutput, ToolParameters, ToolRegistry};

pub type Result<T> = std::result::Result<T, Error>;
