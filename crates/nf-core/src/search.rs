use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::article::Article;
use crate::error::Error;

/// Largest page the search provider serves in one request.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    /// Size of the look-back window, ending now.
    pub days_back: u32,
    /// Comma-separated domain filter, e.g. `"bbc.co.uk,techcrunch.com"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
    pub max_results: u32,
    pub language: String,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            days_back: 7,
            sources: None,
            max_results: 10,
            language: "en".to_string(),
        }
    }

    pub fn with_days_back(mut self, days_back: u32) -> Self {
        self.days_back = days_back;
        self
    }

    /// Blank filters are treated as no filter.
    pub fn with_sources(mut self, sources: Option<String>) -> Self {
        self.sources = sources
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// The page size to request: `max_results` capped at the provider limit.
    pub fn page_size(&self) -> u32 {
        self.max_results.min(MAX_PAGE_SIZE)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.query.trim().is_empty() {
            return Err(Error::invalid_request("search query is empty"));
        }
        if self.max_results == 0 {
            return Err(Error::invalid_request("max_results must be greater than zero"));
        }
        Ok(())
    }
}

/// A news search backend.
///
/// Implementations report failures as `Err`; the fail-soft surface above them
/// turns any error into an empty result list.
#[async_trait]
pub trait ArticleSearch: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Article>, Error>;
}
