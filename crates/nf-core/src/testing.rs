//! Test doubles shared across the workspace.
//! Only compiled when running tests or with the `testing` feature.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::article::Article;
use crate::error::Error;
use crate::extract::ExtractionStrategy;
use crate::search::{ArticleSearch, SearchQuery};

/// A search backend that returns pre-configured results.
pub struct MockSearch {
    responses: Mutex<Vec<Result<Vec<Article>, Error>>>,
    /// Captured queries (for assertion).
    pub captured_queries: Mutex<Vec<SearchQuery>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            captured_queries: Mutex::new(Vec::new()),
        }
    }

    /// Queue articles for the next search() call.
    /// Responses are returned in FIFO order (first queued = first returned).
    pub fn queue_articles(&self, articles: Vec<Article>) {
        self.responses.lock().unwrap().insert(0, Ok(articles));
    }

    /// Queue a failure for the next search() call.
    pub fn queue_error(&self, error: Error) {
        self.responses.lock().unwrap().insert(0, Err(error));
    }

    pub fn request_count(&self) -> usize {
        self.captured_queries.lock().unwrap().len()
    }

    pub fn last_query(&self) -> Option<SearchQuery> {
        self.captured_queries.lock().unwrap().last().cloned()
    }
}

impl Default for MockSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleSearch for MockSearch {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Article>, Error> {
        self.captured_queries.lock().unwrap().push(query.clone());
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(Error::Unknown("No mock search response queued".to_string())))
    }
}

/// An extraction strategy with a fixed outcome per URL.
///
/// URLs without a scripted outcome fail, passing them down the chain.
pub struct ScriptedStrategy {
    name: String,
    outcomes: HashMap<String, String>,
    /// URLs this strategy was asked to extract, in call order.
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedStrategy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcomes: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_text(mut self, link: impl Into<String>, text: impl Into<String>) -> Self {
        self.outcomes.insert(link.into(), text.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ExtractionStrategy for ScriptedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self, link: &str) -> Result<String, Error> {
        self.calls.lock().unwrap().push(link.to_string());
        self.outcomes
            .get(link)
            .cloned()
            .ok_or_else(|| Error::extraction(self.name.clone(), format!("no scripted text for {}", link)))
    }
}
