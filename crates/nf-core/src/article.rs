use serde::{Deserialize, Serialize};

/// A search result as handed to the caller.
///
/// Only built from upstream records that carry both a title and a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Article {
    pub headline: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub publisher: String,
}

/// Extracted page text for one requested URL.
///
/// An empty `content` means nothing could be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleContent {
    pub link: String,
    pub content: String,
}

impl ArticleContent {
    pub fn new(link: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            content: content.into(),
        }
    }

    pub fn empty(link: impl Into<String>) -> Self {
        Self::new(link, String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
