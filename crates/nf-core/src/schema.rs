//! Wire-level description of the response contract.
//!
//! The Rust types in [`crate::response`] are the source of truth; this JSON
//! Schema document exists for the agent layer and is pinned to those types by
//! the tests below.

use serde_json::{json, Value};

pub const ARTICLE_REQUIRED: [&str; 3] = ["headline", "link", "publisher"];
pub const OVERVIEW_REQUIRED: [&str; 2] = ["text", "sources"];

/// JSON Schema (draft-07) for [`crate::NewsResponse`].
pub fn response_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "News Fetcher Response",
        "description": "Either a list of news articles, an overview of news content, or both. An empty object means no determinable intent.",
        "type": "object",
        "properties": {
            "articles": {
                "description": "News articles matching the query, in relevance order.",
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "headline": {"type": "string", "description": "The headline of the article."},
                        "link": {"type": "string", "format": "uri", "description": "The article's URL."},
                        "summary": {"type": "string", "description": "A short summary of the article (optional)."},
                        "publisher": {"type": "string", "description": "The name of the article's publisher."}
                    },
                    "required": ARTICLE_REQUIRED,
                    "additionalProperties": false
                }
            },
            "overview": {
                "description": "A plain-text summary of news content from provided or fetched articles.",
                "type": "object",
                "properties": {
                    "text": {"type": "string", "description": "A concise plain-text summary."},
                    "sources": {
                        "type": "array",
                        "description": "URLs of the articles the summary was built from.",
                        "items": {"type": "string", "format": "uri"}
                    }
                },
                "required": OVERVIEW_REQUIRED,
                "additionalProperties": false
            }
        },
        "additionalProperties": false,
        "minProperties": 0
    })
}
