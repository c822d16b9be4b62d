//! The schema-governed response object and its validator.
//!
//! [`validate`] is total: whatever it is given, it returns a [`NewsResponse`]
//! that satisfies the response schema, repairing a partial `overview` in place
//! and replacing anything else that is malformed with an overview-only
//! fallback explaining what went wrong.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, warn};
use url::Url;

use crate::article::Article;
use crate::error::Error;

/// Top-level keys a response may carry.
pub const RESPONSE_KEYS: [&str; 2] = ["articles", "overview"];

pub const INVALID_FORMAT: &str = "Invalid response format.";
pub const INVALID_KEYS: &str = "Invalid response keys.";
pub const INVALID_ARTICLE: &str = "Invalid article format.";
pub const INVALID_OVERVIEW: &str = "Invalid overview format.";
pub const PROCESSING_FAILED: &str = "Failed to process response.";
pub const PARTIAL_SUMMARY: &str = "Partial summary due to missing content.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub articles: Option<Vec<Article>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<Overview>,
}

/// Plain-text synopsis plus the URLs it was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Overview {
    pub text: String,
    pub sources: Vec<String>,
}

impl NewsResponse {
    /// `{}`: no determinable intent.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self {
            articles: Some(articles),
            overview: None,
        }
    }

    pub fn with_overview(text: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            articles: None,
            overview: Some(Overview {
                text: text.into(),
                sources,
            }),
        }
    }

    /// Overview-only response carrying an explanatory message and no sources.
    pub fn fallback(message: &str) -> Self {
        Self::with_overview(message, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_none() && self.overview.is_none()
    }
}

#[derive(Debug)]
enum Rejection {
    Format,
    Keys(Vec<String>),
    Article(Value),
    Overview(Value),
    Internal(Error),
}

impl Rejection {
    fn message(&self) -> &'static str {
        match self {
            Rejection::Format => INVALID_FORMAT,
            Rejection::Keys(_) => INVALID_KEYS,
            Rejection::Article(_) => INVALID_ARTICLE,
            Rejection::Overview(_) => INVALID_OVERVIEW,
            Rejection::Internal(_) => PROCESSING_FAILED,
        }
    }
}

/// Check a candidate response against the schema.
pub fn validate(candidate: Value) -> NewsResponse {
    match check(candidate) {
        Ok(response) => response,
        Err(rejection) => {
            match &rejection {
                Rejection::Format => error!("Response is not an object"),
                Rejection::Keys(keys) => error!(?keys, "Invalid keys in response"),
                Rejection::Article(article) => error!(%article, "Invalid article format"),
                Rejection::Overview(overview) => error!(%overview, "Invalid overview format"),
                Rejection::Internal(e) => error!(error = %e, "Error validating response"),
            }
            NewsResponse::fallback(rejection.message())
        }
    }
}

fn check(candidate: Value) -> Result<NewsResponse, Rejection> {
    let Value::Object(mut fields) = candidate else {
        return Err(Rejection::Format);
    };

    let unknown: Vec<String> = fields
        .keys()
        .filter(|key| !RESPONSE_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(Rejection::Keys(unknown));
    }

    let articles = fields.remove("articles").map(check_articles).transpose()?;
    let overview = match fields.remove("overview") {
        None => None,
        Some(Value::Object(overview)) => Some(repair_overview(overview)?),
        Some(other) => return Err(Rejection::Overview(other)),
    };

    Ok(NewsResponse { articles, overview })
}

/// Fails on the first malformed element; no partial filtering.
fn check_articles(value: Value) -> Result<Vec<Article>, Rejection> {
    let Value::Array(items) = value else {
        return Err(Rejection::Article(value));
    };

    items
        .into_iter()
        .map(|item| match serde_json::from_value::<Article>(item.clone()) {
            Ok(article) if is_well_formed(&article) => Ok(article),
            _ => Err(Rejection::Article(item)),
        })
        .collect()
}

/// A non-blank headline and an absolute URL link.
fn is_well_formed(article: &Article) -> bool {
    !article.headline.trim().is_empty() && Url::parse(&article.link).is_ok()
}

#[derive(Deserialize)]
struct PartialOverview {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    sources: Option<Vec<String>>,
}

/// Fill in whatever the overview lacks instead of discarding it. Unrecognized
/// sub-keys are dropped.
fn repair_overview(fields: Map<String, Value>) -> Result<Overview, Rejection> {
    let partial: PartialOverview = serde_json::from_value(Value::Object(fields.clone()))
        .map_err(|e| Rejection::Internal(e.into()))?;

    if partial.text.is_none() || partial.sources.is_none() {
        warn!(overview = ?fields, "Missing required fields in overview, repairing");
    }

    Ok(Overview {
        text: partial.text.unwrap_or_else(|| PARTIAL_SUMMARY.to_string()),
        sources: partial.sources.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_article(n: usize) -> Article {
        Article {
            headline: format!("Headline {}", n),
            link: format!("https://news.example/{}", n),
            summary: (n % 2 == 0).then(|| format!("Summary {}", n)),
            publisher: "Example".to_string(),
        }
    }

    fn assert_fallback(response: NewsResponse, message: &str) {
        assert_eq!(response, NewsResponse::fallback(message));
    }

    #[test]
    fn test_valid_responses_are_fixed_points() {
        let cases = vec![
            NewsResponse::empty(),
            NewsResponse::with_articles(vec![]),
            NewsResponse::with_articles((0..3).map(sample_article).collect()),
            NewsResponse::with_overview("Short text.", vec!["https://a.example".to_string()]),
            NewsResponse {
                articles: Some(vec![sample_article(1)]),
                overview: Some(Overview {
                    text: "Both present.".to_string(),
                    sources: vec![],
                }),
            },
        ];

        for case in cases {
            let value = serde_json::to_value(&case).unwrap();
            assert_eq!(validate(value), case);
        }
    }

    #[test]
    fn test_non_object_is_rejected() {
        for candidate in [json!(null), json!("text"), json!(42), json!([{"articles": []}])] {
            assert_fallback(validate(candidate), INVALID_FORMAT);
        }
    }

    #[test]
    fn test_unknown_top_level_key_is_rejected() {
        let candidate = json!({
            "summary": {"summary_text": "old naming", "source_urls": []}
        });
        assert_fallback(validate(candidate), INVALID_KEYS);

        let candidate = json!({"articles": [], "extra": true});
        assert_fallback(validate(candidate), INVALID_KEYS);
    }

    #[test]
    fn test_article_missing_required_fields_is_rejected() {
        let candidate = json!({"articles": [{"headline": "x"}]});
        assert_fallback(validate(candidate), INVALID_ARTICLE);
    }

    #[test]
    fn test_articles_fail_fast_on_first_bad_element() {
        let good = serde_json::to_value(sample_article(1)).unwrap();
        let candidate = json!({
            "articles": [good, {"headline": "no link", "publisher": "P"}, good]
        });
        assert_fallback(validate(candidate), INVALID_ARTICLE);
    }

    #[test]
    fn test_article_shape_violations_are_rejected() {
        let cases = [
            json!({"articles": {"headline": "not a list"}}),
            json!({"articles": ["just a string"]}),
            json!({"articles": [{"headline": "x", "link": "https://a.example", "publisher": 7}]}),
            json!({"articles": [{"headline": "x", "link": "https://a.example", "publisher": "P", "author": "A"}]}),
        ];
        for candidate in cases {
            assert_fallback(validate(candidate), INVALID_ARTICLE);
        }
    }

    #[test]
    fn test_article_values_are_checked() {
        let cases = [
            json!({"articles": [{"headline": "", "link": "https://a.example", "publisher": "P"}]}),
            json!({"articles": [{"headline": "   ", "link": "https://a.example", "publisher": "P"}]}),
            json!({"articles": [{"headline": "x", "link": "not a uri", "publisher": "P"}]}),
            json!({"articles": [{"headline": "x", "link": "/relative/path", "publisher": "P"}]}),
        ];
        for candidate in cases {
            assert_fallback(validate(candidate), INVALID_ARTICLE);
        }
    }

    #[test]
    fn test_overview_missing_sources_is_repaired() {
        let candidate = json!({"overview": {"text": "Kept text."}});
        assert_eq!(
            validate(candidate),
            NewsResponse::with_overview("Kept text.", vec![])
        );
    }

    #[test]
    fn test_overview_missing_text_is_repaired() {
        let candidate = json!({"overview": {"sources": ["https://a.example/1"]}});
        assert_eq!(
            validate(candidate),
            NewsResponse::with_overview(PARTIAL_SUMMARY, vec!["https://a.example/1".to_string()])
        );

        let candidate = json!({"overview": {}});
        assert_eq!(
            validate(candidate),
            NewsResponse::with_overview(PARTIAL_SUMMARY, vec![])
        );
    }

    #[test]
    fn test_overview_unknown_subkeys_are_dropped() {
        let candidate = json!({"overview": {"text": "t", "sources": [], "confidence": 0.4}});
        assert_eq!(validate(candidate), NewsResponse::with_overview("t", vec![]));
    }

    #[test]
    fn test_overview_wrong_types() {
        assert_fallback(validate(json!({"overview": "plain string"})), INVALID_OVERVIEW);
        assert_fallback(
            validate(json!({"overview": {"text": "t", "sources": [1, 2]}})),
            PROCESSING_FAILED,
        );
    }

    #[test]
    fn test_fallbacks_are_schema_valid() {
        for message in [INVALID_FORMAT, INVALID_KEYS, INVALID_ARTICLE, INVALID_OVERVIEW, PROCESSING_FAILED] {
            let fallback = NewsResponse::fallback(message);
            let value = serde_json::to_value(&fallback).unwrap();
            assert_eq!(validate(value), fallback);
        }
    }
}
