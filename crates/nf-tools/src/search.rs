//! Article search against the NewsAPI `everything` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use nf_core::{Article, ArticleSearch, Error, SearchQuery};

const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

/// Publisher used when the provider omits the source name.
pub const UNKNOWN_PUBLISHER: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// NewsAPI key. Usually supplied through `NEWS_API_KEY`.
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub days_back: u32,
    pub language: String,
    pub max_articles: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 15,
            days_back: 7,
            language: "en".to_string(),
            max_articles: 10,
        }
    }
}

impl SearchConfig {
    /// A query for `topic` using the configured defaults.
    pub fn query(&self, topic: impl Into<String>) -> SearchQuery {
        SearchQuery::new(topic)
            .with_days_back(self.days_back)
            .with_max_results(self.max_articles)
            .with_language(self.language.clone())
    }
}

pub struct NewsApiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("nf/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request_url(&self, query: &SearchQuery, now: DateTime<Utc>) -> Result<Url, Error> {
        let (from, to) = window(query.days_back, now);
        let mut params = vec![
            ("q", query.query.clone()),
            ("from", from),
            ("to", to),
            ("language", query.language.clone()),
            ("sortBy", "relevancy".to_string()),
            ("pageSize", query.page_size().to_string()),
        ];
        if let Some(domains) = &query.sources {
            params.push(("domains", domains.clone()));
        }

        Url::parse_with_params(&format!("{}/everything", self.base_url), &params)
            .map_err(|e| Error::config(format!("Invalid search base URL '{}': {}", self.base_url, e)))
    }

    fn parse_error(status: u16, body: &str) -> Error {
        #[derive(Deserialize)]
        struct ErrorResponse {
            #[serde(default)]
            code: Option<String>,
            message: String,
        }

        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(err) => {
                let message = match err.code {
                    Some(code) => format!("{}: {}", code, err.message),
                    None => err.message,
                };
                Error::from_status(status, message)
            }
            Err(_) => Error::from_status(status, body.to_string()),
        }
    }
}

#[async_trait]
impl ArticleSearch for NewsApiClient {
    fn name(&self) -> &str {
        "newsapi"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Article>, Error> {
        query.validate()?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::auth("no NewsAPI key configured (set NEWS_API_KEY)"))?;

        let url = self.request_url(query, Utc::now())?;
        debug!(%url, "NewsAPI request");

        let response = self
            .client
            .get(url)
            .header("X-Api-Key", api_key)
            .send()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &body));
        }

        let body: EverythingResponse = response
            .json()
            .await
            .map_err(|e| Error::serialization(e.to_string()))?;

        if body.status != "ok" {
            let message = body.message.unwrap_or_else(|| "provider reported an error".to_string());
            return Err(Error::api(status.as_u16(), message));
        }

        let received = body.articles.len();
        let articles = normalize(body.articles, query.max_results as usize);
        info!(query = %query.query, received, kept = articles.len(), "Fetched articles");
        Ok(articles)
    }
}

/// Run a search, logging any failure and degrading it to zero results.
pub async fn fetch_articles(search: &dyn ArticleSearch, query: &SearchQuery) -> Vec<Article> {
    match search.search(query).await {
        Ok(articles) => articles,
        Err(e) => {
            error!(query = %query.query, backend = search.name(), error = %e, "Error fetching articles");
            Vec::new()
        }
    }
}

/// `[now - days_back, now]` as NewsAPI timestamps.
fn window(days_back: u32, now: DateTime<Utc>) -> (String, String) {
    let from = TimeDelta::try_days(i64::from(days_back))
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let format = "%Y-%m-%dT%H:%M:%S";
    (from.format(format).to_string(), now.format(format).to_string())
}

#[derive(Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Value>,
}

/// A non-blank string field of a provider record.
fn text_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key)?.as_str().filter(|s| !s.trim().is_empty())
}

/// Only a title and URL are required; other fields are read leniently and
/// ignored when they have the wrong shape.
fn to_article(value: &Value) -> Option<Article> {
    let headline = text_field(value, "title")?;
    let link = text_field(value, "url")?;
    let publisher = value
        .get("source")
        .and_then(|source| text_field(source, "name"))
        .unwrap_or(UNKNOWN_PUBLISHER);
    let summary = value.get("description").and_then(Value::as_str);

    Some(Article {
        headline: headline.to_string(),
        link: link.to_string(),
        summary: summary.map(str::to_string),
        publisher: publisher.to_string(),
    })
}

/// Drop records that cannot become an [`Article`], keep provider order, cap
/// at `max_results`.
fn normalize(raw: Vec<Value>, max_results: usize) -> Vec<Article> {
    raw.iter().filter_map(to_article).take(max_results).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::fixture::serve;

    fn provider_articles() -> Vec<Value> {
        vec![
            json!({
                "source": {"id": "bbc-news", "name": "BBC News"},
                "title": "Glaciers retreat faster than expected",
                "url": "https://bbc.example/glaciers",
                "description": "A new survey of alpine glaciers."
            }),
            json!({
                "source": {"id": null, "name": "Wire"},
                "title": null,
                "url": "https://wire.example/untitled"
            }),
            json!({
                "source": {"id": null},
                "title": "Heatwave records broken",
                "url": "https://local.example/heat",
                "description": null
            }),
        ]
    }

    fn config_for(base_url: &str) -> SearchConfig {
        SearchConfig {
            api_key: Some("test-key".to_string()),
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_drops_untitled_and_keeps_order() {
        let articles = normalize(provider_articles(), 2);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].headline, "Glaciers retreat faster than expected");
        assert_eq!(articles[0].publisher, "BBC News");
        assert_eq!(articles[0].summary.as_deref(), Some("A new survey of alpine glaciers."));
        assert_eq!(articles[1].headline, "Heatwave records broken");
        assert_eq!(articles[1].publisher, UNKNOWN_PUBLISHER);
        assert_eq!(articles[1].summary, None);
    }

    #[test]
    fn test_normalize_caps_results() {
        let articles = normalize(provider_articles(), 1);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].link, "https://bbc.example/glaciers");
    }

    #[test]
    fn test_normalize_skips_malformed_records() {
        let raw = vec![
            json!("not an object"),
            json!({"title": 42, "url": "https://a.example"}),
            json!({"title": "   ", "url": "https://b.example"}),
            json!({"title": "Kept", "url": "https://c.example", "source": null}),
        ];
        let articles = normalize(raw, 10);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].headline, "Kept");
        assert_eq!(articles[0].publisher, UNKNOWN_PUBLISHER);
    }

    #[test]
    fn test_normalize_tolerates_odd_optional_fields() {
        let raw = vec![
            json!({"title": "T1", "url": "https://a.example/1", "description": 5}),
            json!({"title": "T2", "url": "https://a.example/2", "source": "Reuters"}),
            json!({"title": "T3", "url": "https://a.example/3", "source": {"name": ["x"]}}),
        ];
        let articles = normalize(raw, 10);

        let headlines: Vec<&str> = articles.iter().map(|a| a.headline.as_str()).collect();
        assert_eq!(headlines, vec!["T1", "T2", "T3"]);
        assert!(articles.iter().all(|a| a.publisher == UNKNOWN_PUBLISHER));
        assert_eq!(articles[0].summary, None);
    }

    #[test]
    fn test_window() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 30, 0).unwrap();
        assert_eq!(
            window(7, now),
            ("2024-03-03T12:30:00".to_string(), "2024-03-10T12:30:00".to_string())
        );
        assert_eq!(window(0, now).0, window(0, now).1);

        let (from, _) = window(u32::MAX, now);
        assert!(!from.is_empty());
    }

    #[test]
    fn test_request_url() {
        let client = NewsApiClient::new(&config_for("https://newsapi.example/v2/"));
        let query = SearchQuery::new("climate change")
            .with_sources(Some("bbc.co.uk".to_string()))
            .with_max_results(5);
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let url = client.request_url(&query, now).unwrap();

        assert_eq!(url.path(), "/v2/everything");
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params["q"], "climate change");
        assert_eq!(params["sortBy"], "relevancy");
        assert_eq!(params["pageSize"], "5");
        assert_eq!(params["domains"], "bbc.co.uk");
        assert_eq!(params["from"], "2024-03-03T00:00:00");
    }

    #[tokio::test]
    async fn test_search_against_fixture() {
        let seen: Arc<Mutex<Option<(HashMap<String, String>, Option<String>)>>> = Arc::default();
        let captured = Arc::clone(&seen);
        let app = Router::new().route(
            "/everything",
            get(move |Query(params): Query<HashMap<String, String>>, headers: HeaderMap| {
                let captured = Arc::clone(&captured);
                async move {
                    let key = headers
                        .get("x-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    *captured.lock().unwrap() = Some((params, key));
                    Json(json!({
                        "status": "ok",
                        "totalResults": 3,
                        "articles": provider_articles()
                    }))
                }
            }),
        );
        let base = serve(app).await;

        let client = NewsApiClient::new(&config_for(&base));
        let query = SearchQuery::new("climate").with_days_back(7).with_max_results(2);
        let articles = client.search(&query).await.unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].link, "https://bbc.example/glaciers");
        assert_eq!(articles[1].link, "https://local.example/heat");

        let (params, key) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(key.as_deref(), Some("test-key"));
        assert_eq!(params["q"], "climate");
        assert_eq!(params["language"], "en");
        assert!(!params.contains_key("domains"));
    }

    #[tokio::test]
    async fn test_search_maps_provider_errors() {
        let app = Router::new()
            .route(
                "/unauthorized/everything",
                get(|| async {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."})),
                    )
                }),
            )
            .route(
                "/limited/everything",
                get(|| async {
                    (
                        StatusCode::TOO_MANY_REQUESTS,
                        Json(json!({"status": "error", "code": "rateLimited", "message": "Too many requests."})),
                    )
                }),
            )
            .route("/garbled/everything", get(|| async { "<html>not json</html>" }));
        let base = serve(app).await;
        let query = SearchQuery::new("climate");

        let err = NewsApiClient::new(&config_for(&format!("{}/unauthorized", base)))
            .search(&query)
            .await
            .unwrap_err();
        assert!(err.is_auth_error());
        assert!(err.to_string().contains("apiKeyInvalid"));

        let err = NewsApiClient::new(&config_for(&format!("{}/limited", base)))
            .search(&query)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RateLimit(_)));

        let err = NewsApiClient::new(&config_for(&format!("{}/garbled", base)))
            .search(&query)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let config = SearchConfig {
            api_key: Some("  ".to_string()),
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let err = NewsApiClient::new(&config)
            .search(&SearchQuery::new("climate"))
            .await
            .unwrap_err();
        assert!(err.is_auth_error());
    }

    #[tokio::test]
    async fn test_fetch_articles_is_fail_soft() {
        let unreachable = NewsApiClient::new(&config_for("http://127.0.0.1:1"));
        let articles = fetch_articles(&unreachable, &SearchQuery::new("climate")).await;
        assert!(articles.is_empty());

        let articles = fetch_articles(&unreachable, &SearchQuery::new("")).await;
        assert!(articles.is_empty());
    }
}
