//! Article body extraction.
//!
//! Each URL runs through an ordered chain of [`ExtractionStrategy`]s: a
//! readability pass over the downloaded page, then a plain `<p>` scrape
//! fetched with a browser user agent. The first strategy to succeed wins.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use url::Url;

use nf_core::{ArticleContent, DownloadState, Error, ExtractionStrategy};

pub const DEFAULT_MAX_CHARS: usize = 5000;

/// Appended to text cut at the character limit.
pub const TRUNCATION_MARKER: &str = "...";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Extracted text longer than this many characters is truncated.
    pub max_chars: usize,
    pub download_timeout_secs: u64,
    pub fallback_timeout_secs: u64,
    /// URLs extracted at once.
    pub concurrency: usize,
    pub user_agent: String,
    pub fallback_user_agent: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            download_timeout_secs: 10,
            fallback_timeout_secs: 10,
            concurrency: 4,
            user_agent: concat!("nf/", env!("CARGO_PKG_VERSION")).to_string(),
            fallback_user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

/// Cut `text` to `max_chars` characters and append [`TRUNCATION_MARKER`].
/// Text already within the limit is returned unchanged.
pub fn truncate_content(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

fn http_client(user_agent: &str, timeout_secs: u64) -> Client {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_default()
}

async fn download(client: &Client, strategy: &str, link: &str) -> Result<String, Error> {
    let response = client
        .get(link)
        .send()
        .await
        .map_err(|e| Error::download(link, e.to_string()))?;

    let status = response.status();
    if !DownloadState::from_status(status.as_u16()).is_success() {
        return Err(Error::download(link, format!("HTTP {}", status)));
    }

    response
        .text()
        .await
        .map_err(|e| Error::extraction(strategy, format!("Failed to read response: {}", e)))
}

/// Readability-style main-content extraction.
pub struct ReadabilityStrategy {
    client: Client,
}

impl ReadabilityStrategy {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            client: http_client(&config.user_agent, config.download_timeout_secs),
        }
    }
}

#[async_trait]
impl ExtractionStrategy for ReadabilityStrategy {
    fn name(&self) -> &str {
        "readability"
    }

    async fn extract(&self, link: &str) -> Result<String, Error> {
        let url = Url::parse(link).map_err(|e| Error::download(link, format!("Invalid URL: {}", e)))?;
        let html = download(&self.client, self.name(), link).await?;

        let mut reader = Cursor::new(html.into_bytes());
        let product = readability::extractor::extract(&mut reader, &url)
            .map_err(|e| Error::extraction(self.name(), e.to_string()))?;
        Ok(product.text.trim().to_string())
    }
}

/// Concatenated `<p>` text, fetched with a browser user agent.
pub struct ParagraphStrategy {
    client: Client,
}

impl ParagraphStrategy {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            client: http_client(&config.fallback_user_agent, config.fallback_timeout_secs),
        }
    }
}

#[async_trait]
impl ExtractionStrategy for ParagraphStrategy {
    fn name(&self) -> &str {
        "paragraphs"
    }

    async fn extract(&self, link: &str) -> Result<String, Error> {
        let html = download(&self.client, self.name(), link).await?;
        paragraph_text(&html)
    }
}

/// Text of every non-empty `<p>`, whitespace collapsed, joined by spaces.
fn paragraph_text(html: &str) -> Result<String, Error> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("p").map_err(|_| Error::extraction("paragraphs", "Invalid paragraph selector"))?;

    let paragraphs: Vec<String> = document
        .select(&selector)
        .map(|p| p.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
        .collect();
    Ok(paragraphs.join(" "))
}

pub struct ContentExtractor {
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
    max_chars: usize,
    concurrency: usize,
}

impl ContentExtractor {
    /// Readability first, paragraph scrape as the fallback.
    pub fn new(config: &ExtractorConfig) -> Self {
        let strategies: Vec<Arc<dyn ExtractionStrategy>> = vec![
            Arc::new(ReadabilityStrategy::new(config)),
            Arc::new(ParagraphStrategy::new(config)),
        ];
        Self::with_strategies(strategies, config)
    }

    pub fn with_strategies(strategies: Vec<Arc<dyn ExtractionStrategy>>, config: &ExtractorConfig) -> Self {
        Self {
            strategies,
            max_chars: config.max_chars,
            concurrency: config.concurrency.max(1),
        }
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Extract every link. Output is aligned with `links`: same length, same
    /// order. Links nothing could be extracted from get empty content.
    pub async fn extract(&self, links: &[String]) -> Vec<ArticleContent> {
        stream::iter(links.to_vec())
            .map(|link| async move { self.extract_one(&link).await })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn extract_one(&self, link: &str) -> ArticleContent {
        for strategy in &self.strategies {
            match strategy.extract(link).await {
                Ok(text) => {
                    info!(url = %link, strategy = strategy.name(), chars = text.chars().count(), "Extracted content");
                    return ArticleContent::new(link, truncate_content(&text, self.max_chars));
                }
                Err(e) => {
                    warn!(url = %link, strategy = strategy.name(), error = %e, "Extraction strategy failed");
                }
            }
        }

        error!(url = %link, "All extraction methods failed");
        ArticleContent::empty(link)
    }
}

impl std::fmt::Debug for ContentExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentExtractor")
            .field("strategies", &self.strategy_names())
            .field("max_chars", &self.max_chars)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}
