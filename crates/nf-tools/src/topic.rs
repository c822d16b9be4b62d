//! Topic summaries: search, extract, summarize, then validate the result.

use std::sync::Arc;

use tracing::{error, info};

use nf_core::{validate, ArticleSearch, Error, NewsResponse};

use crate::extract::ContentExtractor;
use crate::search::{fetch_articles, SearchConfig};
use crate::summarize::{summarize_with_boundary, SummaryConfig};

pub struct TopicSummarizer {
    search: Arc<dyn ArticleSearch>,
    extractor: Arc<ContentExtractor>,
    search_config: SearchConfig,
    summary: SummaryConfig,
}

impl TopicSummarizer {
    pub fn new(
        search: Arc<dyn ArticleSearch>,
        extractor: Arc<ContentExtractor>,
        search_config: SearchConfig,
        summary: SummaryConfig,
    ) -> Self {
        Self {
            search,
            extractor,
            search_config,
            summary,
        }
    }

    /// Summarize the top search results for `query`.
    ///
    /// Never fails: a blank query or any internal error yields an empty
    /// response.
    pub async fn summarize_topic(&self, query: &str) -> NewsResponse {
        match self.try_summarize_topic(query).await {
            Ok(response) => response,
            Err(e) => {
                error!(query = %query, error = %e, "Error generating topic summary");
                NewsResponse::empty()
            }
        }
    }

    async fn try_summarize_topic(&self, query: &str) -> Result<NewsResponse, Error> {
        let query = self
            .search_config
            .query(query.trim())
            .with_max_results(self.summary.topic_articles);
        query.validate()?;

        // A failed search summarizes nothing rather than aborting.
        let articles = fetch_articles(self.search.as_ref(), &query).await;
        let links: Vec<String> = articles.into_iter().map(|a| a.link).collect();
        info!(query = %query.query, links = links.len(), "Summarizing topic");

        self.try_summarize_links(&links).await
    }

    /// Summarize caller-provided article URLs. Sources list every requested
    /// link, including ones nothing could be extracted from.
    pub async fn summarize_links(&self, links: &[String]) -> NewsResponse {
        match self.try_summarize_links(links).await {
            Ok(response) => response,
            Err(e) => {
                error!(links = links.len(), error = %e, "Error summarizing links");
                NewsResponse::empty()
            }
        }
    }

    async fn try_summarize_links(&self, links: &[String]) -> Result<NewsResponse, Error> {
        let contents = self.extractor.extract(links).await;
        let text = summarize_with_boundary(&contents, self.summary.max_length, &self.summary.sentence_boundary);

        let candidate = serde_json::to_value(NewsResponse::with_overview(text, links.to_vec()))?;
        Ok(validate(candidate))
    }
}
