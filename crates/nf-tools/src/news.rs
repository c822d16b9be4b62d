//! Agent-callable news tools.
//!
//! Each tool parses its JSON arguments, runs the matching fail-soft operation
//! and hands the JSON-serialized result back as a successful [`ToolOutput`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use nf_core::{ArticleSearch, Error, PropertySchema, Tool, ToolDefinition, ToolOutput, ToolParameters};

use crate::extract::{ContentExtractor, ExtractorConfig};
use crate::search::{fetch_articles, NewsApiClient, SearchConfig};
use crate::summarize::SummaryConfig;
use crate::topic::TopicSummarizer;

/// Settings for every news component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub search: SearchConfig,
    pub extract: ExtractorConfig,
    pub summary: SummaryConfig,
}

fn parse_args<T: for<'de> Deserialize<'de>>(tool: &str, arguments: Value) -> Result<T, Error> {
    serde_json::from_value(arguments).map_err(|e| Error::tool(tool, format!("Invalid arguments: {}", e)))
}

// =============================================================================
// Fetch Articles Tool
// =============================================================================

pub struct FetchArticlesTool {
    search: Arc<dyn ArticleSearch>,
    defaults: SearchConfig,
}

impl FetchArticlesTool {
    pub fn new(search: Arc<dyn ArticleSearch>, defaults: SearchConfig) -> Self {
        Self { search, defaults }
    }
}

#[derive(Deserialize)]
struct FetchArticlesArgs {
    query: String,
    #[serde(default)]
    days_back: Option<u32>,
    #[serde(default)]
    sources: Option<String>,
    #[serde(default)]
    max_articles: Option<u32>,
    #[serde(default)]
    language: Option<String>,
}

#[async_trait]
impl Tool for FetchArticlesTool {
    fn name(&self) -> &str {
        "fetch_articles"
    }

    fn description(&self) -> &str {
        "Search recent news articles on a topic. Returns headline, link, summary and publisher for each match."
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description()).with_parameters(
            ToolParameters::new()
                .add_property("query", PropertySchema::string("Search terms"), true)
                .add_property(
                    "days_back",
                    PropertySchema::integer("How many days back to search")
                        .with_minimum(0)
                        .with_default(json!(self.defaults.days_back)),
                    false,
                )
                .add_property(
                    "sources",
                    PropertySchema::string("Comma-separated domains to restrict to, e.g. 'bbc.co.uk,techcrunch.com'"),
                    false,
                )
                .add_property(
                    "max_articles",
                    PropertySchema::integer("Maximum number of articles to return")
                        .with_minimum(1)
                        .with_default(json!(self.defaults.max_articles)),
                    false,
                )
                .add_property(
                    "language",
                    PropertySchema::string("ISO 639-1 language code").with_default(json!(self.defaults.language)),
                    false,
                ),
        )
    }

    async fn execute(&self, arguments: Value) -> Result<ToolOutput, Error> {
        let args: FetchArticlesArgs = parse_args(self.name(), arguments)?;

        let mut query = self
            .defaults
            .query(args.query)
            .with_sources(args.sources);
        if let Some(days_back) = args.days_back {
            query = query.with_days_back(days_back);
        }
        if let Some(max_articles) = args.max_articles {
            query = query.with_max_results(max_articles);
        }
        if let Some(language) = args.language {
            query = query.with_language(language);
        }

        let articles = fetch_articles(self.search.as_ref(), &query).await;
        ToolOutput::json(&articles)
    }
}

// =============================================================================
// Extract Article Content Tool
// =============================================================================

pub struct ExtractArticleContentTool {
    extractor: Arc<ContentExtractor>,
}

impl ExtractArticleContentTool {
    pub fn new(extractor: Arc<ContentExtractor>) -> Self {
        Self { extractor }
    }
}

#[derive(Deserialize)]
struct ExtractArgs {
    links: Vec<String>,
}

#[async_trait]
impl Tool for ExtractArticleContentTool {
    fn name(&self) -> &str {
        "extract_article_content"
    }

    fn description(&self) -> &str {
        "Download article pages and extract their main text. Returns one entry per link, in order; content is empty when extraction failed."
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description()).with_parameters(ToolParameters::new().add_property(
            "links",
            PropertySchema::array("Article URLs to extract", PropertySchema::uri("Article URL")),
            true,
        ))
    }

    async fn execute(&self, arguments: Value) -> Result<ToolOutput, Error> {
        let args: ExtractArgs = parse_args(self.name(), arguments)?;
        let contents = self.extractor.extract(&args.links).await;
        ToolOutput::json(&contents)
    }
}

// =============================================================================
// Topic Summary Tool
// =============================================================================

pub struct TopicSummaryTool {
    summarizer: Arc<TopicSummarizer>,
}

impl TopicSummaryTool {
    pub fn new(summarizer: Arc<TopicSummarizer>) -> Self {
        Self { summarizer }
    }
}

#[derive(Deserialize)]
struct TopicArgs {
    query: String,
}

#[async_trait]
impl Tool for TopicSummaryTool {
    fn name(&self) -> &str {
        "generate_topic_summary"
    }

    fn description(&self) -> &str {
        "Search a topic, read the top articles and return a short overview with its source links."
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description()).with_parameters(
            ToolParameters::new().add_property("query", PropertySchema::string("Topic to summarize"), true),
        )
    }

    async fn execute(&self, arguments: Value) -> Result<ToolOutput, Error> {
        let args: TopicArgs = parse_args(self.name(), arguments)?;
        let response = self.summarizer.summarize_topic(&args.query).await;
        ToolOutput::json(&response)
    }
}

// =============================================================================
// Factories
// =============================================================================

/// Create all news tools backed by NewsAPI and the default extraction chain.
pub fn create_news_tools(config: &NewsConfig) -> Vec<Box<dyn Tool>> {
    create_news_tools_with(
        Arc::new(NewsApiClient::new(&config.search)),
        Arc::new(ContentExtractor::new(&config.extract)),
        config,
    )
}

/// Create all news tools over the given search backend and extractor.
pub fn create_news_tools_with(
    search: Arc<dyn ArticleSearch>,
    extractor: Arc<ContentExtractor>,
    config: &NewsConfig,
) -> Vec<Box<dyn Tool>> {
    let summarizer = Arc::new(TopicSummarizer::new(
        Arc::clone(&search),
        Arc::clone(&extractor),
        config.search.clone(),
        config.summary.clone(),
    ));

    let tools: Vec<Box<dyn Tool>> = vec![
        Box::new(FetchArticlesTool::new(search, config.search.clone())),
        Box::new(ExtractArticleContentTool::new(extractor)),
        Box::new(TopicSummaryTool::new(summarizer)),
    ];
    tools
}
