//! nf-tools: News search, extraction and summarization for news-fetch
//!
//! This crate provides the pipeline stages behind the agent tools:
//! - Search: NewsAPI client with normalized article records
//! - Extract: readability extraction with a paragraph-scrape fallback
//! - Summarize: deterministic extractive summaries
//! - Topic: search → extract → summarize → validate
//! - News: the three tools exposed to the agent layer

pub mod extract;
pub mod news;
pub mod search;
pub mod summarize;
pub mod topic;

#[cfg(test)]
mod fixture;

pub use extract::{
    truncate_content, ContentExtractor, ExtractorConfig, ParagraphStrategy, ReadabilityStrategy,
};
pub use news::{
    create_news_tools, create_news_tools_with, ExtractArticleContentTool, FetchArticlesTool, NewsConfig,
    TopicSummaryTool,
};
pub use search::{fetch_articles, NewsApiClient, SearchConfig};
pub use summarize::{summarize, summarize_with_boundary, SummaryConfig};
pub use topic::TopicSummarizer;
