//! Extractive summaries over extracted article text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use nf_core::ArticleContent;

use crate::extract::truncate_content;

pub const DEFAULT_MAX_LENGTH: usize = 200;

/// Returned when every content entry is empty.
pub const NO_CONTENT: &str = "No content available for summary.";

/// Returned when summarization faults internally.
pub const SUMMARY_FAILED: &str = "Failed to generate summary.";

const SENTENCES_PER_SUMMARY: usize = 3;

/// Sentence-ending punctuation followed by whitespace.
pub const SENTENCE_BOUNDARY: &str = r"[.!?]\s+";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Summary length in characters, before the truncation marker.
    pub max_length: usize,
    /// How many search results a topic summary reads.
    pub topic_articles: u32,
    /// Regex marking the end of a sentence. The first character of each
    /// match closes the sentence before it.
    pub sentence_boundary: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            topic_articles: 5,
            sentence_boundary: SENTENCE_BOUNDARY.to_string(),
        }
    }
}

/// Build a summary from the first sentences of the non-empty contents.
///
/// Deterministic: identical input always gives identical output. The result
/// is at most `max_length` characters plus a trailing `...` when cut.
pub fn summarize(contents: &[ArticleContent], max_length: usize) -> String {
    summarize_with_boundary(contents, max_length, SENTENCE_BOUNDARY)
}

/// [`summarize`] with a custom sentence boundary. A pattern that does not
/// compile yields [`SUMMARY_FAILED`].
pub fn summarize_with_boundary(contents: &[ArticleContent], max_length: usize, boundary: &str) -> String {
    let combined = contents
        .iter()
        .filter(|c| !c.is_empty())
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    if combined.is_empty() {
        return NO_CONTENT.to_string();
    }

    match lead_sentences(&combined, boundary) {
        Ok(lead) => {
            debug!(sources = contents.len(), chars = combined.chars().count(), "Summarized content");
            truncate_content(&lead, max_length)
        }
        Err(e) => {
            error!(boundary, error = %e, "Error generating summary");
            SUMMARY_FAILED.to_string()
        }
    }
}

/// The first sentences of `text`, joined by single spaces. Each sentence keeps
/// its closing punctuation; trailing text without one counts as a sentence.
fn lead_sentences(text: &str, boundary: &str) -> Result<String, regex::Error> {
    let boundary = Regex::new(boundary)?;

    let mut sentences = Vec::with_capacity(SENTENCES_PER_SUMMARY);
    let mut start = 0;
    for m in boundary.find_iter(text) {
        if sentences.len() == SENTENCES_PER_SUMMARY {
            break;
        }
        let end = m.start() + m.as_str().chars().next().map_or(0, char::len_utf8);
        sentences.push(&text[start..end]);
        start = m.end();
    }
    if sentences.len() < SENTENCES_PER_SUMMARY && start < text.len() {
        sentences.push(&text[start..]);
    }

    Ok(sentences.join(" "))
}
