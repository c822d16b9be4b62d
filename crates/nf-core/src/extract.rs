use async_trait::async_trait;

use crate::error::Error;

/// Outcome of fetching a page before extraction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    Success,
    Failed,
}

impl DownloadState {
    pub fn from_status(status: u16) -> Self {
        if (200..300).contains(&status) {
            DownloadState::Success
        } else {
            DownloadState::Failed
        }
    }

    pub fn is_success(self) -> bool {
        self == DownloadState::Success
    }
}

/// One step of the extraction chain.
///
/// `Ok` ends the chain for this URL, even when the text is empty. `Err` hands
/// the URL to the next strategy.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn extract(&self, link: &str) -> Result<String, Error>;
}
