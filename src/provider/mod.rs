pub mod client;
#[cfg(test)]
pub mod fake;
pub mod models;
pub mod progress;
pub mod tools;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{DownloadRequest, FormatRecord};

pub use client::YtDlpClient;
pub use models::ProviderConfig;
pub use progress::{PostStep, ProgressUpdate, ProviderEvent};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{program} not found")]
    NotInstalled { program: String },

    #[error("I/O error talking to the downloader: {0}")]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Failed { message: String },

    #[error("Invalid response format: {0}")]
    InvalidOutput(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Title and formats as the provider reported them.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedInfo {
    pub title: Option<String>,
    pub formats: Vec<FormatRecord>,
}

pub type EventSink<'a> = &'a (dyn Fn(ProviderEvent) + Send + Sync);

/// The external media metadata & download tool.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_info(&self, locator: &str) -> Result<FetchedInfo>;

    /// Run one download. Returns the last output path the tool reported.
    async fn download(&self, request: &DownloadRequest, on_event: EventSink<'_>)
        -> Result<Option<PathBuf>>;
}
