use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::{channel::mpsc, stream::BoxStream, StreamExt};

use crate::{
    domain::{
        quality::DEFAULT_MERGE_FORMAT, AppError, DownloadAttempt, DownloadPhase, DownloadRequest,
        MediaInfo, Selector,
    },
    provider::{MediaProvider, ProgressUpdate, ProviderEvent},
    utils::{normalize_locator, sanitize_title},
};

#[derive(Debug, Clone)]
pub enum DownloadEvent {
    Progress(ProgressUpdate),
    Stage(String),
    Completed(PathBuf),
    Failed(AppError),
}

impl From<ProviderEvent> for DownloadEvent {
    fn from(event: ProviderEvent) -> Self {
        match event {
            ProviderEvent::Progress(update) => Self::Progress(update),
            ProviderEvent::Destination(path) => {
                Self::Stage(format!("Destination: {}", path.display()))
            }
            ProviderEvent::PostProcessing { step, path } => {
                Self::Stage(format!("{}: {}", step, path.display()))
            }
        }
    }
}

#[derive(Clone)]
pub struct DownloadCoordinator {
    provider: Arc<dyn MediaProvider>,
}

impl DownloadCoordinator {
    pub fn new(provider: Arc<dyn MediaProvider>) -> Self {
        Self { provider }
    }

    /// Title (sanitized) and formats for a locator. One attempt, no retry.
    pub async fn fetch_metadata(&self, locator: &str) -> Result<MediaInfo, AppError> {
        let locator = normalize_locator(locator)
            .ok_or_else(|| AppError::MetadataFetch("Please enter a valid video URL.".to_string()))?;

        tracing::info!("fetching metadata via {} for {}", self.provider.name(), locator);
        let fetched = self
            .provider
            .fetch_info(&locator)
            .await
            .map_err(AppError::from_metadata_failure)?;

        let info = MediaInfo {
            title: sanitize_title(fetched.title.as_deref()),
            formats: fetched.formats,
        };
        tracing::info!("'{}' has {} formats", info.title, info.formats.len());
        Ok(info)
    }

    /// Assemble the downloader configuration for one attempt.
    pub fn build_request(
        &self,
        locator: &str,
        title: &str,
        selector: &Selector,
        destination: &Path,
        known_extension: Option<String>,
    ) -> DownloadRequest {
        let title = sanitize_title(Some(title));
        let output_template = destination
            .join(format!("{}.%(ext)s", title))
            .to_string_lossy()
            .to_string();

        let post_process = match selector {
            Selector::Tier(tier) => tier.post_process(),
            Selector::Format(_) => None,
        };
        let merge_format = selector
            .may_need_merge()
            .then(|| DEFAULT_MERGE_FORMAT.to_string());

        DownloadRequest {
            locator: normalize_locator(locator).unwrap_or_default(),
            selector: selector.expression().trim().to_string(),
            destination: destination.to_path_buf(),
            title,
            output_template,
            merge_format,
            post_process,
            known_extension,
        }
    }

    /// Run one download to completion, forwarding live events.
    pub async fn execute<F>(&self, request: DownloadRequest, on_event: F) -> Result<PathBuf, AppError>
    where
        F: Fn(DownloadEvent) + Send + Sync,
    {
        let mut attempt = DownloadAttempt::new();
        attempt.advance(DownloadPhase::Validating);

        if let Err(err) = Self::validate(&request).await {
            attempt.advance(DownloadPhase::Failed);
            tracing::warn!("download rejected: {}", err);
            return Err(err);
        }

        attempt.advance(DownloadPhase::AwaitingExternalDownload);
        tracing::info!(
            "downloading {} with format '{}' to {}",
            request.locator,
            request.selector,
            request.destination.display()
        );

        let sink = |event: ProviderEvent| on_event(DownloadEvent::from(event));
        match self.provider.download(&request, &sink).await {
            Ok(reported) => {
                attempt.advance(DownloadPhase::Completed);
                let path = reported
                    .or_else(|| request.expected_path())
                    .unwrap_or_else(|| request.destination.clone());
                tracing::info!("download complete: {}", path.display());
                Ok(path)
            }
            Err(err) => {
                attempt.advance(DownloadPhase::Failed);
                let err = AppError::from_download_failure(err);
                tracing::warn!("download failed: {}", err);
                Err(err)
            }
        }
    }

    async fn validate(request: &DownloadRequest) -> Result<(), AppError> {
        if request.selector.trim().is_empty() {
            return Err(AppError::EmptySelection);
        }
        if request.locator.trim().is_empty() {
            return Err(AppError::Download("Please enter a valid video URL.".to_string()));
        }
        tokio::fs::create_dir_all(&request.destination).await?;
        Ok(())
    }

    /// Runs [`Self::execute`] and yields its events in order, ending with
    /// `Completed` or `Failed`. Dropping the stream stops the download.
    pub fn download_stream(&self, request: DownloadRequest) -> BoxStream<'static, DownloadEvent> {
        let (tx, rx) = mpsc::unbounded();
        let coordinator = self.clone();

        let run = async move {
            let progress_tx = tx.clone();
            let result = coordinator
                .execute(request, move |event| {
                    let _ = progress_tx.unbounded_send(event);
                })
                .await;

            let last = match result {
                Ok(path) => DownloadEvent::Completed(path),
                Err(err) => DownloadEvent::Failed(err),
            };
            let _ = tx.unbounded_send(last);
        };

        let driver = futures::stream::once(run)
            .filter_map(|()| futures::future::ready(None::<DownloadEvent>));

        futures::stream::select(rx, driver).boxed()
    }
}
