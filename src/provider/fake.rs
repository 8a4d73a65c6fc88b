use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{EventSink, FetchedInfo, MediaProvider, ProviderError, ProviderEvent, Result};
use crate::domain::{DownloadRequest, FormatRecord};

/// Scripted provider for tests; records every download request.
pub struct FakeProvider {
    info: std::result::Result<FetchedInfo, String>,
    events: Vec<ProviderEvent>,
    download_error: Option<String>,
    reported_path: Option<PathBuf>,
    pub downloads: Mutex<Vec<DownloadRequest>>,
}

impl FakeProvider {
    pub fn with_formats(title: &str, formats: Vec<FormatRecord>) -> Self {
        Self {
            info: Ok(FetchedInfo {
                title: Some(title.to_string()),
                formats,
            }),
            events: Vec::new(),
            download_error: None,
            reported_path: None,
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_fetch(message: &str) -> Self {
        Self {
            info: Err(message.to_string()),
            ..Self::with_formats("", Vec::new())
        }
    }

    pub fn with_events(mut self, events: Vec<ProviderEvent>) -> Self {
        self.reported_path = events.iter().rev().find_map(|e| e.path().cloned());
        self.events = events;
        self
    }

    pub fn with_download_error(mut self, message: &str) -> Self {
        self.download_error = Some(message.to_string());
        self
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<DownloadRequest> {
        self.downloads.lock().unwrap().last().cloned()
    }
}

/// One progressive and one video-only format.
pub fn sample_formats() -> Vec<FormatRecord> {
    vec![
        FormatRecord {
            id: "18".into(),
            ext: "mp4".into(),
            vcodec: Some("avc1.42001E".into()),
            acodec: Some("mp4a.40.2".into()),
            width: Some(640),
            height: Some(360),
            resolution: Some("640x360".into()),
            note: Some("360p".into()),
            size_bytes: Some(10 * 1_048_576),
        },
        FormatRecord {
            id: "137".into(),
            ext: "mp4".into(),
            vcodec: Some("avc1.640028".into()),
            acodec: Some("none".into()),
            width: Some(1920),
            height: Some(1080),
            resolution: Some("1920x1080".into()),
            note: Some("1080p".into()),
            size_bytes: None,
        },
    ]
}

#[async_trait]
impl MediaProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_info(&self, _locator: &str) -> Result<FetchedInfo> {
        self.info.clone().map_err(|message| ProviderError::Failed { message })
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        on_event: EventSink<'_>,
    ) -> Result<Option<PathBuf>> {
        self.downloads.lock().unwrap().push(request.clone());
        for event in &self.events {
            on_event(event.clone());
        }
        match &self.download_error {
            Some(message) => Err(ProviderError::Failed {
                message: message.clone(),
            }),
            None => Ok(self.reported_path.clone()),
        }
    }
}
