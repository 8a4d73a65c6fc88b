use std::path::PathBuf;

/// Codec value yt-dlp reports for a stream that is absent.
pub const NONE_CODEC: &str = "none";

/// Resolution text yt-dlp reports for audio-only formats.
pub const AUDIO_ONLY_RESOLUTION: &str = "audio only";

/// One entry of the provider's format list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormatRecord {
    pub id: String,
    pub ext: String,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resolution: Option<String>,
    pub note: Option<String>,
    pub size_bytes: Option<u64>,
}

impl FormatRecord {
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some(NONE_CODEC)
    }

    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some(NONE_CODEC)
    }

    pub fn is_progressive(&self) -> bool {
        self.has_video() && self.has_audio()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// Already sanitized for use as a file name.
    pub title: String,
    pub formats: Vec<FormatRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcess {
    ExtractAudio { codec: String, quality: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub locator: String,
    pub selector: String,
    pub destination: PathBuf,
    pub title: String,
    pub output_template: String,
    pub merge_format: Option<String>,
    pub post_process: Option<PostProcess>,
    pub known_extension: Option<String>,
}

impl DownloadRequest {
    /// Where the file lands if the provider never reports a destination.
    pub fn expected_path(&self) -> Option<PathBuf> {
        let ext = match &self.post_process {
            Some(PostProcess::ExtractAudio { codec, .. }) => codec.as_str(),
            None => match (&self.merge_format, &self.known_extension) {
                (_, Some(ext)) => ext.as_str(),
                (Some(merge), None) => merge.as_str(),
                (None, None) => return None,
            },
        };
        Some(self.destination.join(format!("{}.{}", self.title, ext)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    Idle,
    Validating,
    AwaitingExternalDownload,
    Completed,
    Failed,
}

impl DownloadPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn can_advance_to(self, next: DownloadPhase) -> bool {
        use DownloadPhase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, AwaitingExternalDownload)
                | (Validating, Failed)
                | (AwaitingExternalDownload, Completed)
                | (AwaitingExternalDownload, Failed)
        )
    }
}

/// Tracks a single download request through its phases.
#[derive(Debug)]
pub struct DownloadAttempt {
    phase: DownloadPhase,
}

impl Default for DownloadAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadAttempt {
    pub fn new() -> Self {
        Self {
            phase: DownloadPhase::Idle,
        }
    }

    pub fn phase(&self) -> DownloadPhase {
        self.phase
    }

    /// Returns false and leaves the phase untouched if the move is illegal.
    pub fn advance(&mut self, next: DownloadPhase) -> bool {
        if !self.phase.can_advance_to(next) {
            tracing::warn!("ignored phase change {:?} -> {:?}", self.phase, next);
            return false;
        }
        tracing::debug!("download phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
        true
    }
}
