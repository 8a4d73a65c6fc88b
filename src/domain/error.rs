use thiserror::Error;

use crate::provider::ProviderError;

pub const FFMPEG_URL: &str = "https://ffmpeg.org/download.html";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("{0}")]
    MetadataFetch(String),

    #[error("No format selected")]
    EmptySelection,

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("No matching formats found")]
    NoMatchingFormats,

    #[error("{tool} is not installed or not in PATH: {message}")]
    ExternalToolMissing { tool: String, message: String },

    #[error("{0}")]
    Download(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Download cancelled")]
    Cancelled,
}

impl AppError {
    /// Guidance shown next to the raw message when a helper tool is missing.
    pub fn remediation(&self) -> Option<String> {
        match self {
            Self::ExternalToolMissing { tool, .. } if tool == "yt-dlp" => Some(
                "yt-dlp is required for every download. Install it (e.g. `pip install yt-dlp`) \
                 or point VIDGRAB_YTDLP at the binary."
                    .to_string(),
            ),
            Self::ExternalToolMissing { .. } => Some(format!(
                "FFmpeg is required for merging high-quality video/audio or for audio conversion. \
                 Get FFmpeg here: {}",
                FFMPEG_URL
            )),
            _ => None,
        }
    }

    /// Classify a failed download call.
    ///
    /// Structured provider signals win; the text patterns only apply to the
    /// free-form message yt-dlp printed before exiting.
    pub fn from_download_failure(err: ProviderError) -> Self {
        match err {
            ProviderError::NotInstalled { program } => Self::ytdlp_missing(&program),
            ProviderError::Failed { message } => {
                if mentions_missing_ffmpeg(&message) {
                    Self::ExternalToolMissing {
                        tool: "FFmpeg".to_string(),
                        message,
                    }
                } else {
                    Self::Download(message)
                }
            }
            other => Self::Download(other.to_string()),
        }
    }

    /// The metadata call is the first to start yt-dlp, so a missing binary
    /// usually surfaces here.
    pub fn from_metadata_failure(err: ProviderError) -> Self {
        match err {
            ProviderError::NotInstalled { program } => Self::ytdlp_missing(&program),
            ProviderError::Failed { message } => Self::MetadataFetch(message),
            other => Self::MetadataFetch(other.to_string()),
        }
    }
}

impl AppError {
    fn ytdlp_missing(program: &str) -> Self {
        Self::ExternalToolMissing {
            tool: "yt-dlp".to_string(),
            message: format!("{} could not be started", program),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Phrases yt-dlp uses when it cannot find ffmpeg/ffprobe for merging or
/// post-processing.
fn mentions_missing_ffmpeg(message: &str) -> bool {
    let lower = message.to_lowercase();
    if !(lower.contains("ffmpeg") || lower.contains("ffprobe")) {
        return false;
    }

    [
        "not found",
        "not installed",
        "no such file or directory",
        "requested format",
    ]
    .iter()
    .any(|phrase| lower.contains(phrase))
}
