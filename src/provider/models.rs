use serde::{Deserialize, Serialize};

use crate::domain::FormatRecord;

pub const YTDLP_ENV: &str = "VIDGRAB_YTDLP";

/// Subset of `yt-dlp --dump-single-json` output
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InfoResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub formats: Vec<FormatResponse>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FormatResponse {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub format_note: Option<String>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filesize_approx: Option<f64>,
}

impl From<FormatResponse> for FormatRecord {
    fn from(raw: FormatResponse) -> Self {
        let approx = raw
            .filesize_approx
            .filter(|size| size.is_finite() && *size > 0.0)
            .map(|size| size.round() as u64);

        FormatRecord {
            id: raw.format_id.unwrap_or_default(),
            ext: raw.ext.unwrap_or_default(),
            vcodec: raw.vcodec,
            acodec: raw.acodec,
            width: raw.width,
            height: raw.height,
            resolution: raw.resolution,
            note: raw.format_note,
            size_bytes: raw.filesize.or(approx),
        }
    }
}

/// Configuration for the yt-dlp client
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub program: String,
    /// Arguments placed before our own, e.g. `-m yt_dlp` for a Python launch.
    pub base_args: Vec<String>,
    pub check_certificate: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            base_args: Vec::new(),
            check_certificate: true,
        }
    }
}

impl ProviderConfig {
    /// Defaults with `VIDGRAB_YTDLP` applied.
    pub fn from_env() -> Self {
        Self::default().with_program(std::env::var(YTDLP_ENV).ok())
    }

    /// Accepts a bare program or a short command line such as
    /// `python3 -m yt_dlp`. Blank values are ignored.
    pub fn with_program(mut self, command: Option<String>) -> Self {
        let Some(command) = command else {
            return self;
        };
        let mut parts = command.split_whitespace().map(str::to_string);
        if let Some(program) = parts.next() {
            self.program = program;
            self.base_args = parts.collect();
        }
        self
    }

    pub fn with_check_certificate(mut self, check: bool) -> Self {
        self.check_certificate = check;
        self
    }
}
