use std::fmt;
use std::path::PathBuf;

use lazy_static::lazy_static;
use regex::Regex;

/// Marker prefixed to the lines produced by [`PROGRESS_TEMPLATE`].
const PROGRESS_MARKER: &str = "[progress]";

/// Passed to `--progress-template` so every update arrives as one
/// machine-readable line.
pub const PROGRESS_TEMPLATE: &str = "download:[progress] %(progress._percent_str)s|%(progress._total_bytes_str)s|%(progress._total_bytes_estimate_str)s|%(progress._speed_str)s|%(progress._eta_str)s";

lazy_static! {
    static ref ANSI_RE: Regex = Regex::new(r"\x1b\[[0-9;]*m").unwrap();
    static ref DEST_RE: Regex = Regex::new(r"^\[download\]\s+Destination:\s+(.+)$").unwrap();
    static ref ALREADY_RE: Regex =
        Regex::new(r"^\[download\]\s+(.+?) has already been downloaded").unwrap();
    static ref MERGE_RE: Regex = Regex::new(r#"^\[Merger\]\s+Merging formats into "(.+)"$"#).unwrap();
    static ref EXTRACT_RE: Regex =
        Regex::new(r"^\[ExtractAudio\]\s+Destination:\s+(.+)$").unwrap();
}

/// One live progress sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub percent: f32,
    pub total: String,
    pub speed: String,
    pub eta: String,
}

impl fmt::Display for ProgressUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Downloading: {:.1}% of {} at {} - ETA: {}",
            self.percent, self.total, self.speed, self.eta
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStep {
    Merge,
    ExtractAudio,
}

impl fmt::Display for PostStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merge => f.write_str("Merging video and audio"),
            Self::ExtractAudio => f.write_str("Extracting audio"),
        }
    }
}

/// Something the downloader reported while running.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    Progress(ProgressUpdate),
    Destination(PathBuf),
    PostProcessing { step: PostStep, path: PathBuf },
}

impl ProviderEvent {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Progress(_) => None,
            Self::Destination(path) | Self::PostProcessing { path, .. } => Some(path),
        }
    }
}

/// Parse one output line. Lines we do not understand, including progress
/// lines with fields yt-dlp could not fill yet, yield `None`.
pub fn parse_line(line: &str) -> Option<ProviderEvent> {
    let line = ANSI_RE.replace_all(line, "");
    let line = line.trim();

    if let Some(rest) = line.strip_prefix(PROGRESS_MARKER) {
        return parse_progress(rest).map(ProviderEvent::Progress);
    }

    if let Some(caps) = MERGE_RE.captures(line) {
        return Some(ProviderEvent::PostProcessing {
            step: PostStep::Merge,
            path: PathBuf::from(&caps[1]),
        });
    }
    if let Some(caps) = EXTRACT_RE.captures(line) {
        return Some(ProviderEvent::PostProcessing {
            step: PostStep::ExtractAudio,
            path: PathBuf::from(&caps[1]),
        });
    }
    if let Some(caps) = DEST_RE.captures(line) {
        return Some(ProviderEvent::Destination(PathBuf::from(&caps[1])));
    }
    if let Some(caps) = ALREADY_RE.captures(line) {
        return Some(ProviderEvent::Destination(PathBuf::from(&caps[1])));
    }

    None
}

fn parse_progress(fields: &str) -> Option<ProgressUpdate> {
    let parts: Vec<&str> = fields.split('|').map(str::trim).collect();
    let [percent, total, estimate, speed, eta] = parts.as_slice() else {
        return None;
    };

    let percent: f32 = percent.trim_end_matches('%').trim().parse().ok()?;

    let total = [*total, *estimate]
        .into_iter()
        .find(|value| is_filled(value))
        .unwrap_or("N/A");

    Some(ProgressUpdate {
        percent,
        total: total.to_string(),
        speed: fill_or(speed, "N/A"),
        eta: fill_or(eta, "Unknown"),
    })
}

fn is_filled(value: &str) -> bool {
    !value.is_empty() && value != "NA" && value != "N/A"
}

fn fill_or(value: &str, fallback: &str) -> String {
    if is_filled(value) {
        value.to_string()
    } else {
        fallback.to_string()
    }
}
