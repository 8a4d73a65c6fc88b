use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use url::Url;

pub const DOWNLOAD_DIR_ENV: &str = "VIDGRAB_DOWNLOAD_DIR";

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == ' ')
        .to_string()
}

/// Title used in output file names; falls back to "video".
pub fn sanitize_title(title: Option<&str>) -> String {
    let cleaned = sanitize_filename(title.unwrap_or_default());
    if cleaned.is_empty() {
        "video".to_string()
    } else {
        cleaned
    }
}

/// Trim the locator and add `https://` to scheme-less web addresses.
/// Anything else is passed through for the provider to judge.
pub fn normalize_locator(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    match Url::parse(input) {
        Ok(_) => Some(input.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) if looks_like_host_path(input) => {
            let candidate = format!("https://{}", input);
            match Url::parse(&candidate) {
                Ok(url) => Some(url.to_string()),
                Err(_) => Some(input.to_string()),
            }
        }
        Err(_) => Some(input.to_string()),
    }
}

fn looks_like_host_path(input: &str) -> bool {
    let host = input.split(['/', '?']).next().unwrap_or_default();
    host.contains('.') && !host.contains(char::is_whitespace)
}

/// `VIDGRAB_DOWNLOAD_DIR`, else `./downloads`, else the user's download dir.
pub fn default_destination() -> PathBuf {
    if let Ok(dir) = std::env::var(DOWNLOAD_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir.trim());
        }
    }
    std::env::current_dir()
        .map(|cwd| cwd.join("downloads"))
        .ok()
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("downloads"))
}

/// Log to stderr; `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
