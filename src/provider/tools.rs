use std::fmt;
use std::process::Stdio;

use tokio::process::Command;

use super::models::ProviderConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub version: Option<String>,
}

impl ToolInfo {
    pub fn is_available(&self) -> bool {
        self.version.is_some()
    }
}

impl fmt::Display for ToolInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} {}", self.name, version),
            None => write!(f, "{} not found", self.name),
        }
    }
}

/// Run `program args` and return the first line of its output, if it ran.
async fn probe(program: &str, args: &[String]) -> Option<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}

pub async fn ytdlp_info(config: &ProviderConfig) -> ToolInfo {
    let mut args = config.base_args.clone();
    args.push("--version".to_string());
    ToolInfo {
        name: "yt-dlp".to_string(),
        version: probe(&config.program, &args).await,
    }
}

pub async fn ffmpeg_info() -> ToolInfo {
    let version = probe("ffmpeg", &["-version".to_string()])
        .await
        .map(|line| {
            // "ffmpeg version 6.1.1-3ubuntu5 Copyright (c) ..."
            line.split_whitespace()
                .nth(2)
                .map(str::to_string)
                .unwrap_or(line)
        });
    ToolInfo {
        name: "ffmpeg".to_string(),
        version,
    }
}

/// Status of both external tools, yt-dlp first.
pub async fn check_tools(config: &ProviderConfig) -> Vec<ToolInfo> {
    let (ytdlp, ffmpeg) = tokio::join!(ytdlp_info(config), ffmpeg_info());
    tracing::info!("tool check: {}, {}", ytdlp, ffmpeg);
    vec![ytdlp, ffmpeg]
}
