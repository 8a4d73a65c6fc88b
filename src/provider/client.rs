use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use super::models::{InfoResponse, ProviderConfig};
use super::progress::{self, PROGRESS_TEMPLATE};
use super::{EventSink, FetchedInfo, MediaProvider, ProviderError, Result};
use crate::domain::{DownloadRequest, PostProcess};

/// Drives the `yt-dlp` command line tool.
#[derive(Debug, Clone)]
pub struct YtDlpClient {
    config: ProviderConfig,
}

impl YtDlpClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.base_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn launch_error(&self, err: std::io::Error) -> ProviderError {
        if err.kind() == std::io::ErrorKind::NotFound {
            ProviderError::NotInstalled {
                program: self.config.program.clone(),
            }
        } else {
            ProviderError::Io(err)
        }
    }

    fn common_args(&self) -> Vec<String> {
        let mut args = vec!["--no-playlist".to_string()];
        if !self.config.check_certificate {
            args.push("--no-check-certificates".to_string());
        }
        args
    }

    pub(crate) fn info_args(&self, locator: &str) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
        ];
        args.extend(self.common_args());
        args.push("--".to_string());
        args.push(locator.to_string());
        args
    }

    pub(crate) fn download_args(&self, request: &DownloadRequest) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            request.selector.clone(),
            "-o".to_string(),
            request.output_template.clone(),
            "--newline".to_string(),
            "--progress-template".to_string(),
            PROGRESS_TEMPLATE.to_string(),
        ];
        args.extend(self.common_args());

        if let Some(merge) = &request.merge_format {
            args.push("--merge-output-format".to_string());
            args.push(merge.clone());
        }

        match &request.post_process {
            Some(PostProcess::ExtractAudio { codec, quality }) => {
                args.push("--extract-audio".to_string());
                args.push("--audio-format".to_string());
                args.push(codec.clone());
                args.push("--audio-quality".to_string());
                args.push(format!("{}K", quality));
            }
            None => {}
        }

        args.push("--".to_string());
        args.push(request.locator.clone());
        args
    }
}

impl Default for YtDlpClient {
    fn default() -> Self {
        Self::new(ProviderConfig::from_env())
    }
}

#[async_trait]
impl MediaProvider for YtDlpClient {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch_info(&self, locator: &str) -> Result<FetchedInfo> {
        let args = self.info_args(locator);
        tracing::debug!("running {} {}", self.config.program, args.join(" "));

        let output = self
            .command(&args)
            .output()
            .await
            .map_err(|e| self.launch_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Failed {
                message: failure_message(&stderr, output.status),
            });
        }

        let info: InfoResponse = serde_json::from_slice(&output.stdout)
            .map_err(|e| ProviderError::InvalidOutput(format!("JSON decode error: {}", e)))?;

        Ok(FetchedInfo {
            title: info.title,
            formats: info.formats.into_iter().map(Into::into).collect(),
        })
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        on_event: EventSink<'_>,
    ) -> Result<Option<PathBuf>> {
        let args = self.download_args(request);
        tracing::debug!("running {} {}", self.config.program, args.join(" "));

        let mut child = self.command(&args).spawn().map_err(|e| self.launch_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ProviderError::InvalidOutput("stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ProviderError::InvalidOutput("stderr not captured".to_string()))?;

        let mut out_lines = BufReader::new(stdout).split(b'\n');
        let mut err_lines = BufReader::new(stderr).split(b'\n');
        let (mut out_open, mut err_open) = (true, true);

        let mut last_path: Option<PathBuf> = None;
        let mut stderr_text = String::new();

        while out_open || err_open {
            let (segment, from_stderr) = tokio::select! {
                seg = out_lines.next_segment(), if out_open => (seg?, false),
                seg = err_lines.next_segment(), if err_open => (seg?, true),
            };

            let Some(bytes) = segment else {
                if from_stderr {
                    err_open = false;
                } else {
                    out_open = false;
                }
                continue;
            };

            let line = String::from_utf8_lossy(&bytes);
            let line = line.trim_end_matches('\r');
            if from_stderr {
                stderr_text.push_str(line);
                stderr_text.push('\n');
            }

            if let Some(event) = progress::parse_line(line) {
                if let Some(path) = event.path() {
                    last_path = Some(path.clone());
                }
                on_event(event);
            } else if !line.trim().is_empty() {
                tracing::trace!("[yt-dlp] {}", line);
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(ProviderError::Failed {
                message: failure_message(&stderr_text, status),
            });
        }

        Ok(last_path)
    }
}

/// Pick the part of yt-dlp's stderr worth showing: its `ERROR:` lines, or
/// the last line when there are none.
fn failure_message(stderr: &str, status: std::process::ExitStatus) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("ERROR:"))
        .collect();

    if !errors.is_empty() {
        return errors.join("\n");
    }

    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
        .unwrap_or_else(|| format!("yt-dlp exited with {}", status))
}
