use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::application::{DownloadCoordinator, DownloadEvent};
use crate::domain::{table, AppError, FilterPolicy, FormatTable, Selector};
use crate::provider::ProgressUpdate;

/// Bar length in steps; one step is a tenth of a percent.
const BAR_STEPS: u64 = 1000;

enum ProgressRender {
    /// indicatif bar drawn to `target`, created on the first update.
    Bar {
        target: fn() -> ProgressDrawTarget,
        active: Option<ProgressBar>,
    },
    /// One line per update, for pipes and logs.
    Plain,
}

struct Console<W> {
    out: W,
    progress: ProgressRender,
}

impl<W: Write> Console<W> {
    fn line(&mut self, text: &str) -> std::io::Result<()> {
        self.finish_bar();
        writeln!(self.out, "{}", text)
    }

    fn progress(&mut self, update: &ProgressUpdate) -> std::io::Result<()> {
        match &mut self.progress {
            ProgressRender::Plain => {
                writeln!(self.out, "{}", update)?;
                self.out.flush()
            }
            ProgressRender::Bar { target, active } => {
                let bar = active.get_or_insert_with(|| new_bar(*target));
                bar.set_position((update.percent.clamp(0.0, 100.0) * 10.0).round() as u64);
                bar.set_message(format!(
                    "of {} at {} - ETA: {}",
                    update.total, update.speed, update.eta
                ));
                Ok(())
            }
        }
    }

    /// Leave the finished bar on screen so following lines start below it.
    fn finish_bar(&mut self) {
        if let ProgressRender::Bar { active, .. } = &mut self.progress {
            if let Some(bar) = active.take() {
                bar.abandon();
            }
        }
    }
}

fn new_bar(target: fn() -> ProgressDrawTarget) -> ProgressBar {
    let bar = ProgressBar::with_draw_target(Some(BAR_STEPS), target());
    match ProgressStyle::with_template("Downloading: {bar:32.cyan/blue} {percent:>3}% {msg}") {
        Ok(style) => bar.set_style(style.progress_chars("=> ")),
        Err(err) => tracing::debug!("progress template rejected: {}", err),
    }
    bar
}

/// One interactive run of a console variant: prompt, list, pick, download.
pub struct ConsoleSession<R, W> {
    coordinator: DownloadCoordinator,
    policy: FilterPolicy,
    input: R,
    console: Mutex<Console<W>>,
}

impl<R: BufRead, W: Write + Send> ConsoleSession<R, W> {
    pub fn new(coordinator: DownloadCoordinator, policy: FilterPolicy, input: R, output: W) -> Self {
        Self {
            coordinator,
            policy,
            input,
            console: Mutex::new(Console {
                out: output,
                progress: ProgressRender::Plain,
            }),
        }
    }

    /// Draw download progress as an indicatif bar on stdout instead of
    /// plain lines on the session output.
    pub fn with_progress_bar(self) -> Self {
        self.with_bar_target(ProgressDrawTarget::stdout)
    }

    fn with_bar_target(self, target: fn() -> ProgressDrawTarget) -> Self {
        let mut console = match self.console.into_inner() {
            Ok(console) => console,
            Err(poisoned) => poisoned.into_inner(),
        };
        console.progress = ProgressRender::Bar {
            target,
            active: None,
        };
        Self {
            console: Mutex::new(console),
            ..self
        }
    }

    pub fn into_output(self) -> W {
        let mut console = match self.console.into_inner() {
            Ok(console) => console,
            Err(poisoned) => poisoned.into_inner(),
        };
        console.finish_bar();
        console.out
    }

    /// Every failure is printed before it is returned.
    pub async fn run(&mut self, url: Option<String>, destination: &Path) -> Result<PathBuf, AppError> {
        let result = self.flow(url, destination).await;
        if let Err(err) = &result {
            self.report(err)?;
        }
        result
    }

    async fn flow(&mut self, url: Option<String>, destination: &Path) -> Result<PathBuf, AppError> {
        let locator = match url {
            Some(url) => url,
            None => self.prompt("Enter the video URL: ")?,
        };

        let info = self.coordinator.fetch_metadata(&locator).await?;

        let table = FormatTable::build(&info.formats, self.policy);
        if table.is_empty() {
            return Err(AppError::NoMatchingFormats);
        }

        let heading = match self.policy {
            FilterPolicy::Progressive => "Combined Video + Audio Formats",
            FilterPolicy::Permissive => "Available Formats",
        };
        self.say(&format!("\n### {} for: {} ###\n", heading, info.title))?;
        self.say(table::render(&table, self.policy).trim_end())?;

        let prompt = match self.policy {
            FilterPolicy::Progressive => "\nEnter the CODE to download: ",
            FilterPolicy::Permissive => {
                "\nEnter the CODE for the desired quality (e.g., 'best' or a specific format ID): "
            }
        };
        let choice = self.prompt(prompt)?;
        let selector = Selector::from_input(&choice, &table, self.policy)?;

        let known_extension = table.get(selector.expression()).map(|f| f.ext.clone());
        let request = self.coordinator.build_request(
            &locator,
            &info.title,
            &selector,
            destination,
            known_extension,
        );

        self.say(&format!("\nDownloading format {}...", request.selector))?;

        let console = &self.console;
        let path = self
            .coordinator
            .execute(request, |event| {
                // Output errors must not interrupt a running download.
                let _ = Self::show_event(console, &event);
            })
            .await?;

        self.say(&format!("\n✔ Download complete! Saved as: {}", path.display()))?;
        Ok(path)
    }

    fn show_event(console: &Mutex<Console<W>>, event: &DownloadEvent) -> std::io::Result<()> {
        let Ok(mut console) = console.lock() else {
            return Ok(());
        };
        match event {
            DownloadEvent::Progress(update) => console.progress(update),
            DownloadEvent::Stage(stage) => console.line(stage),
            DownloadEvent::Completed(_) | DownloadEvent::Failed(_) => Ok(()),
        }
    }

    fn say(&self, text: &str) -> Result<(), AppError> {
        let mut console = self
            .console
            .lock()
            .map_err(|_| AppError::Io("console lock poisoned".to_string()))?;
        console.line(text)?;
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> Result<String, AppError> {
        {
            let mut console = self
                .console
                .lock()
                .map_err(|_| AppError::Io("console lock poisoned".to_string()))?;
            write!(console.out, "{}", text)?;
            console.out.flush()?;
        }
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn report(&self, err: &AppError) -> Result<(), AppError> {
        match err {
            AppError::MetadataFetch(msg) => self.say(&format!("\nError: {}", msg)),
            AppError::EmptySelection => self.say("No format selected. Aborting."),
            AppError::InvalidSelection(_) => self.say("Invalid selection."),
            AppError::NoMatchingFormats => self.say(&format!("\n{}", self.policy.empty_message())),
            AppError::ExternalToolMissing { tool, message } => {
                self.say(&format!(
                    "\n!!! ERROR: Download failed, likely because {} is not installed or not in PATH.",
                    tool
                ))?;
                if let Some(help) = err.remediation() {
                    self.say(&help)?;
                }
                self.say(&format!("Details: {}", message))
            }
            AppError::Download(msg) => {
                self.say(&format!("\n!!! An error occurred during download: {}", msg))
            }
            other => self.say(&format!("\nError: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::fake::{sample_formats, FakeProvider};
    use crate::provider::{ProgressUpdate, ProviderEvent};
    use std::io::Cursor;
    use std::sync::Arc;

    async fn run_session(
        provider: Arc<FakeProvider>,
        policy: FilterPolicy,
        input: &str,
        destination: &Path,
    ) -> (Result<PathBuf, AppError>, String) {
        let coordinator = DownloadCoordinator::new(provider);
        let mut session = ConsoleSession::new(
            coordinator,
            policy,
            Cursor::new(input.to_string()),
            Vec::new(),
        );
        let result = session.run(None, destination).await;
        let output = String::from_utf8(session.into_output()).unwrap();
        (result, output)
    }

    fn table_rows(output: &str) -> Vec<String> {
        output
            .lines()
            .skip_while(|line| !line.starts_with("-----"))
            .skip(1)
            .take_while(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_progressive_table_shows_only_combined_format() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider::with_formats("Clip", sample_formats()));
        let (result, output) = run_session(
            provider.clone(),
            FilterPolicy::Progressive,
            "https://example.com/v\n18\n",
            dir.path(),
        )
        .await;

        let rows = table_rows(&output);
        assert_eq!(rows.len(), 1, "{}", output);
        assert!(rows[0].starts_with("18 "));

        assert_eq!(result.unwrap(), dir.path().join("Clip.mp4"));
        assert_eq!(provider.last_request().unwrap().selector, "18");
        assert!(output.contains("Download complete! Saved as:"));
    }

    #[tokio::test]
    async fn test_blank_selection_aborts_before_download() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider::with_formats("Clip", sample_formats()));
        let (result, output) = run_session(
            provider.clone(),
            FilterPolicy::Permissive,
            "https://example.com/v\n\n",
            dir.path(),
        )
        .await;

        assert_eq!(result.unwrap_err(), AppError::EmptySelection);
        assert_eq!(provider.download_count(), 0);
        assert!(output.contains("No format selected. Aborting."));
    }

    #[tokio::test]
    async fn test_progressive_rejects_video_only_id() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider::with_formats("Clip", sample_formats()));
        let (result, output) = run_session(
            provider.clone(),
            FilterPolicy::Progressive,
            "https://example.com/v\n137\n",
            dir.path(),
        )
        .await;

        assert_eq!(result.unwrap_err(), AppError::InvalidSelection("137".into()));
        assert_eq!(provider.download_count(), 0);
        assert!(output.contains("Invalid selection."));
    }

    #[tokio::test]
    async fn test_permissive_merges_combined_selector() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider::with_formats("Clip", sample_formats()));
        let (result, _) = run_session(
            provider.clone(),
            FilterPolicy::Permissive,
            "https://example.com/v\n137+bestaudio\n",
            dir.path(),
        )
        .await;

        assert!(result.is_ok());
        let request = provider.last_request().unwrap();
        assert_eq!(request.selector, "137+bestaudio");
        assert_eq!(request.merge_format.as_deref(), Some("mp4"));
    }

    #[tokio::test]
    async fn test_missing_ffmpeg_shows_remediation_and_raw_message() {
        let dir = tempfile::tempdir().unwrap();
        let raw = "ERROR: Postprocessing: ffprobe and ffmpeg not found";
        let provider = Arc::new(
            FakeProvider::with_formats("Clip", sample_formats())
                .with_events(vec![ProviderEvent::Progress(ProgressUpdate {
                    percent: 100.0,
                    total: "10.00MiB".into(),
                    speed: "2.00MiB/s".into(),
                    eta: "00:00".into(),
                })])
                .with_download_error(raw),
        );
        let (result, output) = run_session(
            provider,
            FilterPolicy::Permissive,
            "https://example.com/v\n137+140\n",
            dir.path(),
        )
        .await;

        assert!(matches!(result, Err(AppError::ExternalToolMissing { .. })));
        assert!(output.contains("Downloading: 100.0% of 10.00MiB at 2.00MiB/s - ETA: 00:00"));
        assert!(output.contains("FFmpeg is not installed or not in PATH"));
        assert!(output.contains("https://ffmpeg.org/download.html"));
        assert!(output.contains(raw));
    }

    fn update(percent: f32) -> ProgressUpdate {
        ProgressUpdate {
            percent,
            total: "10.00MiB".into(),
            speed: "2.00MiB/s".into(),
            eta: "00:03".into(),
        }
    }

    #[test]
    fn test_plain_progress_is_one_line_per_update() {
        let mut console = Console {
            out: Vec::new(),
            progress: ProgressRender::Plain,
        };
        console.progress(&update(10.0)).unwrap();
        console.progress(&update(20.0)).unwrap();
        console.line("done").unwrap();

        let text = String::from_utf8(console.out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(!text.contains('\r'));
        assert!(text.starts_with("Downloading: 10.0% of 10.00MiB"));
    }

    #[test]
    fn test_bar_progress_stays_off_the_output() {
        let mut console = Console {
            out: Vec::new(),
            progress: ProgressRender::Bar {
                target: ProgressDrawTarget::hidden,
                active: None,
            },
        };
        console.progress(&update(42.5)).unwrap();
        match &console.progress {
            ProgressRender::Bar {
                active: Some(bar), ..
            } => {
                assert_eq!(bar.position(), 425);
                assert_eq!(bar.length(), Some(BAR_STEPS));
                assert_eq!(bar.message(), "of 10.00MiB at 2.00MiB/s - ETA: 00:03");
            }
            _ => panic!("bar was not started"),
        }

        console.line("Merging video and audio: Clip.mp4").unwrap();
        assert!(matches!(
            console.progress,
            ProgressRender::Bar { active: None, .. }
        ));
        assert_eq!(
            String::from_utf8(console.out).unwrap(),
            "Merging video and audio: Clip.mp4\n"
        );
    }

    #[tokio::test]
    async fn test_bar_session_prints_lines_only() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(
            FakeProvider::with_formats("Clip", sample_formats())
                .with_events(vec![ProviderEvent::Progress(update(100.0))]),
        );
        let mut session = ConsoleSession::new(
            DownloadCoordinator::new(provider),
            FilterPolicy::Progressive,
            Cursor::new("https://example.com/v\n18\n".to_string()),
            Vec::new(),
        )
        .with_bar_target(ProgressDrawTarget::hidden);

        let result = session.run(None, dir.path()).await;
        let output = String::from_utf8(session.into_output()).unwrap();

        assert!(result.is_ok());
        assert!(!output.contains("Downloading: 100.0%"));
        assert!(output.contains("Download complete! Saved as:"));
    }

    #[tokio::test]
    async fn test_no_matching_formats_skips_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let video_only: Vec<_> = sample_formats().into_iter().skip(1).collect();
        let provider = Arc::new(FakeProvider::with_formats("Clip", video_only));
        let (result, output) = run_session(
            provider,
            FilterPolicy::Progressive,
            "https://example.com/v\n",
            dir.path(),
        )
        .await;

        assert_eq!(result.unwrap_err(), AppError::NoMatchingFormats);
        assert!(output.contains("No progressive (video+audio) formats found."));
        assert!(!output.contains("Enter the CODE"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_printed_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider::failing_fetch("ERROR: Unsupported URL: nope"));
        let (result, output) =
            run_session(provider, FilterPolicy::Progressive, "nope\n", dir.path()).await;

        assert!(matches!(result, Err(AppError::MetadataFetch(_))));
        assert!(output.contains("Error: ERROR: Unsupported URL: nope"));
    }
}
