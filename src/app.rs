use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt;
use iced::{task, Task};
use vidgrab::{
    application::{DownloadCoordinator, DownloadEvent},
    domain::{AppError, MediaInfo, Selector},
    provider::{tools::{self, ToolInfo}, ProviderConfig, YtDlpClient},
    utils,
};

use crate::ui::{DownloadMessage, DownloadView};

pub struct DownloadApp {
    view: DownloadView,
    coordinator: DownloadCoordinator,
    provider_config: ProviderConfig,
    /// Abort handle for the fetch or download currently in flight.
    running: Option<task::Handle>,
}

impl DownloadApp {
    pub fn new() -> (Self, Task<Message>) {
        let client = YtDlpClient::default();
        let provider_config = client.config().clone();

        let mut view = DownloadView::default();
        view.destination = utils::default_destination().display().to_string();
        view.log("Checking for yt-dlp and FFmpeg...");

        let app = Self {
            view,
            coordinator: DownloadCoordinator::new(Arc::new(client)),
            provider_config: provider_config.clone(),
            running: None,
        };

        let check = Task::perform(
            async move { tools::check_tools(&provider_config).await },
            Message::ToolsChecked,
        );
        (app, check)
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    ToolsChecked(Vec<ToolInfo>),
    DestinationSelected(Option<PathBuf>),
    /// (Locator, metadata)
    MetadataFetched(String, Result<MediaInfo, AppError>),
    Download(DownloadEvent),
    DialogClosed,
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::BrowsePressed => {
                    let start = PathBuf::from(&app.view.destination);
                    return Task::perform(
                        async move {
                            rfd::AsyncFileDialog::new()
                                .set_directory(&start)
                                .pick_folder()
                                .await
                                .map(|handle| handle.path().to_path_buf())
                        },
                        Message::DestinationSelected,
                    );
                }
                DownloadMessage::DownloadPressed => return start_download(app),
                DownloadMessage::CancelPressed => {
                    if let Some(handle) = app.running.take() {
                        handle.abort();
                    }
                    if app.view.is_downloading {
                        app.view.is_downloading = false;
                        app.view.progress = 0.0;
                        app.view.log(format!("--- {} ---", AppError::Cancelled));
                    }
                }
                DownloadMessage::UrlChanged(_) | DownloadMessage::QualitySelected(_) => {}
            }
        }
        Message::ToolsChecked(status) => {
            let ytdlp_ready = status.first().is_some_and(ToolInfo::is_available);
            let summary: Vec<String> = status.iter().map(ToString::to_string).collect();
            app.view.log(format!("SETUP STATUS: {}", summary.join(", ")));
            app.view.setup_ready = ytdlp_ready;

            if let Some(ffmpeg) = status.get(1).filter(|tool| !tool.is_available()) {
                let err = AppError::ExternalToolMissing {
                    tool: "FFmpeg".to_string(),
                    message: ffmpeg.to_string(),
                };
                if let Some(help) = err.remediation() {
                    app.view.log(help);
                }
            }

            if !ytdlp_ready {
                let err = AppError::ExternalToolMissing {
                    tool: "yt-dlp".to_string(),
                    message: format!("could not run '{}'", app.provider_config.program),
                };
                let help = err.remediation().unwrap_or_else(|| err.to_string());
                app.view.log(help.clone());
                return error_dialog("Setup Failed", help);
            }
        }
        Message::DestinationSelected(Some(path)) => {
            app.view.destination = path.display().to_string();
        }
        Message::DestinationSelected(None) => {}
        Message::MetadataFetched(locator, result) => {
            if !app.view.is_downloading {
                return Task::none();
            }
            match result {
                Ok(info) => {
                    app.view.log(format!("Title: {}", info.title));
                    let request = app.coordinator.build_request(
                        &locator,
                        &info.title,
                        &Selector::Tier(app.view.quality),
                        &PathBuf::from(app.view.destination.trim()),
                        None,
                    );

                    let (download, handle) =
                        Task::stream(app.coordinator.download_stream(request).map(Message::Download))
                            .abortable();
                    app.running = Some(handle);
                    return download;
                }
                Err(err) => return fail(app, err),
            }
        }
        Message::Download(event) => {
            if !app.view.is_downloading {
                return Task::none();
            }
            match event {
                DownloadEvent::Progress(update) => {
                    app.view.progress = update.percent.clamp(0.0, 100.0);
                    app.view.log_progress(update.to_string());
                }
                DownloadEvent::Stage(stage) => app.view.log(stage),
                DownloadEvent::Completed(path) => {
                    app.running = None;
                    app.view.is_downloading = false;
                    app.view.progress = 100.0;
                    app.view
                        .log("*** Download and Processing Finished Successfully! ***");
                    app.view.log(format!("Saved: {}", path.display()));
                }
                DownloadEvent::Failed(err) => return fail(app, err),
            }
        }
        Message::DialogClosed => {}
    }
    Task::none()
}

fn start_download(app: &mut DownloadApp) -> Task<Message> {
    if app.view.is_downloading {
        return Task::none();
    }

    let locator = app.view.url.trim().to_string();
    if locator.is_empty() {
        return error_dialog("Input Error", "Please enter a valid video URL.".to_string());
    }
    if app.view.destination.trim().is_empty() {
        return error_dialog("Path Error", "Download path cannot be empty.".to_string());
    }

    let tier = app.view.quality;
    app.view.is_downloading = true;
    app.view.progress = 0.0;
    app.view.log("--- Starting Download ---");
    app.view.log(format!("URL: {}", locator));
    app.view.log(format!("Destination: {}", app.view.destination.trim()));
    app.view.log(format!(
        "Selected Quality: {} (Format: {})",
        tier.label(),
        tier.selector()
    ));

    let coordinator = app.coordinator.clone();
    let (fetch, handle) = Task::perform(
        async move {
            let result = coordinator.fetch_metadata(&locator).await;
            (locator, result)
        },
        |(locator, result)| Message::MetadataFetched(locator, result),
    )
    .abortable();
    app.running = Some(handle);
    fetch
}

fn fail(app: &mut DownloadApp, err: AppError) -> Task<Message> {
    app.running = None;
    app.view.is_downloading = false;
    app.view.progress = 0.0;

    let (title, description) = match &err {
        AppError::ExternalToolMissing { tool, message } => {
            app.view.log(format!(
                "!!! ERROR: Download failed, likely because {} is not installed or not in PATH.",
                tool
            ));
            if let Some(help) = err.remediation() {
                app.view.log(help);
            }
            app.view.log(format!("Details: {}", message));
            (
                format!("Download Error ({} Missing)", tool),
                format!(
                    "Download failed. Please check the log for {} installation details.",
                    tool
                ),
            )
        }
        AppError::Download(msg) => {
            app.view
                .log(format!("!!! An error occurred during download: {}", msg));
            (
                "Download Error".to_string(),
                "A yt-dlp download error occurred. Check the log for details.".to_string(),
            )
        }
        AppError::MetadataFetch(msg) => {
            app.view.log(format!("!!! Could not read video info: {}", msg));
            ("Download Error".to_string(), msg.clone())
        }
        other => {
            app.view.log(format!("!!! An unexpected error occurred: {}", other));
            ("General Error".to_string(), other.to_string())
        }
    };

    error_dialog(&title, description)
}

fn error_dialog(title: &str, description: String) -> Task<Message> {
    let title = title.to_string();
    Task::perform(
        async move {
            rfd::AsyncMessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title(title)
                .set_description(description)
                .set_buttons(rfd::MessageButtons::Ok)
                .show()
                .await;
        },
        |_| Message::DialogClosed,
    )
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}
