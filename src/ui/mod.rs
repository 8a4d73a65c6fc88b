use iced::{
    widget::{button, column, pick_list, progress_bar, row, scrollable, text, text_input, Column},
    Alignment, Element, Length,
};
use vidgrab::domain::{error::FFMPEG_URL, QualityTier};

const LABEL_WIDTH: f32 = 80.0;

/// Main view state
pub struct DownloadView {
    pub url: String,
    pub destination: String,
    pub quality: QualityTier,
    pub progress: f32,
    pub is_downloading: bool,
    pub setup_ready: bool,
    log: Vec<String>,
    /// Last log line is a live progress line that the next update replaces.
    progress_line: bool,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            url: String::new(),
            destination: String::new(),
            quality: QualityTier::default(),
            progress: 0.0,
            is_downloading: false,
            setup_ready: false,
            log: Vec::new(),
            progress_line: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    QualitySelected(QualityTier),
    BrowsePressed,
    DownloadPressed,
    CancelPressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.url = url;
            }
            DownloadMessage::QualitySelected(quality) => {
                self.quality = quality;
            }
            DownloadMessage::BrowsePressed
            | DownloadMessage::DownloadPressed
            | DownloadMessage::CancelPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn log(&mut self, line: impl Into<String>) {
        self.progress_line = false;
        self.log.push(line.into());
    }

    /// Overwrite the previous progress line for a live update effect.
    pub fn log_progress(&mut self, line: impl Into<String>) {
        if self.progress_line {
            self.log.pop();
        }
        self.log.push(line.into());
        self.progress_line = true;
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let idle = !self.is_downloading;

        let browse = button("Browse").on_press_maybe(idle.then_some(DownloadMessage::BrowsePressed));
        let start = button(" START DOWNLOAD ")
            .on_press_maybe((idle && self.setup_ready).then_some(DownloadMessage::DownloadPressed))
            .padding([10, 20]);
        let cancel = button("Cancel")
            .on_press_maybe(self.is_downloading.then_some(DownloadMessage::CancelPressed))
            .padding([10, 20]);

        let log = scrollable(
            Column::with_children(
                self.log
                    .iter()
                    .map(|line| text(line.as_str()).size(13).into()),
            )
            .spacing(2)
            .width(Length::Fill),
        )
        .anchor_bottom()
        .height(Length::Fill);

        column![
            text("Video Downloader").size(28),
            row![
                text("Video URL:").width(Length::Fixed(LABEL_WIDTH)),
                text_input("https://www.youtube.com/watch?v=...", &self.url)
                    .on_input(DownloadMessage::UrlChanged)
                    .padding(8),
            ]
            .spacing(10)
            .align_y(Alignment::Center),
            row![
                text("Save To:").width(Length::Fixed(LABEL_WIDTH)),
                text_input("Download folder", &self.destination).padding(8),
                browse,
            ]
            .spacing(10)
            .align_y(Alignment::Center),
            row![
                text("Quality:").width(Length::Fixed(LABEL_WIDTH)),
                pick_list(
                    QualityTier::ALL,
                    Some(self.quality),
                    DownloadMessage::QualitySelected
                ),
            ]
            .spacing(10)
            .align_y(Alignment::Center),
            row![start, cancel].spacing(10),
            progress_bar(0.0..=100.0, self.progress),
            text("Log/Status:").size(14),
            log,
            text(format!(
                "NOTE: Merging video/audio requires FFmpeg. Get it here: {}",
                FFMPEG_URL
            ))
            .size(12),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}
