mod app;
mod ui;

use iced::{window, Size};

fn main() -> iced::Result {
    vidgrab::utils::init_tracing("info");

    iced::application(app::DownloadApp::new, app::update, app::view)
        .title("yt-dlp Video Downloader")
        .window(window::Settings {
            size: Size::new(640.0, 600.0),
            min_size: Some(Size::new(520.0, 480.0)),
            ..Default::default()
        })
        .run()
}
