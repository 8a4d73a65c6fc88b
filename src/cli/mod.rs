//! Shared driver for the console variants.

mod session;

use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::application::DownloadCoordinator;
use crate::domain::FilterPolicy;
use crate::provider::{ProviderConfig, YtDlpClient};
use crate::utils::{self, init_tracing};

pub use session::ConsoleSession;

#[derive(Parser, Debug)]
#[command(version)]
#[command(about = "List the formats yt-dlp finds for a video and download the one you pick")]
pub struct Args {
    /// Video URL (prompted for when omitted)
    pub url: Option<String>,

    /// Directory the download is saved to [default: ./downloads]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// yt-dlp program or command line, e.g. "python3 -m yt_dlp"
    #[arg(long = "yt-dlp")]
    pub yt_dlp: Option<String>,

    /// Verify TLS certificates (skipped by default)
    #[arg(long)]
    pub check_certificate: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Run one interactive download for the given listing policy.
pub async fn run(policy: FilterPolicy, args: Args) {
    init_tracing(&args.log_level);

    let config = ProviderConfig::from_env()
        .with_program(args.yt_dlp)
        .with_check_certificate(args.check_certificate);
    let coordinator = DownloadCoordinator::new(Arc::new(YtDlpClient::new(config)));

    let destination = args
        .output_dir
        .unwrap_or_else(utils::default_destination);

    let mut session = ConsoleSession::new(
        coordinator,
        policy,
        std::io::stdin().lock(),
        std::io::stdout(),
    );
    if std::io::stdout().is_terminal() {
        session = session.with_progress_bar();
    }

    // Failures were already printed by the session.
    if let Err(err) = session.run(args.url, &destination).await {
        tracing::debug!("session ended with: {:?}", err);
    }
    let _ = std::io::stdout().flush();
}
