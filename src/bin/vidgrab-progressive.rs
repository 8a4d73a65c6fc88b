//! Lists only formats that already contain both video and audio, then
//! downloads the one picked.

use clap::Parser;
use vidgrab::cli::{self, Args};
use vidgrab::domain::FilterPolicy;

#[tokio::main]
async fn main() {
    cli::run(FilterPolicy::Progressive, Args::parse()).await;
}
