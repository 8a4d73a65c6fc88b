//! Lists every usable format and downloads the chosen id or selector
//! expression, merging separate streams into mp4.

use clap::Parser;
use vidgrab::cli::{self, Args};
use vidgrab::domain::FilterPolicy;

#[tokio::main]
async fn main() {
    cli::run(FilterPolicy::Permissive, Args::parse()).await;
}
