//! Format selection and download orchestration on top of yt-dlp.
//!
//! Shared by the `vidgrab` desktop app and the two console variants
//! (`vidgrab-progressive`, `vidgrab-formats`).

pub mod application;
pub mod cli;
pub mod domain;
pub mod provider;
pub mod utils;
