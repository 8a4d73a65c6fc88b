pub mod error;
pub mod filter;
pub mod model;
pub mod quality;
pub mod selection;
pub mod table;

pub use error::AppError;
pub use filter::{FilterPolicy, FormatTable};
pub use model::{
    DownloadAttempt, DownloadPhase, DownloadRequest, FormatRecord, MediaInfo, PostProcess,
};
pub use quality::QualityTier;
pub use selection::Selector;
