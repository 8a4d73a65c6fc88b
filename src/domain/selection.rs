use super::error::AppError;
use super::filter::{FilterPolicy, FormatTable};
use super::quality::QualityTier;

/// Bare words yt-dlp's format grammar understands on their own.
const SELECTOR_KEYWORDS: &[&str] = &[
    "best", "worst", "b", "w", "bestvideo", "worstvideo", "bv", "wv", "bestaudio",
    "worstaudio", "ba", "wa", "best*", "worst*", "b*", "w*", "bestvideo*", "worstvideo*",
    "bv*", "wv*", "bestaudio*", "worstaudio*", "ba*", "wa*", "mergeall", "all",
];

/// What the user asked to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A format id from the table or a raw selector expression.
    Format(String),
    Tier(QualityTier),
}

impl Selector {
    pub fn expression(&self) -> &str {
        match self {
            Self::Format(expr) => expr,
            Self::Tier(tier) => tier.selector(),
        }
    }

    pub fn is_audio_only(&self) -> bool {
        matches!(self, Self::Tier(tier) if tier.is_audio_only())
    }

    /// True when the selector may pick separate video and audio streams that
    /// have to be merged afterwards.
    pub fn may_need_merge(&self) -> bool {
        if self.is_audio_only() {
            return false;
        }
        let expr = self.expression();
        expr.contains('+')
            || expr
                .split(['/', '[', ','])
                .any(|part| matches!(part.trim(), "bestvideo" | "bestvideo*" | "bv" | "bv*"))
    }

    /// Validate console input against the table the user was shown.
    pub fn from_input(input: &str, table: &FormatTable, policy: FilterPolicy) -> Result<Self, AppError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::EmptySelection);
        }
        if table.contains(input) {
            return Ok(Self::Format(input.to_string()));
        }

        match policy {
            FilterPolicy::Progressive => Err(AppError::InvalidSelection(input.to_string())),
            FilterPolicy::Permissive if looks_like_expression(input) => {
                Ok(Self::Format(input.to_string()))
            }
            FilterPolicy::Permissive => Err(AppError::InvalidSelection(input.to_string())),
        }
    }
}

fn looks_like_expression(input: &str) -> bool {
    SELECTOR_KEYWORDS.contains(&input)
        || input.contains(['+', '/', ',', '[', ']'])
}
