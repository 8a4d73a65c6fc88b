use std::fmt;

use super::model::PostProcess;

pub const DEFAULT_MERGE_FORMAT: &str = "mp4";
pub const AUDIO_CODEC: &str = "mp3";
pub const AUDIO_QUALITY: &str = "192";

/// Preset quality choices offered by the GUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityTier {
    #[default]
    Best,
    High1080,
    Medium720,
    Standard480,
    AudioOnly,
}

impl QualityTier {
    pub const ALL: [QualityTier; 5] = [
        QualityTier::Best,
        QualityTier::High1080,
        QualityTier::Medium720,
        QualityTier::Standard480,
        QualityTier::AudioOnly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Best => "Best Available (Requires FFmpeg)",
            Self::High1080 => "High (1080p if available)",
            Self::Medium720 => "Medium (720p)",
            Self::Standard480 => "Standard (480p)",
            Self::AudioOnly => "Audio Only (MP3)",
        }
    }

    pub fn selector(self) -> &'static str {
        match self {
            Self::Best => "bestvideo+bestaudio/best",
            Self::High1080 => "bestvideo[height<=1080]+bestaudio/best[height<=1080]",
            Self::Medium720 => "bestvideo[height<=720]+bestaudio/best[height<=720]",
            Self::Standard480 => "bestvideo[height<=480]+bestaudio/best[height<=480]",
            Self::AudioOnly => "bestaudio/best",
        }
    }

    pub fn is_audio_only(self) -> bool {
        matches!(self, Self::AudioOnly)
    }

    /// Unknown labels fall back to the default tier.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|tier| tier.label() == label)
            .unwrap_or_default()
    }

    pub fn post_process(self) -> Option<PostProcess> {
        self.is_audio_only().then(|| PostProcess::ExtractAudio {
            codec: AUDIO_CODEC.to_string(),
            quality: AUDIO_QUALITY.to_string(),
        })
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for tier in QualityTier::ALL {
            assert_eq!(QualityTier::from_label(tier.label()), tier);
        }
        assert_eq!(QualityTier::from_label("8K HDR"), QualityTier::Best);
    }

    #[test]
    fn test_only_audio_tier_post_processes() {
        assert_eq!(
            QualityTier::AudioOnly.post_process(),
            Some(PostProcess::ExtractAudio {
                codec: "mp3".into(),
                quality: "192".into()
            })
        );
        for tier in QualityTier::ALL.into_iter().filter(|t| !t.is_audio_only()) {
            assert!(tier.post_process().is_none(), "{}", tier);
            assert!(tier.selector().contains("bestvideo"));
        }
    }
}
