// FormatSelector - quality tier to yt-dlp format expression
//
// Video tiers prefer a separate best video + best audio pair capped at the
// tier height, falling back to the best single stream under the same cap.

use super::models::Quality;

/// Expression used for audio-only downloads
pub const AUDIO_ONLY_FORMAT: &str = "bestaudio/best";

/// Expression used when the tier is not recognised
pub const BEST_FORMAT: &str = "bestvideo+bestaudio/best";

pub struct FormatSelector;

impl FormatSelector {
    /// Get format spec for yt-dlp based on quality tier
    pub fn get_format_spec(quality: Quality) -> String {
        match quality {
            Quality::AudioOnly => AUDIO_ONLY_FORMAT.to_string(),
            Quality::Best => BEST_FORMAT.to_string(),
            tier => match tier.max_height() {
                Some(h) => format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]"),
                None => BEST_FORMAT.to_string(),
            },
        }
    }

    /// Same as [`Self::get_format_spec`], starting from a UI label
    pub fn for_label(label: &str) -> String {
        Self::get_format_spec(Quality::from_label(label))
    }
}
