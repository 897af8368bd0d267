// Common data models for downloader

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Site category shown as a badge next to the pasted URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteCategory {
    Anime,
    Youtube,
    Dailymotion,
    Bilibili,
    Social,
    Movie,
    Drama,
    Unknown,
}

impl SiteCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Youtube => "youtube",
            Self::Dailymotion => "dailymotion",
            Self::Bilibili => "bilibili",
            Self::Social => "social",
            Self::Movie => "movie",
            Self::Drama => "drama",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SiteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SiteInfo {
    pub category: SiteCategory,
    pub name: &'static str,
    /// Empty for unknown sites
    pub referer: &'static str,
}

impl SiteInfo {
    pub fn unknown() -> Self {
        Self {
            category: SiteCategory::Unknown,
            name: "Unknown",
            referer: "",
        }
    }
}

/// Quality labels offered for every video, regardless of what the site has
pub const QUALITY_LABELS: [&str; 4] = ["1080p", "720p", "480p", "Audio Only"];

/// Normalized metadata for the preview panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    pub thumbnail: String,
    /// Preformatted by yt-dlp (`duration_string`), e.g. "3:32"
    pub duration: String,
    pub uploader: String,
    pub formats: Vec<String>,
}

impl Default for VideoInfo {
    fn default() -> Self {
        Self {
            title: "Unknown".to_string(),
            thumbnail: String::new(),
            duration: String::new(),
            uploader: String::new(),
            formats: QUALITY_LABELS.iter().map(|q| q.to_string()).collect(),
        }
    }
}

/// Requested quality tier.
///
/// Parsing never fails: anything unrecognised becomes [`Quality::Best`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    Uhd4K,
    Qhd2K,
    P1080,
    P720,
    P480,
    AudioOnly,
    Best,
}

impl Quality {
    /// Map a UI label to a tier.
    ///
    /// 4K and 2K match anywhere in the label ("4K (2160p)"), the other
    /// tiers need the exact label.
    pub fn from_label(label: &str) -> Self {
        if label.contains("4K") {
            Self::Uhd4K
        } else if label.contains("2K") {
            Self::Qhd2K
        } else {
            match label {
                "1080p" => Self::P1080,
                "720p" => Self::P720,
                "480p" => Self::P480,
                "Audio Only" => Self::AudioOnly,
                _ => Self::Best,
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Uhd4K => "4K (2160p)",
            Self::Qhd2K => "2K (1440p)",
            Self::P1080 => "1080p",
            Self::P720 => "720p",
            Self::P480 => "480p",
            Self::AudioOnly => "Audio Only",
            Self::Best => "Best",
        }
    }

    /// Height cap in pixels, `None` for audio and best
    pub fn max_height(&self) -> Option<u32> {
        match self {
            Self::Uhd4K => Some(2160),
            Self::Qhd2K => Some(1440),
            Self::P1080 => Some(1080),
            Self::P720 => Some(720),
            Self::P480 => Some(480),
            Self::AudioOnly | Self::Best => None,
        }
    }

    pub fn is_audio_only(&self) -> bool {
        matches!(self, Self::AudioOnly)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::P1080
    }
}

impl FromStr for Quality {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Container/codec for audio-only downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    M4a,
    Wav,
    Flac,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
            Self::Wav => "wav",
            Self::Flac => "flac",
        }
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "m4a" => Ok(Self::M4a),
            "wav" => Ok(Self::Wav),
            "flac" => Ok(Self::Flac),
            other => Err(format!("unsupported audio format: {}", other)),
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Download options, built per request
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub quality: Quality,
    pub embed_subs: bool,
    pub embed_thumbnail: bool,
    /// Only used when `quality` is audio-only
    pub audio_format: AudioFormat,
    pub custom_filename: Option<String>,
}

impl DownloadOptions {
    pub fn new(quality: Quality) -> Self {
        Self {
            quality,
            ..Self::default()
        }
    }

    pub fn with_subs(mut self, embed: bool) -> Self {
        self.embed_subs = embed;
        self
    }

    pub fn with_thumbnail(mut self, embed: bool) -> Self {
        self.embed_thumbnail = embed;
        self
    }

    pub fn with_audio_format(mut self, format: AudioFormat) -> Self {
        self.audio_format = format;
        self
    }

    pub fn with_filename(mut self, name: Option<String>) -> Self {
        self.custom_filename = name;
        self
    }
}

/// Parsed progress update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub percent: f32,
    pub status: String,
}

/// Result of probing the two external tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyStatus {
    pub ytdlp_version: Option<String>,
    pub ffmpeg_available: bool,
}

impl DependencyStatus {
    pub fn ytdlp_available(&self) -> bool {
        self.ytdlp_version.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_from_label() {
        assert_eq!(Quality::from_label("4K (2160p)"), Quality::Uhd4K);
        assert_eq!(Quality::from_label("4K"), Quality::Uhd4K);
        assert_eq!(Quality::from_label("2K (1440p)"), Quality::Qhd2K);
        assert_eq!(Quality::from_label("1080p"), Quality::P1080);
        assert_eq!(Quality::from_label("720p"), Quality::P720);
        assert_eq!(Quality::from_label("480p"), Quality::P480);
        assert_eq!(Quality::from_label("Audio Only"), Quality::AudioOnly);
        assert_eq!(Quality::from_label("360p"), Quality::Best);
        assert_eq!(Quality::from_label("audio only"), Quality::Best);
    }

    #[test]
    fn test_quality_label_round_trips_through_from_label() {
        for q in [
            Quality::Uhd4K,
            Quality::Qhd2K,
            Quality::P1080,
            Quality::P720,
            Quality::P480,
            Quality::AudioOnly,
        ] {
            assert_eq!(Quality::from_label(q.label()), q);
        }
    }

    #[test]
    fn test_audio_format_parse() {
        assert_eq!("FLAC".parse::<AudioFormat>().unwrap(), AudioFormat::Flac);
        assert!("ogg".parse::<AudioFormat>().is_err());
    }

    #[test]
    fn test_video_info_defaults() {
        let info = VideoInfo::default();
        assert_eq!(info.title, "Unknown");
        assert!(info.thumbnail.is_empty());
        assert!(info.duration.is_empty());
        assert!(info.uploader.is_empty());
        assert_eq!(info.formats, vec!["1080p", "720p", "480p", "Audio Only"]);
    }

    #[test]
    fn test_site_category_serializes_lowercase() {
        let json = serde_json::to_string(&SiteInfo::unknown()).unwrap();
        assert_eq!(json, r#"{"category":"unknown","name":"Unknown","referer":""}"#);
    }
}
