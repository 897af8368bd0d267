// Downloader module - site detection, tool resolution and the yt-dlp pipeline

pub mod command;
pub mod errors;
pub mod format_selector;
pub mod metadata;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod sites;
pub mod tools;
pub mod utils;

pub use errors::DownloadError;
pub use models::{
    AudioFormat, DependencyStatus, DownloadOptions, DownloadProgress, Quality, SiteCategory, SiteInfo, VideoInfo,
    QUALITY_LABELS,
};
pub use orchestrator::Downloader;
pub use progress::{parse_progress, ProgressSink};
pub use sites::{detect_website, resolve_referer};
pub use tools::{ResolvedTool, ToolResolver, ToolType};
