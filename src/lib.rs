pub mod cli;
pub mod config;
pub mod downloader;
pub mod logging;

use std::path::PathBuf;

pub use config::Config;
pub use downloader::{
    DependencyStatus, DownloadError, DownloadOptions, DownloadProgress, Downloader, ProgressSink, SiteInfo,
    VideoInfo,
};

/// Classify `url` by site. Never fails; unmatched input is "unknown".
pub fn detect_website(url: &str) -> SiteInfo {
    downloader::detect_website(url)
}

/// Metadata preview using the environment's configuration
pub fn get_video_info(url: &str) -> Result<VideoInfo, DownloadError> {
    Downloader::new(Config::from_env()).get_video_info(url)
}

/// Download using the environment's configuration.
///
/// The returned file lives in its own scratch directory; removing both is
/// up to the caller.
pub fn download_video<S>(url: &str, options: &DownloadOptions, sink: &mut S) -> Result<PathBuf, DownloadError>
where
    S: ProgressSink + ?Sized,
{
    Downloader::new(Config::from_env()).download(url, options, sink)
}

pub fn check_dependencies() -> DependencyStatus {
    Downloader::new(Config::from_env()).check_dependencies()
}
