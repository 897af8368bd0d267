// Metadata lookup via `yt-dlp --dump-json`

use serde_json::Value;

use super::command::metadata_invocation;
use super::errors::DownloadError;
use super::models::VideoInfo;
use super::tools::ResolvedTool;
use super::utils::run_output_with_timeout;
use crate::config::Config;

/// Ask yt-dlp for the title, thumbnail, duration and uploader of `url`.
///
/// Blocks for at most `config.metadata_timeout`. Uses its own current-thread
/// runtime, so it must not be called from inside an async context.
pub fn fetch_video_info(config: &Config, ytdlp: &ResolvedTool, url: &str) -> Result<VideoInfo, DownloadError> {
    let invocation = metadata_invocation(ytdlp, config, url);
    tracing::debug!(command = %invocation.display(), "fetching video info");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| DownloadError::Execution(format!("Failed to start runtime: {}", e)))?;
    let output = runtime.block_on(run_output_with_timeout(
        &invocation.program,
        &invocation.args,
        config.metadata_timeout,
    ))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        tracing::warn!(status = ?output.status, "yt-dlp metadata call failed");
        return Err(DownloadError::ToolFailed(stderr));
    }

    parse_video_info(&output.stdout)
}

/// Read the first JSON document in `stdout` into a [`VideoInfo`].
///
/// Missing fields fall back to the defaults; a non-string field counts as
/// missing.
pub fn parse_video_info(stdout: &[u8]) -> Result<VideoInfo, DownloadError> {
    let json = match serde_json::Deserializer::from_slice(stdout).into_iter::<Value>().next() {
        Some(doc) => doc?,
        None => serde_json::from_slice::<Value>(stdout)?,
    };

    let field = |key: &str| json.get(key).and_then(Value::as_str).map(str::to_string);
    let defaults = VideoInfo::default();

    Ok(VideoInfo {
        title: field("title").unwrap_or(defaults.title),
        thumbnail: field("thumbnail").unwrap_or(defaults.thumbnail),
        duration: field("duration_string").unwrap_or(defaults.duration),
        uploader: field("uploader").unwrap_or(defaults.uploader),
        formats: defaults.formats,
    })
}
