// Helper functions for the download pipeline

use regex::Regex;
use std::ffi::OsString;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use super::errors::DownloadError;

lazy_static::lazy_static! {
    static ref LIST_PARAM_RE: Regex = Regex::new(r"&list=[^&]*").unwrap();
    static ref VIDEO_ID_RE: Regex = Regex::new(r"[?&]v=([\w-]*)").unwrap();
    static ref YOUTUBE_HOST_RE: Regex = Regex::new(r"(?i)(youtube\.com|youtu\.be)").unwrap();
    static ref FORBIDDEN_FILENAME_RE: Regex = Regex::new(r#"[\\/*?:"<>|]"#).unwrap();
}

/// Length of a YouTube video id
pub const YOUTUBE_ID_LEN: usize = 11;

/// Drop `&list=...` so a single-video link is not treated as a playlist entry
pub fn strip_playlist_param(url: &str) -> String {
    LIST_PARAM_RE.replace_all(url, "").into_owned()
}

/// Reject YouTube `v=` ids shorter than 11 characters before anything is spawned.
///
/// Other hosts and URLs without a `v=` parameter pass untouched.
pub fn validate_video_id(url: &str) -> Result<(), DownloadError> {
    if !YOUTUBE_HOST_RE.is_match(url) {
        return Ok(());
    }
    if let Some(caps) = VIDEO_ID_RE.captures(url) {
        let id = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        if id.chars().count() < YOUTUBE_ID_LEN {
            return Err(DownloadError::InvalidVideoId { id: id.to_string() });
        }
    }
    Ok(())
}

/// Remove `\ / * ? : " < > |` and keep everything else in order
pub fn sanitize_filename(name: &str) -> String {
    FORBIDDEN_FILENAME_RE.replace_all(name, "").into_owned()
}

/// Run command with timeout, capturing stdout and stderr separately
pub async fn run_output_with_timeout(
    program: &OsString,
    args: &[OsString],
    limit: Duration,
) -> Result<std::process::Output, DownloadError> {
    let display = program.to_string_lossy().into_owned();
    let mut child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| DownloadError::from_spawn(&display, e))?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::Execution(format!("Failed to capture stdout from {}", display)))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::Execution(format!("Failed to capture stderr from {}", display)))?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    match timeout(limit, child.wait()).await {
        Ok(status_res) => {
            let status = status_res?;
            let stdout = stdout_task
                .await
                .map_err(|e| DownloadError::Execution(format!("stdout task failed: {}", e)))??;
            let stderr = stderr_task
                .await
                .map_err(|e| DownloadError::Execution(format!("stderr task failed: {}", e)))??;
            Ok(std::process::Output { status, stdout, stderr })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(DownloadError::Timeout(limit))
        }
    }
}
