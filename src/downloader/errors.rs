// Error types for the downloader core

use std::time::Duration;
use thiserror::Error;

/// Every failure the public operations can report.
///
/// Errors are always returned as values; nothing in the core panics on a
/// tool failure.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// A `v=` video id shorter than 11 characters, rejected before spawning
    #[error("Invalid YouTube ID: '{id}' (length: {}). YouTube IDs must be 11 characters long.", .id.chars().count())]
    InvalidVideoId { id: String },

    /// yt-dlp exited non-zero; carries its stderr verbatim
    #[error("{0}")]
    ToolFailed(String),

    /// yt-dlp finished but left nothing in the scratch directory
    #[error("No file downloaded. Log: {log}")]
    NoFileProduced { log: String },

    /// Program could not be started because it does not exist
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Metadata call exceeded its wall-clock bound
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// yt-dlp JSON output could not be decoded
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Filesystem or pipe failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else that went wrong while driving the subprocess
    #[error("Execution error: {0}")]
    Execution(String),
}

impl DownloadError {
    /// Map a spawn failure, keeping "program missing" distinguishable.
    pub fn from_spawn(program: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::ToolNotFound(program.to_string())
        } else {
            Self::Execution(format!("Failed to start {}: {}", program, err))
        }
    }

    /// Short category name, handy for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidVideoId { .. } => "invalid_video_id",
            Self::ToolFailed(_) => "tool_failed",
            Self::NoFileProduced { .. } => "no_file",
            Self::ToolNotFound(_) => "tool_not_found",
            Self::Timeout(_) => "timeout",
            Self::Parse(_) => "parse",
            Self::Io(_) => "io",
            Self::Execution(_) => "execution",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id_message() {
        let err = DownloadError::InvalidVideoId { id: "short".to_string() };
        assert_eq!(
            err.to_string(),
            "Invalid YouTube ID: 'short' (length: 5). YouTube IDs must be 11 characters long."
        );
    }

    #[test]
    fn test_tool_failed_is_verbatim() {
        let err = DownloadError::ToolFailed("ERROR: Unsupported URL: x".to_string());
        assert_eq!(err.to_string(), "ERROR: Unsupported URL: x");
    }

    #[test]
    fn test_no_file_embeds_log() {
        let err = DownloadError::NoFileProduced { log: "[generic] x\n[download] 0%".to_string() };
        assert_eq!(err.to_string(), "No file downloaded. Log: [generic] x\n[download] 0%");
        assert_eq!(err.kind(), "no_file");
    }

    #[test]
    fn test_spawn_not_found_maps_to_tool_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = DownloadError::from_spawn("yt-dlp", io);
        assert!(matches!(err, DownloadError::ToolNotFound(ref p) if p == "yt-dlp"));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = DownloadError::from_spawn("yt-dlp", io);
        assert!(matches!(err, DownloadError::Execution(_)));
    }
}
