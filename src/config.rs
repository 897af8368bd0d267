//! Runtime configuration.
//!
//! Everything the core needs to know about its environment lives here
//! rather than being derived from where the code happens to be installed.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Desktop Chrome UA sent with every download
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Overrides the directory holding bundled binaries and `cookies.txt`
pub const TOOLS_DIR_ENV: &str = "VIDEO_DL_TOOLS_DIR";

/// Overrides the Python interpreter used for `python -m yt_dlp`
pub const PYTHON_ENV: &str = "YTDLP_PYTHON";

#[derive(Debug, Clone)]
pub struct Config {
    /// First place to look for local yt-dlp/ffmpeg copies
    pub working_dir: PathBuf,
    /// Second place to look for local binaries; also holds the cookie file
    pub tools_dir: PathBuf,
    /// Interpreter for the module fallback when no yt-dlp binary is local
    pub python: String,
    pub cookies_file_name: String,
    /// Bound on the metadata (`--dump-json`) call
    pub metadata_timeout: Duration,
    /// Passed to yt-dlp as `--socket-timeout`
    pub socket_timeout: Duration,
    pub user_agent: String,
    /// Parent of the per-download scratch directories
    pub scratch_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let working_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let tools_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(PathBuf::from))
            .unwrap_or_else(|| working_dir.clone());

        Self {
            working_dir,
            tools_dir,
            python: "python3".to_string(),
            cookies_file_name: "cookies.txt".to_string(),
            metadata_timeout: Duration::from_secs(60),
            socket_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            scratch_root: env::temp_dir(),
        }
    }
}

impl Config {
    /// Defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = env::var_os(TOOLS_DIR_ENV).filter(|v| !v.is_empty()) {
            config.tools_dir = PathBuf::from(dir);
        }
        if let Ok(python) = env::var(PYTHON_ENV) {
            if !python.trim().is_empty() {
                config.python = python;
            }
        }
        config
    }

    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    pub fn with_tools_dir(mut self, dir: PathBuf) -> Self {
        self.tools_dir = dir;
        self
    }

    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    pub fn with_metadata_timeout(mut self, timeout: Duration) -> Self {
        self.metadata_timeout = timeout;
        self
    }

    pub fn with_scratch_root(mut self, dir: PathBuf) -> Self {
        self.scratch_root = dir;
        self
    }

    /// Cookie file location; only used if it exists
    pub fn cookies_path(&self) -> PathBuf {
        self.tools_dir.join(&self.cookies_file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.python, "python3");
        assert_eq!(config.metadata_timeout, Duration::from_secs(60));
        assert_eq!(config.socket_timeout, Duration::from_secs(30));
        assert!(config.user_agent.contains("Chrome/120.0.0.0"));
    }

    #[test]
    fn test_cookies_path_is_in_tools_dir() {
        let config = Config::default().with_tools_dir(PathBuf::from("/opt/vdl"));
        assert_eq!(config.cookies_path(), PathBuf::from("/opt/vdl/cookies.txt"));
    }
}
