use serde::Serialize;
use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::models::DependencyStatus;
use crate::config::Config;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Ffmpeg,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
        }
    }

    fn version_arg(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "--version",
            ToolType::Ffmpeg => "-version", // ffmpeg uses a single dash
        }
    }
}

/// Where a tool will be invoked from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTool {
    /// A copy found next to the app (working dir or tools dir)
    Local(PathBuf),
    /// Bare name, left to the OS search path at spawn time
    OnPath(String),
}

impl ResolvedTool {
    pub fn program(&self) -> &std::ffi::OsStr {
        match self {
            ResolvedTool::Local(path) => path.as_os_str(),
            ResolvedTool::OnPath(name) => std::ffi::OsStr::new(name.as_str()),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, ResolvedTool::Local(_))
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            ResolvedTool::Local(path) => Some(path),
            ResolvedTool::OnPath(_) => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            ResolvedTool::Local(path) => path.display().to_string(),
            ResolvedTool::OnPath(name) => name.clone(),
        }
    }
}

/// Finds local copies of yt-dlp/ffmpeg before falling back to PATH.
///
/// Only a filesystem stat is done; the file is not checked for being
/// executable or for being the right program.
#[derive(Debug, Clone)]
pub struct ToolResolver {
    search_dirs: Vec<PathBuf>,
}

impl ToolResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            search_dirs: vec![config.working_dir.clone(), config.tools_dir.clone()],
        }
    }

    pub fn resolve(&self, name: &str) -> ResolvedTool {
        let file_name = format!("{}{}", name, EXE_SUFFIX);

        for dir in &self.search_dirs {
            let candidate = dir.join(&file_name);
            if candidate.exists() {
                let path = std::path::absolute(&candidate).unwrap_or(candidate);
                tracing::debug!(tool = name, path = %path.display(), "Using local binary");
                return ResolvedTool::Local(path);
            }
        }

        ResolvedTool::OnPath(name.to_string())
    }

    pub fn resolve_tool(&self, tool: ToolType) -> ResolvedTool {
        self.resolve(tool.as_str())
    }

    /// Probe yt-dlp and ffmpeg.
    ///
    /// yt-dlp is actually run; its stdout is the version whatever the exit
    /// code. A local ffmpeg counts as available without running it, a PATH
    /// ffmpeg only has to start.
    pub fn check_dependencies(&self) -> DependencyStatus {
        let ytdlp = self.resolve_tool(ToolType::YtDlp);
        let ffmpeg = self.resolve_tool(ToolType::Ffmpeg);

        let ytdlp_version = get_version(&ytdlp, ToolType::YtDlp);

        let ffmpeg_available = if ffmpeg.is_local() {
            true
        } else {
            Command::new(ffmpeg.program())
                .arg(ToolType::Ffmpeg.version_arg())
                .stdin(Stdio::null())
                .output()
                .is_ok()
        };

        if ytdlp_version.is_none() {
            tracing::warn!(path = %ytdlp.display(), "yt-dlp not available");
        }
        if !ffmpeg_available {
            tracing::warn!("ffmpeg not available, high-resolution downloads may lack audio");
        }

        DependencyStatus {
            ytdlp_version,
            ffmpeg_available,
        }
    }
}

fn get_version(tool: &ResolvedTool, tool_type: ToolType) -> Option<String> {
    match Command::new(tool.program())
        .arg(tool_type.version_arg())
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) => {
            let out = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if out.is_empty() {
                None
            } else {
                Some(out)
            }
        }
        Err(e) => {
            tracing::debug!(tool = tool_type.as_str(), error = %e, "Version probe failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_for(working: &Path, tools: &Path) -> Config {
        Config::default()
            .with_working_dir(working.to_path_buf())
            .with_tools_dir(tools.to_path_buf())
    }

    #[test]
    fn test_prefers_working_dir() {
        let working = tempfile::tempdir().unwrap();
        let tools = tempfile::tempdir().unwrap();
        let name = format!("yt-dlp{}", EXE_SUFFIX);
        fs::write(working.path().join(&name), b"").unwrap();
        fs::write(tools.path().join(&name), b"").unwrap();

        let resolver = ToolResolver::new(&config_for(working.path(), tools.path()));
        let resolved = resolver.resolve("yt-dlp");
        assert_eq!(resolved.local_path(), Some(working.path().join(&name).as_path()));
    }

    #[test]
    fn test_falls_back_to_tools_dir() {
        let working = tempfile::tempdir().unwrap();
        let tools = tempfile::tempdir().unwrap();
        let name = format!("ffmpeg{}", EXE_SUFFIX);
        fs::write(tools.path().join(&name), b"").unwrap();

        let resolver = ToolResolver::new(&config_for(working.path(), tools.path()));
        let resolved = resolver.resolve_tool(ToolType::Ffmpeg);
        assert!(resolved.is_local());
        assert_eq!(resolved.local_path(), Some(tools.path().join(&name).as_path()));
    }

    #[test]
    fn test_bare_name_when_nothing_local() {
        let working = tempfile::tempdir().unwrap();
        let tools = tempfile::tempdir().unwrap();

        let resolver = ToolResolver::new(&config_for(working.path(), tools.path()));
        let resolved = resolver.resolve("yt-dlp");
        assert_eq!(resolved, ResolvedTool::OnPath("yt-dlp".to_string()));
        assert_eq!(resolved.program(), "yt-dlp");
        assert!(resolved.local_path().is_none());
    }

    #[test]
    fn test_local_ffmpeg_is_available_without_running() {
        let working = tempfile::tempdir().unwrap();
        let tools = tempfile::tempdir().unwrap();
        // Not executable and not ffmpeg at all: still counts
        fs::write(tools.path().join(format!("ffmpeg{}", EXE_SUFFIX)), b"not a binary").unwrap();

        let resolver = ToolResolver::new(&config_for(working.path(), tools.path()));
        let status = resolver.check_dependencies();
        assert!(status.ffmpeg_available);
    }
}
