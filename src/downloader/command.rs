// yt-dlp command line assembly
//
// Turns DownloadOptions into the exact argument vector handed to yt-dlp.
// Nothing here spawns a process, so every flag rule is testable on its own.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use super::format_selector::FormatSelector;
use super::models::DownloadOptions;
use super::sites::{origin_from_referer, resolve_referer};
use super::tools::ResolvedTool;
use super::utils::sanitize_filename;
use crate::config::Config;

/// Program plus arguments, ready to spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Start a yt-dlp command line.
    ///
    /// A local binary is run directly; otherwise yt-dlp is run as a Python
    /// module through the configured interpreter.
    pub fn ytdlp(tool: &ResolvedTool, python: &str) -> Self {
        match tool {
            ResolvedTool::Local(path) => Self {
                program: path.clone().into_os_string(),
                args: Vec::new(),
            },
            ResolvedTool::OnPath(_) => Self {
                program: OsString::from(python),
                args: vec![OsString::from("-m"), OsString::from("yt_dlp")],
            },
        }
    }

    pub fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.arg(arg);
        }
        self
    }

    /// True if `flag` appears anywhere in the argument list
    pub fn has_arg(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    /// Value following `flag`, if present
    pub fn value_of(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Space-joined form for logs
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `--dump-json` invocation for the metadata preview
pub fn metadata_invocation(ytdlp: &ResolvedTool, config: &Config, url: &str) -> Invocation {
    let mut inv = Invocation::ytdlp(ytdlp, &config.python);
    inv.args([
        "--dump-json",
        "--no-playlist",
        "--force-ipv4",
        "--no-check-certificates",
    ])
    .arg(url);
    inv
}

/// Custom filename after sanitising, `None` when nothing usable is left
pub fn effective_filename(options: &DownloadOptions) -> Option<String> {
    options
        .custom_filename
        .as_deref()
        .map(sanitize_filename)
        .filter(|name| !name.trim().is_empty())
}

/// yt-dlp output template (file name part only)
pub fn output_template(custom_filename: Option<&str>) -> String {
    match custom_filename {
        Some(name) => format!("{}.%(ext)s", name),
        None => "%(title)s.%(ext)s".to_string(),
    }
}

/// Builds the download command line for one request
pub struct CommandBuilder<'a> {
    config: &'a Config,
    ytdlp: &'a ResolvedTool,
    ffmpeg: &'a ResolvedTool,
    output_dir: &'a Path,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(
        config: &'a Config,
        ytdlp: &'a ResolvedTool,
        ffmpeg: &'a ResolvedTool,
        output_dir: &'a Path,
    ) -> Self {
        Self {
            config,
            ytdlp,
            ffmpeg,
            output_dir,
        }
    }

    /// `url` must already have its playlist parameter stripped.
    pub fn build(&self, url: &str, options: &DownloadOptions) -> Invocation {
        let custom_filename = effective_filename(options);
        let output_path: PathBuf = self
            .output_dir
            .join(output_template(custom_filename.as_deref()));
        let audio_only = options.quality.is_audio_only();

        let mut inv = Invocation::ytdlp(self.ytdlp, &self.config.python);
        inv.arg("-f")
            .arg(FormatSelector::get_format_spec(options.quality))
            .arg("-o")
            .arg(&output_path)
            .args(["--merge-output-format", "mp4"])
            .arg("--no-playlist")
            .arg("--force-ipv4")
            .arg("--no-check-certificates")
            .arg("--socket-timeout")
            .arg(self.config.socket_timeout.as_secs().to_string())
            .args(["--extractor-args", "generic:impersonate"])
            .arg("--user-agent")
            .arg(&self.config.user_agent);

        // Predictable container for the save step
        if custom_filename.is_none() && !audio_only {
            inv.args(["--remux-video", "mp4"]);
        }

        if options.embed_subs {
            inv.args(["--embed-subs", "--sub-langs", "all", "--write-subs"]);
        }

        if options.embed_thumbnail {
            inv.arg("--embed-thumbnail");
        }

        let cookies = self.config.cookies_path();
        if cookies.exists() {
            inv.arg("--cookies").arg(&cookies);
        }

        if let Some(dir) = self.ffmpeg.local_path().and_then(Path::parent) {
            inv.arg("--ffmpeg-location").arg(dir);
        }

        if audio_only {
            inv.args(["-x", "--audio-format", options.audio_format.as_str()]);
        }

        if let Some(referer) = resolve_referer(url) {
            inv.arg("--referer")
                .arg(referer)
                .arg("--add-header")
                .arg(format!("Origin: {}", origin_from_referer(referer)));
        }

        inv.arg(url);
        inv
    }
}
