// Downloader - resolves tools once and drives yt-dlp for each request

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::mpsc;
use std::thread;

use super::command::{CommandBuilder, Invocation};
use super::errors::DownloadError;
use super::metadata::fetch_video_info;
use super::models::{DependencyStatus, DownloadOptions, VideoInfo};
use super::progress::{for_each_line, ProgressSink};
use super::tools::{ToolResolver, ToolType};
use super::utils::{strip_playlist_param, validate_video_id};
use crate::config::Config;

/// Lines buffered between the pipe readers and the sink
const LINE_BUFFER: usize = 256;

/// Side files yt-dlp may leave next to the media file
const SIDECAR_EXTENSIONS: &[&str] = &[
    "vtt", "srt", "ass", "lrc", "ttml", "srv1", "srv2", "srv3", "json3", "webp", "jpg", "png",
];

/// Leftovers of an interrupted download, never a result
const PARTIAL_EXTENSIONS: &[&str] = &["part", "ytdl"];

pub struct Downloader {
    config: Config,
    resolver: ToolResolver,
}

impl Downloader {
    pub fn new(config: Config) -> Self {
        let resolver = ToolResolver::new(&config);
        Self { config, resolver }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn check_dependencies(&self) -> DependencyStatus {
        self.resolver.check_dependencies()
    }

    /// Metadata preview for `url`. Blocking.
    pub fn get_video_info(&self, url: &str) -> Result<VideoInfo, DownloadError> {
        let ytdlp = self.resolver.resolve_tool(ToolType::YtDlp);
        fetch_video_info(&self.config, &ytdlp, url)
    }

    /// Download `url` into a fresh scratch directory and return the produced file.
    ///
    /// Every output line of yt-dlp is handed to `sink` as it arrives. The
    /// returned file (and its directory) belong to the caller afterwards; on
    /// failure the scratch directory is removed.
    /// yt-dlp's exit status is not checked: the presence of a file decides.
    pub fn download<S>(&self, url: &str, options: &DownloadOptions, sink: &mut S) -> Result<PathBuf, DownloadError>
    where
        S: ProgressSink + ?Sized,
    {
        let url = strip_playlist_param(url);
        validate_video_id(&url)?;

        let scratch = tempfile::Builder::new()
            .prefix("video-dl-")
            .tempdir_in(&self.config.scratch_root)?
            .keep();

        let ytdlp = self.resolver.resolve_tool(ToolType::YtDlp);
        let ffmpeg = self.resolver.resolve_tool(ToolType::Ffmpeg);
        let invocation = CommandBuilder::new(&self.config, &ytdlp, &ffmpeg, &scratch).build(&url, options);

        tracing::info!(command = %invocation.display(), "starting download");

        let result = run_streaming(&invocation, sink).and_then(|log| match find_output_file(&scratch)? {
            Some(file) => {
                tracing::info!(file = %file.display(), "download finished");
                Ok(file)
            }
            None => {
                tracing::warn!(dir = %scratch.display(), "yt-dlp produced no file");
                Err(DownloadError::NoFileProduced { log: log.join("\n") })
            }
        });

        if result.is_err() {
            let _ = std::fs::remove_dir_all(&scratch);
        }
        result
    }
}

/// Run `invocation`, forwarding stdout and stderr lines to `sink` in arrival
/// order. Returns every line seen.
fn run_streaming<S>(invocation: &Invocation, sink: &mut S) -> Result<Vec<String>, DownloadError>
where
    S: ProgressSink + ?Sized,
{
    let program = invocation.program.to_string_lossy().into_owned();
    let mut child = invocation
        .to_command()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| DownloadError::from_spawn(&program, e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::Execution(format!("Failed to capture stdout from {}", program)))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::Execution(format!("Failed to capture stderr from {}", program)))?;

    let (tx, rx) = mpsc::sync_channel::<String>(LINE_BUFFER);
    let readers = [spawn_reader(stdout, tx.clone()), spawn_reader(stderr, tx)];

    let mut log = Vec::new();
    for line in rx {
        sink.on_line(&line);
        log.push(line);
    }

    for reader in readers {
        match reader.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("reading yt-dlp output failed: {}", e),
            Err(_) => tracing::warn!("yt-dlp output reader panicked"),
        }
    }

    let status = child.wait()?;
    tracing::debug!(?status, lines = log.len(), "yt-dlp exited");

    Ok(log)
}

fn spawn_reader<R>(pipe: R, tx: mpsc::SyncSender<String>) -> thread::JoinHandle<io::Result<()>>
where
    R: io::Read + Send + 'static,
{
    thread::spawn(move || {
        for_each_line(pipe, |line| {
            let _ = tx.send(line);
        })
    })
}

/// Pick the produced media file in `dir`.
///
/// Files are taken in name order. Subtitles and thumbnails are only returned
/// when nothing else is there. `.part`/`.ytdl` leftovers are never returned,
/// even as the only files present, so an interrupted download reports no file
/// rather than handing back a truncated one.
fn find_output_file(dir: &Path) -> io::Result<Option<PathBuf>> {
    let has_extension_in = |path: &Path, list: &[&str]| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| list.iter().any(|known| known.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    };

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && !has_extension_in(path.as_path(), PARTIAL_EXTENSIONS))
        .collect();
    files.sort();

    let media = files
        .iter()
        .find(|path| !has_extension_in(path.as_path(), SIDECAR_EXTENSIONS))
        .cloned();
    Ok(media.or_else(|| files.into_iter().next()))
}
