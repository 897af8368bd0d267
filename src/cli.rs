use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::downloader::sites::SITE_RULES;
use crate::downloader::{
    detect_website, parse_progress, resolve_referer, AudioFormat, DownloadOptions, Downloader, Quality,
};

#[derive(Parser, Debug)]
#[command(name = "video-downloader")]
#[command(version, about = "Universal video downloader built on yt-dlp + ffmpeg", long_about = None)]
pub struct Cli {
    /// Log debug output (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding local yt-dlp/ffmpeg copies and cookies.txt
    #[arg(long, global = true, env = "VIDEO_DL_TOOLS_DIR")]
    pub tools_dir: Option<PathBuf>,

    /// Python interpreter used when no yt-dlp binary is found
    #[arg(long, global = true, env = "YTDLP_PYTHON")]
    pub python: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show which site a URL belongs to
    Detect {
        url: String,
    },

    /// List the sites that get a category badge
    Sites,

    /// Check that yt-dlp and ffmpeg are usable
    Check {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch title, uploader and duration without downloading
    Info {
        url: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download a video (or its audio track)
    Download(DownloadArgs),
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    pub url: String,

    /// 4K (2160p), 2K (1440p), 1080p, 720p, 480p or "Audio Only"
    #[arg(short, long, default_value = "1080p")]
    pub quality: String,

    /// mp3, m4a, wav or flac; only used with "Audio Only"
    #[arg(long, default_value = "mp3")]
    pub audio_format: String,

    /// Do not embed subtitles
    #[arg(long)]
    pub no_subs: bool,

    /// Do not embed the thumbnail as cover art
    #[arg(long)]
    pub no_thumbnail: bool,

    /// File name without extension (defaults to the video title)
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Where to save the file (defaults to the Downloads folder)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(dir) = &self.tools_dir {
            config = config.with_tools_dir(dir.clone());
        }
        if let Some(python) = &self.python {
            config = config.with_python(python.clone());
        }
        config
    }
}

impl DownloadArgs {
    pub fn options(&self) -> Result<DownloadOptions> {
        let audio_format: AudioFormat = self.audio_format.parse().map_err(anyhow::Error::msg)?;
        Ok(DownloadOptions::new(Quality::from_label(&self.quality))
            .with_subs(!self.no_subs)
            .with_thumbnail(!self.no_thumbnail)
            .with_audio_format(audio_format)
            .with_filename(self.name.clone()))
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let downloader = Downloader::new(cli.config());

    match cli.command {
        Commands::Detect { url } => detect(&url),
        Commands::Sites => {
            print!("{}", sites_listing());
            Ok(())
        }
        Commands::Check { json } => check(&downloader, json),
        Commands::Info { url, json } => info(&downloader, &url, json),
        Commands::Download(args) => download(&downloader, &args),
    }
}

fn detect(url: &str) -> Result<()> {
    let site = detect_website(url);
    println!("Category: {}", site.category);
    println!("Site:     {}", site.name);
    if !site.referer.is_empty() {
        println!("Referer:  {}", site.referer);
    }
    if let Some(referer) = resolve_referer(url) {
        println!("Host referer: {}", referer);
    }
    Ok(())
}

/// Site names grouped by category, in detection order
pub fn sites_listing() -> String {
    let mut out = String::new();
    for (category, rules) in SITE_RULES {
        let mut names: Vec<&str> = Vec::new();
        for rule in rules.iter() {
            if !names.contains(&rule.name) {
                names.push(rule.name);
            }
        }
        out.push_str(&format!("{}: {}\n", category, names.join(", ")));
    }
    out.push_str("Anything else yt-dlp supports also works.\n");
    out
}

fn check(downloader: &Downloader, json: bool) -> Result<()> {
    let status = downloader.check_dependencies();

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        match &status.ytdlp_version {
            Some(version) => println!("✅ yt-dlp {}", version),
            None => println!("❌ yt-dlp not found"),
        }
        if status.ffmpeg_available {
            println!("✅ ffmpeg available");
        } else {
            println!("⚠️  ffmpeg not found, high-resolution downloads may lack audio");
        }
    }

    if !status.ytdlp_available() {
        bail!("yt-dlp is required. Install it with: pip install yt-dlp");
    }
    Ok(())
}

fn info(downloader: &Downloader, url: &str, json: bool) -> Result<()> {
    let info = downloader.get_video_info(url)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Title:     {}", info.title);
    println!("Uploader:  {}", info.uploader);
    println!("Duration:  {}", info.duration);
    println!("Thumbnail: {}", info.thumbnail);
    println!("Qualities: {}", info.formats.join(", "));
    Ok(())
}

fn download(downloader: &Downloader, args: &DownloadArgs) -> Result<()> {
    let options = args.options()?;
    let dest_dir = match &args.output {
        Some(dir) => dir.clone(),
        None => dirs::download_dir()
            .or_else(|| std::env::current_dir().ok())
            .context("No download directory available, pass --output")?,
    };

    let site = detect_website(&args.url);
    println!("🚀 {} ({}) at {}", site.name, site.category, options.quality);

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")?
            .progress_chars("#>-"),
    );

    let mut on_line = |line: &str| {
        tracing::debug!("yt-dlp: {}", line);
        if let Some(progress) = parse_progress(line) {
            pb.set_position(progress.percent as u64);
            pb.set_message(progress.status);
        }
    };

    let result = downloader.download(&args.url, &options, &mut on_line);
    match result {
        Ok(file) => {
            pb.finish_and_clear();
            let saved = deliver(&file, &dest_dir)
                .with_context(|| format!("Failed to move {} to {}", file.display(), dest_dir.display()))?;
            println!("✅ Saved to {}", saved.display());
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            Err(e.into())
        }
    }
}

/// Move a finished download into `dest_dir` and remove its scratch directory.
pub fn deliver(file: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
    let name = file
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "downloaded path has no file name"))?;
    fs::create_dir_all(dest_dir)?;
    let dest = dest_dir.join(name);

    if fs::rename(file, &dest).is_err() {
        // Different filesystem
        fs::copy(file, &dest)?;
        fs::remove_file(file)?;
    }

    if let Some(scratch) = file.parent() {
        if let Err(e) = fs::remove_dir_all(scratch) {
            tracing::warn!(dir = %scratch.display(), "could not remove scratch directory: {}", e);
        }
    }
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliver_moves_file_and_removes_scratch() {
        let scratch_root = tempfile::TempDir::new().unwrap();
        let scratch = scratch_root.path().join("video-dl-abc");
        fs::create_dir(&scratch).unwrap();
        fs::write(scratch.join("Clip.en.vtt"), "WEBVTT").unwrap();
        let file = scratch.join("Clip.mp4");
        fs::write(&file, "video").unwrap();

        let dest = tempfile::TempDir::new().unwrap();
        let saved = deliver(&file, &dest.path().join("out")).unwrap();

        assert_eq!(saved, dest.path().join("out").join("Clip.mp4"));
        assert_eq!(fs::read_to_string(&saved).unwrap(), "video");
        assert!(!scratch.exists());
    }

    #[test]
    fn test_download_args_to_options() {
        let cli = Cli::parse_from([
            "video-downloader",
            "download",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "-q",
            "Audio Only",
            "--audio-format",
            "flac",
            "-n",
            "My Song",
        ]);
        let Commands::Download(args) = cli.command else {
            panic!("expected download command");
        };
        let options = args.options().unwrap();
        assert_eq!(options.quality, Quality::AudioOnly);
        assert_eq!(options.audio_format, AudioFormat::Flac);
        assert_eq!(options.custom_filename.as_deref(), Some("My Song"));
        assert!(options.embed_subs);
        assert!(options.embed_thumbnail);
    }

    #[test]
    fn test_sites_listing_follows_detection_order() {
        let listing = sites_listing();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), SITE_RULES.len() + 1);
        assert!(lines[0].starts_with("anime: GogoAnime, AnimePahe"));
        assert!(lines[1].starts_with("youtube: "));
        assert!(listing.contains("HiAnime"));
    }

    #[test]
    fn test_unknown_audio_format_rejected() {
        let cli = Cli::parse_from(["video-downloader", "download", "https://x.test/v", "--audio-format", "ogg"]);
        let Commands::Download(args) = cli.command else {
            panic!("expected download command");
        };
        assert!(args.options().is_err());
    }
}
