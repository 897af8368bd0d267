// Progress plumbing: where yt-dlp output lines go, and how to read them

use regex::Regex;
use std::io::{self, BufRead, BufReader, Read};
use std::sync::mpsc::{Sender, SyncSender};

use super::models::DownloadProgress;

/// Receives every raw output line of a running download, in order.
pub trait ProgressSink {
    fn on_line(&mut self, line: &str);
}

impl<F: FnMut(&str)> ProgressSink for F {
    fn on_line(&mut self, line: &str) {
        self(line)
    }
}

impl ProgressSink for Sender<String> {
    fn on_line(&mut self, line: &str) {
        let _ = self.send(line.to_string());
    }
}

impl ProgressSink for SyncSender<String> {
    fn on_line(&mut self, line: &str) {
        let _ = self.send(line.to_string());
    }
}

impl ProgressSink for Vec<String> {
    fn on_line(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Call `f` for every line of `reader`.
///
/// Both `\n` and `\r` end a line (yt-dlp redraws its progress with bare
/// carriage returns); empty lines are skipped and invalid UTF-8 is replaced
/// rather than ending the read.
pub fn for_each_line<R: Read>(reader: R, mut f: impl FnMut(String)) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let buf = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if buf.is_empty() {
            break;
        }
        let consumed = buf.len();
        for &byte in buf {
            if byte == b'\n' || byte == b'\r' {
                if !pending.is_empty() {
                    f(String::from_utf8_lossy(&pending).into_owned());
                    pending.clear();
                }
            } else {
                pending.push(byte);
            }
        }
        reader.consume(consumed);
    }

    if !pending.is_empty() {
        f(String::from_utf8_lossy(&pending).into_owned());
    }
    Ok(())
}

/// Parse yt-dlp progress line like:
/// [download]   6.2% of ~ 343.72MiB at  420.30KiB/s ETA 12:32 (frag 29/454)
pub fn parse_progress(line: &str) -> Option<DownloadProgress> {
    lazy_static::lazy_static! {
        static ref DETAIL_RE: Regex = Regex::new(
            r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*(\d+\.?\d*\s*\w+)(?:\s+at\s+(\S+))?(?:\s+ETA\s+(\S+))?"
        ).unwrap();
        static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").unwrap();
        static ref MERGE_RE: Regex = Regex::new(r"\[Merger?\]\s+Merging").unwrap();
        static ref ALREADY_RE: Regex = Regex::new(r"has already been downloaded").unwrap();
    }

    if line.contains("[download]") && line.contains('%') {
        if let Some(percent) = percent_before_sign(line) {
            let status = match DETAIL_RE.captures(line) {
                Some(caps) => {
                    let size = caps.get(2).map(|m| m.as_str()).unwrap_or("?");
                    let speed = caps.get(3).map(|m| m.as_str());
                    let eta = caps.get(4).map(|m| m.as_str());
                    match (speed, eta) {
                        (Some(speed), Some(eta)) => {
                            format!("Downloading {:.1}% of {} @ {} ETA {}", percent, size, speed, eta)
                        }
                        (Some(speed), None) => format!("Downloading {:.1}% of {} @ {}", percent, size, speed),
                        _ => format!("Downloading {:.1}% of {}", percent, size),
                    }
                }
                None => format!("Downloading: {}%", percent),
            };
            return Some(DownloadProgress { percent, status });
        }
    }

    if let Some(caps) = DEST_RE.captures(line) {
        let filename = caps.get(1).map(|m| m.as_str()).unwrap_or("file");
        let short_name: String = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(filename)
            .chars()
            .take(50)
            .collect();
        return Some(DownloadProgress {
            percent: 0.0,
            status: format!("Starting: {}", short_name),
        });
    }

    if MERGE_RE.is_match(line) {
        return Some(DownloadProgress {
            percent: 99.0,
            status: "Merging video and audio...".to_string(),
        });
    }

    if ALREADY_RE.is_match(line) {
        return Some(DownloadProgress {
            percent: 100.0,
            status: "File already downloaded".to_string(),
        });
    }

    None
}

/// Last whitespace-separated token before the first `%`, as a number
fn percent_before_sign(line: &str) -> Option<f32> {
    let head = line.split('%').next()?;
    let token = head.split_whitespace().last()?;
    let percent: f32 = token.parse().ok()?;
    (0.0..=100.0).contains(&percent).then_some(percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_split_on_newline_and_carriage_return() {
        let input = b"[youtube] abc: Downloading webpage\n[download]   1.0% of 10MiB\r[download]  50.0% of 10MiB\r\n[download] 100% of 10MiB\n";
        let mut lines = Vec::new();
        for_each_line(&input[..], |l| lines.push(l)).unwrap();
        assert_eq!(
            lines,
            vec![
                "[youtube] abc: Downloading webpage",
                "[download]   1.0% of 10MiB",
                "[download]  50.0% of 10MiB",
                "[download] 100% of 10MiB",
            ]
        );
    }

    #[test]
    fn test_trailing_line_without_newline() {
        let mut lines = Vec::new();
        for_each_line(&b"first\nlast"[..], |l| lines.push(l)).unwrap();
        assert_eq!(lines, vec!["first", "last"]);
    }

    #[test]
    fn test_invalid_utf8_does_not_stop_reading() {
        let input = b"ok\n\xff\xfe broken\nafter\n";
        let mut lines = Vec::new();
        for_each_line(&input[..], |l| lines.push(l)).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "after");
    }

    #[test]
    fn test_parse_full_progress_line() {
        let p = parse_progress("[download]   6.2% of ~ 343.72MiB at  420.30KiB/s ETA 12:32 (frag 29/454)").unwrap();
        assert!((p.percent - 6.2).abs() < f32::EPSILON);
        assert!(p.status.contains("343.72MiB"));
        assert!(p.status.contains("420.30KiB/s"));
        assert!(p.status.contains("12:32"));
    }

    #[test]
    fn test_parse_bare_percentage() {
        let p = parse_progress("[download] 100% of 12.00MiB in 00:00:03").unwrap();
        assert_eq!(p.percent, 100.0);

        let p = parse_progress("[download]  42.5%").unwrap();
        assert_eq!(p.percent, 42.5);
        assert_eq!(p.status, "Downloading: 42.5%");
    }

    #[test]
    fn test_parse_destination_merge_already() {
        let p = parse_progress("[download] Destination: /tmp/x/My Video.f137.mp4").unwrap();
        assert_eq!(p.percent, 0.0);
        assert_eq!(p.status, "Starting: My Video.f137.mp4");

        let p = parse_progress("[Merger] Merging formats into \"/tmp/x/My Video.mp4\"").unwrap();
        assert_eq!(p.percent, 99.0);

        let p = parse_progress("[download] /tmp/x/My Video.mp4 has already been downloaded").unwrap();
        assert_eq!(p.percent, 100.0);
    }

    #[test]
    fn test_non_progress_lines() {
        assert!(parse_progress("[youtube] dQw4w9WgXcQ: Downloading webpage").is_none());
        assert!(parse_progress("50% off everything").is_none());
        assert!(parse_progress("[download] abc% of").is_none());
        assert!(parse_progress("").is_none());
    }

    #[test]
    fn test_closure_and_vec_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |line: &str| seen.push(line.len());
            sink.on_line("abc");
        }
        assert_eq!(seen, vec![3]);

        let mut lines: Vec<String> = Vec::new();
        lines.on_line("x");
        assert_eq!(lines, vec!["x"]);
    }

    #[test]
    fn test_channel_sink() {
        let (mut tx, rx) = std::sync::mpsc::channel::<String>();
        tx.on_line("[download]  10.0%");
        drop(tx);
        assert_eq!(rx.iter().collect::<Vec<_>>(), vec!["[download]  10.0%"]);
    }
}
