use super::hidden_command;
use super::locate::Toolchain;
use crate::domain::VideoMetadata;
use crate::error::{SplitError, SplitResult};
use crate::ports::MediaProbe;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Reads duration with ffprobe, or from ffmpeg's `Duration:` banner line when
/// ffprobe is unavailable. Size comes from the filesystem.
#[derive(Debug, Clone)]
pub struct FfmpegProbe {
    ffmpeg: PathBuf,
    ffprobe: Option<PathBuf>,
}

impl FfmpegProbe {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: Option<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe,
        }
    }

    pub fn from_toolchain(toolchain: &Toolchain) -> Self {
        Self::new(toolchain.ffmpeg.clone(), toolchain.ffprobe.clone())
    }

    async fn duration(&self, path: &Path) -> Option<f64> {
        if let Some(ffprobe) = &self.ffprobe {
            match ffprobe_duration(ffprobe, path).await {
                Some(duration) => return Some(duration),
                None => warn!(
                    "ffprobe could not read the duration of {}, falling back to ffmpeg",
                    path.display()
                ),
            }
        }
        ffmpeg_banner_duration(&self.ffmpeg, path).await
    }
}

#[async_trait]
impl MediaProbe for FfmpegProbe {
    async fn probe(&self, path: &Path) -> SplitResult<VideoMetadata> {
        let size_bytes = tokio::fs::metadata(path)
            .await
            .map_err(|e| SplitError::MetadataUnavailable(format!("size ({})", e)))?
            .len();

        let duration_seconds = self
            .duration(path)
            .await
            .ok_or_else(|| SplitError::MetadataUnavailable("duration".to_string()))?;

        debug!(
            "Probed {}: {:.3}s, {} bytes",
            path.display(),
            duration_seconds,
            size_bytes
        );
        Ok(VideoMetadata::new(duration_seconds, size_bytes))
    }
}

async fn ffprobe_duration(ffprobe: &Path, path: &Path) -> Option<f64> {
    let output = hidden_command(ffprobe)
        .arg("-v")
        .arg("error")
        .arg("-show_entries")
        .arg("format=duration")
        .arg("-of")
        .arg("json")
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        debug!(
            "ffprobe failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }
    parse_ffprobe_duration(&String::from_utf8_lossy(&output.stdout))
}

/// `ffmpeg -i <file>` with no output exits non-zero but still prints the
/// input summary on stderr.
async fn ffmpeg_banner_duration(ffmpeg: &Path, path: &Path) -> Option<f64> {
    let output = hidden_command(ffmpeg)
        .arg("-hide_banner")
        .arg("-i")
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .await
        .ok()?;

    parse_banner_duration(&String::from_utf8_lossy(&output.stderr))
}

/// `{"format": {"duration": "12.345000"}}`, the value being a string or a number.
pub fn parse_ffprobe_duration(stdout: &str) -> Option<f64> {
    let v: Value = serde_json::from_str(stdout).ok()?;
    let duration = v.get("format")?.get("duration")?;
    let seconds = match duration {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        other => other.as_f64()?,
    };
    positive(seconds)
}

/// `Duration: 01:02:03.45, start: ...` from ffmpeg's stderr.
pub fn parse_banner_duration(stderr: &str) -> Option<f64> {
    static DURATION_RE: OnceLock<Regex> = OnceLock::new();
    let re = DURATION_RE.get_or_init(|| {
        Regex::new(r"Duration: (\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("valid duration regex")
    });

    let caps = re.captures(stderr)?;
    let hours: f64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: f64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;
    positive(hours * 3600.0 + minutes * 60.0 + seconds)
}

fn positive(seconds: f64) -> Option<f64> {
    (seconds.is_finite() && seconds > 0.0).then_some(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_ffprobe_duration() {
        let json = r#"{ "format": { "duration": "125.041000" } }"#;
        assert_eq!(parse_ffprobe_duration(json), Some(125.041));

        let numeric = r#"{ "format": { "duration": 60.5 } }"#;
        assert_eq!(parse_ffprobe_duration(numeric), Some(60.5));
    }

    #[test]
    fn test_parse_ffprobe_duration_missing() {
        assert_eq!(parse_ffprobe_duration(r#"{ "format": {} }"#), None);
        assert_eq!(parse_ffprobe_duration(r#"{ "format": { "duration": "N/A" } }"#), None);
        assert_eq!(parse_ffprobe_duration(r#"{ "format": { "duration": "0.000000" } }"#), None);
        assert_eq!(parse_ffprobe_duration("not json"), None);
    }

    #[test]
    fn test_parse_banner_duration() {
        let stderr = "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'movie.mp4':\n  \
                      Metadata:\n    major_brand     : isom\n  \
                      Duration: 01:02:03.45, start: 0.000000, bitrate: 1205 kb/s\n\
                      At least one output file must be specified";
        let duration = parse_banner_duration(stderr).unwrap();
        assert!((duration - 3723.45).abs() < 1e-9);
    }

    #[test]
    fn test_parse_banner_duration_unavailable() {
        assert_eq!(parse_banner_duration("  Duration: N/A, bitrate: N/A"), None);
        assert_eq!(parse_banner_duration("movie.mp4: No such file or directory"), None);
        assert_eq!(parse_banner_duration("  Duration: 00:00:00.00, start"), None);
    }

    #[tokio::test]
    async fn test_probe_missing_file_reports_size() {
        let probe = FfmpegProbe::new("/nonexistent/bin/ffmpeg", None);
        let err = probe
            .probe(Path::new("/nonexistent/video.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SplitError::MetadataUnavailable(ref what) if what.starts_with("size")
        ));
    }

    #[tokio::test]
    async fn test_probe_without_tools_reports_duration() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), vec![0u8; 2048]).unwrap();

        let probe = FfmpegProbe::new(
            "/nonexistent/bin/ffmpeg",
            Some(PathBuf::from("/nonexistent/bin/ffprobe")),
        );
        let err = probe.probe(file.path()).await.unwrap_err();
        assert!(matches!(err, SplitError::MetadataUnavailable(ref what) if what == "duration"));
    }
}
