use super::hidden_command;
use crate::domain::timecode::format_timestamp;
use crate::ports::{CutOutput, CutRequest, SegmentCutter};
use async_trait::async_trait;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use tracing::debug;

/// Characters of ffmpeg's stderr kept as the failure diagnostic.
const DIAGNOSTIC_CHARS: usize = 1000;

/// Cuts segments with `ffmpeg -c copy`: no decoding, no re-encoding.
#[derive(Debug, Clone)]
pub struct FfmpegCutter {
    ffmpeg: PathBuf,
}

impl FfmpegCutter {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    /// `-y -i <src> -ss <start> [-t <len>] -c copy <dst>`
    pub fn build_args(request: &CutRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-y".into(),
            "-i".into(),
            request.source.clone().into(),
            "-ss".into(),
            format_timestamp(request.start_offset_seconds).into(),
        ];
        if let Some(length) = request.length_seconds {
            args.push("-t".into());
            args.push(format_timestamp(length).into());
        }
        args.push("-c".into());
        args.push("copy".into());
        args.push(request.destination.clone().into());
        args
    }
}

#[async_trait]
impl SegmentCutter for FfmpegCutter {
    async fn cut(&self, request: &CutRequest) -> io::Result<CutOutput> {
        let args = Self::build_args(request);
        debug!("Running {} {:?}", self.ffmpeg.display(), args);

        let output = hidden_command(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if output.status.success() {
            return Ok(CutOutput::succeeded());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(CutOutput::failed(format!(
            "ffmpeg exited with code {}: {}",
            output.status.code().unwrap_or(-1),
            tail(stderr.trim(), DIAGNOSTIC_CHARS)
        )))
    }
}

/// Last `max_chars` characters of `text`; the end of ffmpeg's log carries the error.
fn tail(text: &str, max_chars: usize) -> &str {
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }
    match text.char_indices().nth(count - max_chars) {
        Some((offset, _)) => &text[offset..],
        None => text,
    }
}
