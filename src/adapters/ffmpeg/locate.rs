use super::hidden_command;
use crate::config::SplitterConfig;
use crate::error::{SplitError, SplitResult};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, info, warn};

/// Resolved external executables, looked up once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub ffmpeg: PathBuf,
    /// Optional: without it the probe falls back to parsing ffmpeg's banner
    pub ffprobe: Option<PathBuf>,
}

impl Toolchain {
    pub async fn resolve(config: &SplitterConfig) -> SplitResult<Self> {
        let ffmpeg = match &config.ffmpeg_path {
            Some(path) => {
                if !runs(path).await {
                    return Err(SplitError::ExternalToolMissing(format!(
                        "ffmpeg ({})",
                        path.display()
                    )));
                }
                path.clone()
            }
            None => locate_tool("ffmpeg", &config.assets_dir).await?,
        };

        let ffprobe = match &config.ffprobe_path {
            Some(path) => Some(path.clone()),
            None => match locate_tool("ffprobe", &config.assets_dir).await {
                Ok(path) => Some(path),
                Err(_) => {
                    warn!("ffprobe not found, durations will be read from ffmpeg output");
                    None
                }
            },
        };

        info!("Using ffmpeg at {}", ffmpeg.display());
        Ok(Self { ffmpeg, ffprobe })
    }
}

/// Bundled `<assets_dir>/<name>` first, then `<name>` from the PATH.
pub async fn locate_tool(name: &str, assets_dir: &Path) -> SplitResult<PathBuf> {
    let bundled = assets_dir.join(executable_name(name));
    if bundled.is_file() {
        debug!("Found bundled {} at {}", name, bundled.display());
        return Ok(bundled);
    }

    if runs(name).await {
        debug!("Found {} on the PATH", name);
        return Ok(PathBuf::from(name));
    }

    Err(SplitError::ExternalToolMissing(name.to_string()))
}

fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

/// Whether `<program> -version` runs and exits cleanly.
async fn runs<S: AsRef<OsStr>>(program: S) -> bool {
    hidden_command(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}
