//! Configuration loaded from the environment.

use std::env;
use std::path::PathBuf;

/// Extension given to parts when the source file has none.
pub const DEFAULT_EXTENSION: &str = ".mp4";

/// Where to look for the external media tools and how to name outputs.
#[derive(Clone, Debug)]
pub struct SplitterConfig {
    /// Directory holding bundled `ffmpeg` / `ffprobe` binaries
    pub assets_dir: PathBuf,
    /// Explicit ffmpeg executable, skips the bundled/PATH lookup
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit ffprobe executable
    pub ffprobe_path: Option<PathBuf>,
    /// Extension (with leading dot) used when the source has none
    pub default_extension: String,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            ffmpeg_path: None,
            ffprobe_path: None,
            default_extension: String::from(DEFAULT_EXTENSION),
        }
    }
}

impl SplitterConfig {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            assets_dir: env::var("CUTITNOW_ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_assets_dir()),
            ffmpeg_path: env::var("FFMPEG_PATH").ok().map(PathBuf::from),
            ffprobe_path: env::var("FFPROBE_PATH").ok().map(PathBuf::from),
            default_extension: env::var("CUTITNOW_DEFAULT_EXTENSION")
                .map(|ext| normalize_extension(&ext))
                .unwrap_or_else(|_| String::from(DEFAULT_EXTENSION)),
        }
    }
}

/// `assets/` next to the running executable, or `./assets` if that is unknown.
fn default_assets_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("assets")))
        .unwrap_or_else(|| PathBuf::from("assets"))
}

/// Accepts `mkv` as well as `.mkv`.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.is_empty() {
        String::from(DEFAULT_EXTENSION)
    } else if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}
