//! ffmpeg/ffprobe adapters. Every child process goes through
//! [`hidden_command`].

pub mod cutter;
pub mod locate;
pub mod probe;

pub use cutter::FfmpegCutter;
pub use locate::{locate_tool, Toolchain};
pub use probe::FfmpegProbe;

use std::ffi::OsStr;
use tokio::process::Command;

/// Windows flag to prevent child processes from creating visible console windows.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Create a Command that won't spawn a visible console window on Windows.
pub fn hidden_command<S: AsRef<OsStr>>(program: S) -> Command {
    let mut cmd = Command::new(program);
    #[cfg(windows)]
    cmd.creation_flags(CREATE_NO_WINDOW);
    cmd.kill_on_drop(true);
    cmd
}
