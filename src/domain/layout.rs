//! Output naming: `<stem>_parts/part_001.<ext>` next to the source.

use std::path::{Path, PathBuf};

/// `{stem}_parts`, sibling to the source file.
pub fn default_output_dir(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("video"));
    let dir_name = format!("{}_parts", stem);

    match source.parent() {
        Some(parent) => parent.join(dir_name),
        None => PathBuf::from(dir_name),
    }
}

/// The source's extension with its leading dot, or `default` if it has none.
pub fn output_extension(source: &Path, default: &str) -> String {
    source
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_else(|| default.to_string())
}

/// `part_{part:03}{ext}`, `part` being 1-based.
pub fn part_file_name(part: usize, ext: &str) -> String {
    format!("part_{:03}{}", part, ext)
}
