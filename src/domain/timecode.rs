/// Encode seconds as `HH:MM:SS.mmm` for ffmpeg's `-ss` / `-t`.
///
/// The value is rounded to whole milliseconds before splitting into fields,
/// so 59.9996 becomes `00:01:00.000` rather than `00:00:60.000`. Negative
/// and non-finite values encode as zero.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}
