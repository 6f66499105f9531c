/// Format seconds as `M:SS`: no hour component, seconds zero-padded,
/// fractional seconds truncated. Negative or non-finite input reads as zero.
pub fn format_time(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::format_time;

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_time(125.4), "2:05");
        assert_eq!(format_time(59.9), "0:59");
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(60.0), "1:00");
    }

    #[test]
    fn long_tracks_keep_counting_minutes() {
        assert_eq!(format_time(3725.0), "62:05");
    }

    #[test]
    fn garbage_reads_as_zero() {
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }
}
