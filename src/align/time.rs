/// Formats `seconds` as `H:MM:SS.mmm`: `H` has no leading zero,
/// `MM`/`SS` are zero-padded to 2 digits, `mmm` to 3. Sub-millisecond
/// precision is truncated, not rounded. Negative inputs are not defined.
pub fn time_to_str(seconds: f64) -> String {
    debug_assert!(seconds >= 0.0, "time_to_str is undefined for negative inputs");
    let total_millis = (seconds * 1000.0).floor() as i64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis / 60_000) % 60;
    let secs = (total_millis / 1000) % 60;
    let millis = total_millis % 1000;
    format!("{hours}:{minutes:02}:{secs:02}.{millis:03}")
}

/// Parses a `H:MM:SS.mmm` string back into seconds. Not required by the
/// core pipeline, but kept to exercise the round-trip property and to back the CLI's optional time-range flags.
pub fn parse_time_str(input: &str) -> Option<f64> {
    let (hms, millis_str) = input.split_once('.')?;
    if millis_str.len() != 3 {
        return None;
    }
    let millis: f64 = millis_str.parse().ok()?;

    let parts: Vec<&str> = hms.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let hours: f64 = parts[0].parse().ok()?;
    let minutes: f64 = parts[1].parse().ok()?;
    let seconds: f64 = parts[2].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds + millis / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_sub_millisecond_precision() {
        assert_eq!(time_to_str(3725.015625), "1:02:05.015");
    }

    #[test]
    fn zero_seconds() {
        assert_eq!(time_to_str(0.0), "0:00:00.000");
    }

    #[test]
    fn hours_have_no_leading_zero() {
        assert_eq!(time_to_str(36_000.0), "10:00:00.000");
    }

    #[test]
    fn round_trips_to_millisecond_precision() {
        let seconds = 3725.015;
        let formatted = time_to_str(seconds);
        let parsed = parse_time_str(&formatted).unwrap();
        assert!((parsed - seconds).abs() < 1e-6);
    }
}
