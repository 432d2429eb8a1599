//! Formatting utilities used for CLI and export outputs.

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// 76.0 → "76.0%"
pub fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Elapsed seconds as `HH:MM:SS` (sign dropped).
pub fn hms(total_secs: i64) -> String {
    let s = total_secs.abs();
    format!("{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(percent(76.0), "76.0%");
        assert_eq!(percent(2.0 / 3.0 * 100.0), "66.7%");
    }

    #[test]
    fn hms_pads_fields() {
        assert_eq!(hms(0), "00:00:00");
        assert_eq!(hms(3725), "01:02:05");
    }
}
