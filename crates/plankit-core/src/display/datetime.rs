//! Time formatting helpers.

use std::fmt;

use jiff::{Timestamp, tz::TimeZone};

/// Formats a timestamp in the system time zone as `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let zoned = self.0.to_zoned(TimeZone::system());
        write!(f, "{}", zoned.strftime("%Y-%m-%d %H:%M:%S %Z"))
    }
}

/// Formats a duration given in milliseconds: `850 ms`, `4.2 s`, `3 min 5 s`.
#[derive(Debug, Clone, Copy)]
pub struct Elapsed(pub u64);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.0;
        match millis {
            0..1_000 => write!(f, "{millis} ms"),
            1_000..60_000 => write!(f, "{:.1} s", millis as f64 / 1_000.0),
            _ => {
                let seconds = millis / 1_000;
                write!(f, "{} min {} s", seconds / 60, seconds % 60)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed() {
        assert_eq!(Elapsed(850).to_string(), "850 ms");
        assert_eq!(Elapsed(4_200).to_string(), "4.2 s");
        assert_eq!(Elapsed(185_000).to_string(), "3 min 5 s");
    }

    #[test]
    fn test_local_date_time_shape() {
        let ts: Timestamp = "2024-03-01T12:00:00Z".parse().unwrap();
        let text = LocalDateTime(&ts).to_string();
        assert!(text.starts_with("2024-0"), "{text}");
        assert_eq!(text.matches(':').count(), 2);
    }
}
