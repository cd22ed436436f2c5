use once_cell::sync::Lazy;
use regex::Regex;

static HHMM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid HH:MM regex"));

/// 24-hour wall-clock check: "HH:MM", hours 00-23, minutes 00-59.
pub fn is_valid_hhmm(value: &str) -> bool {
    HHMM.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_times() {
        for t in ["00:00", "09:30", "12:05", "23:59"] {
            assert!(is_valid_hhmm(t), "{t} should be valid");
        }
    }

    #[test]
    fn rejects_invalid_times() {
        for t in ["24:00", "12:60", "9:30", "12:5", "noonish", "", "12:30:00"] {
            assert!(!is_valid_hhmm(t), "{t} should be invalid");
        }
    }
}
