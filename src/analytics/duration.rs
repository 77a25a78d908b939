//! Duration parsing
//!
//! Durations are free text typed by the user ("60분", "약 45분 정도",
//! "60 minutes"). Only the first run of decimal digits carries meaning.

use regex::Regex;
use std::sync::OnceLock;

fn digit_run() -> Option<&'static Regex> {
    static DIGITS: OnceLock<Option<Regex>> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new("[0-9]+").ok()).as_ref()
}

/// Extract minutes from a free-text duration
///
/// Returns the first maximal run of ASCII digits parsed as base 10, or 0 when
/// the input is absent, has no digits, or the number does not fit.
pub fn parse_duration(text: Option<&str>) -> u32 {
    text.and_then(|text| digit_run()?.find(text))
        .and_then(|run| run.as_str().parse().ok())
        .unwrap_or(0)
}
