use std::fmt::{Display, Formatter};

use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}").unwrap());
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{4}").unwrap());

/// Comparable recency marker of a distribution: either a `YYYY-MM-DD` date or a bare `YYYY`
/// year. Both shapes are fixed width and zero padded, so string order is time order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemporalToken(String);

impl Display for TemporalToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Latest date mentioned in a free text temporal description such as `2023-01-01 to 2024-12-31`.
///
/// Full dates win over bare years: years are only looked at when the text holds no date at
/// all. Matching is purely textual, `2024-13-45` is accepted as is.
pub fn extract_latest_token(temporal: &str) -> Option<TemporalToken> {
    if temporal.is_empty() {
        return None;
    }

    latest_match(&ISO_DATE, temporal)
        .or_else(|| latest_match(&YEAR, temporal))
        .map(|token| TemporalToken(token.to_string()))
}

fn latest_match<'a>(pattern: &Regex, text: &'a str) -> Option<&'a str> {
    pattern.find_iter(text).map(|m| m.as_str()).max()
}
