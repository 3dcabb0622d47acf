//! The fixed range selector.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Query window token. Bucketing is decided entirely by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Range {
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "12h")]
    TwelveHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl Range {
    /// All ranges in selector order.
    pub const ALL: [Range; 5] = [
        Range::OneHour,
        Range::TwelveHours,
        Range::OneDay,
        Range::SevenDays,
        Range::ThirtyDays,
    ];

    /// Wire token sent to the backend.
    pub fn token(self) -> &'static str {
        match self {
            Range::OneHour => "1h",
            Range::TwelveHours => "12h",
            Range::OneDay => "1d",
            Range::SevenDays => "7d",
            Range::ThirtyDays => "30d",
        }
    }

    /// Label shown on the selector button.
    pub fn label(self) -> &'static str {
        match self {
            Range::OneHour => "Hourly",
            Range::TwelveHours => "12 hours",
            Range::OneDay => "Daily",
            Range::SevenDays => "7 days",
            Range::ThirtyDays => "Monthly",
        }
    }

    pub fn from_token(token: &str) -> Option<Range> {
        Range::ALL.into_iter().find(|r| r.token() == token.trim())
    }

    /// Parse an optional query value; anything unknown selects `fallback`.
    pub fn parse_or(token: Option<&str>, fallback: Range) -> Range {
        token.and_then(Range::from_token).unwrap_or(fallback)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_round_trip_through_from_token() {
        for range in Range::ALL {
            assert_eq!(Range::from_token(range.token()), Some(range));
        }
    }

    #[test]
    fn test_unknown_token_falls_back() {
        assert_eq!(Range::parse_or(Some("90d"), Range::OneDay), Range::OneDay);
        assert_eq!(Range::parse_or(None, Range::SevenDays), Range::SevenDays);
        assert_eq!(Range::parse_or(Some(" 12h "), Range::OneHour), Range::TwelveHours);
    }

    #[test]
    fn test_serde_uses_wire_tokens() {
        assert_eq!(serde_json::to_string(&Range::ThirtyDays).unwrap(), "\"30d\"");
        let r: Range = serde_json::from_str("\"7d\"").unwrap();
        assert_eq!(r, Range::SevenDays);
    }
}
