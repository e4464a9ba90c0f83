//! Structural labels assigned to spans.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::Error;

/// Structural role of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanLabel {
    /// Heading at the given depth (1 = top level)
    Heading(u8),
    /// Body paragraph text
    Paragraph,
    /// Title-like span that is not part of the heading hierarchy
    Title,
    /// Anything else (headers, footers, captions, noise)
    Other,
}

impl SpanLabel {
    /// Heading depth, if this is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            SpanLabel::Heading(level) => Some(*level),
            _ => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, SpanLabel::Heading(_))
    }
}

impl FromStr for SpanLabel {
    type Err = Error;

    /// Parse a label emitted by the label decoder.
    ///
    /// Accepted forms: `H1`..`H9`, `P`, `O`, and anything starting with
    /// `Title` (e.g. `Title-ish H1`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P" => return Ok(SpanLabel::Paragraph),
            "O" => return Ok(SpanLabel::Other),
            _ if s.starts_with("Title") => return Ok(SpanLabel::Title),
            _ => {}
        }

        match s.as_bytes() {
            [b'H', digit @ b'1'..=b'9'] => Ok(SpanLabel::Heading(digit - b'0')),
            _ => Err(Error::UnexpectedLabel(s.to_string())),
        }
    }
}

impl fmt::Display for SpanLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanLabel::Heading(level) => write!(f, "H{}", level),
            SpanLabel::Paragraph => f.write_str("P"),
            SpanLabel::Title => f.write_str("Title"),
            SpanLabel::Other => f.write_str("O"),
        }
    }
}

impl Serialize for SpanLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!("H1".parse::<SpanLabel>().unwrap(), SpanLabel::Heading(1));
        assert_eq!("H6".parse::<SpanLabel>().unwrap(), SpanLabel::Heading(6));
        assert_eq!("P".parse::<SpanLabel>().unwrap(), SpanLabel::Paragraph);
        assert_eq!("O".parse::<SpanLabel>().unwrap(), SpanLabel::Other);
        assert_eq!(
            "Title-ish H1".parse::<SpanLabel>().unwrap(),
            SpanLabel::Title
        );
    }

    #[test]
    fn test_reject_unexpected_labels() {
        for bad in ["H0", "H10", "H", "h1", "Q", "", "Heading"] {
            assert!(
                matches!(bad.parse::<SpanLabel>(), Err(Error::UnexpectedLabel(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trips_headings() {
        assert_eq!(SpanLabel::Heading(3).to_string(), "H3");
        assert_eq!(SpanLabel::Paragraph.to_string(), "P");
        assert_eq!(SpanLabel::Heading(2).heading_level(), Some(2));
        assert_eq!(SpanLabel::Other.heading_level(), None);
    }
}
