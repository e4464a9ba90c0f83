//! Document title selection.

use crate::classify::{ClassifiedSpan, SpanLabel};

use super::Outline;

/// Title used when no heuristic finds one.
pub const DEFAULT_TITLE_PLACEHOLDER: &str = "Untitled Document";

/// Heuristics for picking a document title.
///
/// The default takes the first bold top-level heading, then the first
/// outline entry, then a fixed placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitlePolicy {
    /// Only consider bold top-level headings as title candidates
    pub require_bold: bool,

    /// Fall back to the first outline entry's text
    pub fallback_to_first_heading: bool,

    /// Title used when nothing else applies
    pub placeholder: String,
}

impl Default for TitlePolicy {
    fn default() -> Self {
        Self {
            require_bold: true,
            fallback_to_first_heading: true,
            placeholder: DEFAULT_TITLE_PLACEHOLDER.to_string(),
        }
    }
}

impl TitlePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept non-bold top-level headings as titles.
    pub fn allow_regular_weight(mut self) -> Self {
        self.require_bold = false;
        self
    }

    /// Skip the first-heading fallback.
    pub fn without_heading_fallback(mut self) -> Self {
        self.fallback_to_first_heading = false;
        self
    }

    /// Set the placeholder title.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Pick the title of a labeled document.
    pub fn select(&self, spans: &[ClassifiedSpan], outline: &Outline) -> String {
        let candidate = spans
            .iter()
            .find(|s| s.label == SpanLabel::Heading(1) && (s.span.bold || !self.require_bold))
            .map(|s| s.span.text.clone());

        candidate
            .or_else(|| {
                self.fallback_to_first_heading
                    .then(|| outline.entries.first().map(|h| h.text.clone()))
                    .flatten()
            })
            .unwrap_or_else(|| self.placeholder.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::TextSpan;
    use crate::outline::build_outline;

    fn labeled(label: &str, text: &str, font: &str) -> ClassifiedSpan {
        ClassifiedSpan::new(
            TextSpan::from_raw(text, Some(12.0), Some(font.into()), 1).unwrap(),
            label.parse().unwrap(),
        )
    }

    #[test]
    fn test_bold_h1_wins() {
        let spans = vec![
            labeled("H2", "Preface", "Arial-Bold"),
            labeled("H1", "Plain", "Arial"),
            labeled("H1", "Real Title", "Arial-Bold"),
        ];
        let outline = build_outline(&spans);
        assert_eq!(TitlePolicy::default().select(&spans, &outline), "Real Title");
        assert_eq!(
            TitlePolicy::default()
                .allow_regular_weight()
                .select(&spans, &outline),
            "Plain"
        );
    }

    #[test]
    fn test_falls_back_to_first_outline_entry() {
        let spans = vec![
            labeled("H2", "Preface", "Arial"),
            labeled("H1", "Chapter", "Arial"),
        ];
        let outline = build_outline(&spans);
        assert_eq!(TitlePolicy::default().select(&spans, &outline), "Preface");
    }

    #[test]
    fn test_placeholder() {
        let spans = vec![labeled("P", "just text", "Arial")];
        let outline = build_outline(&spans);
        assert_eq!(
            TitlePolicy::default().select(&spans, &outline),
            DEFAULT_TITLE_PLACEHOLDER
        );
        assert_eq!(
            TitlePolicy::default()
                .with_placeholder("n/a")
                .select(&[], &Outline::new()),
            "n/a"
        );

        let headed = vec![labeled("H2", "Preface", "Arial")];
        assert_eq!(
            TitlePolicy::default()
                .without_heading_fallback()
                .select(&headed, &build_outline(&headed)),
            DEFAULT_TITLE_PLACEHOLDER
        );
    }
}
