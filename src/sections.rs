//! Flattening outlines into rankable sections.

use serde::{Deserialize, Serialize};

use crate::outline::{HeadingNode, Outline};

/// One heading of one document, with the paragraph text directly under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text
    pub text: String,

    /// Page of the heading (1-indexed)
    pub page: u32,

    /// Heading depth, rendered as `"H<n>"`
    #[serde(with = "crate::outline::heading_level")]
    pub level: u8,

    /// Space-joined text of the heading's direct paragraphs; empty if none
    pub refined_text: String,

    /// Identifier of the source document (its file name)
    pub document: String,
}

impl Section {
    fn from_heading(node: &HeadingNode, document: &str) -> Self {
        let paragraphs: Vec<&str> = node.paragraphs().map(|p| p.text.as_str()).collect();
        Self {
            text: node.text.clone(),
            page: node.page,
            level: node.level,
            refined_text: paragraphs.join(" ").trim().to_string(),
            document: document.to_string(),
        }
    }

    /// Whether there is paragraph text worth showing.
    pub fn has_refined_text(&self) -> bool {
        !self.refined_text.trim().is_empty()
    }
}

/// One section per heading, in pre-order.
pub fn flatten(outline: &Outline, document: &str) -> Vec<Section> {
    outline
        .headings()
        .map(|node| Section::from_heading(node, document))
        .collect()
}
