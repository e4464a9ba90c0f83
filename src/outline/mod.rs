//! Hierarchical document outlines.
//!
//! [`OutlineBuilder`] folds the labeled span sequence of one document into a
//! tree of [`HeadingNode`]s with their paragraph text attached, and
//! [`TitlePolicy`] picks the document title afterwards.

mod builder;
mod title;

pub use builder::{build_outline, OutlineBuilder};
pub use title::{TitlePolicy, DEFAULT_TITLE_PLACEHOLDER};

use serde::{Deserialize, Serialize};

/// A heading and everything nested under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingNode {
    /// Heading depth, rendered as `"H<n>"`
    #[serde(with = "heading_level")]
    pub level: u8,

    /// Heading text
    pub text: String,

    /// Page the heading appears on (1-indexed)
    pub page: u32,

    /// Paragraphs and deeper headings, in document order
    pub subsections: Vec<OutlineEntry>,
}

impl HeadingNode {
    pub fn new(level: u8, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
            subsections: Vec::new(),
        }
    }

    /// Direct child headings.
    pub fn child_headings(&self) -> impl Iterator<Item = &HeadingNode> {
        self.subsections.iter().filter_map(OutlineEntry::as_heading)
    }

    /// Direct child paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &ParagraphNode> {
        self.subsections.iter().filter_map(OutlineEntry::as_paragraph)
    }
}

/// Consecutive paragraph spans merged into one block of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphNode {
    pub text: String,
    /// Page of the last span merged into this paragraph
    pub page: u32,
}

/// A child of a heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutlineEntry {
    Heading(HeadingNode),
    Paragraph(ParagraphNode),
}

impl OutlineEntry {
    pub fn as_heading(&self) -> Option<&HeadingNode> {
        match self {
            OutlineEntry::Heading(h) => Some(h),
            OutlineEntry::Paragraph(_) => None,
        }
    }

    pub fn as_paragraph(&self) -> Option<&ParagraphNode> {
        match self {
            OutlineEntry::Paragraph(p) => Some(p),
            OutlineEntry::Heading(_) => None,
        }
    }
}

/// The heading tree of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outline {
    /// Top-level headings
    pub entries: Vec<HeadingNode>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All headings in document (pre-)order.
    pub fn headings(&self) -> Headings<'_> {
        Headings {
            stack: self.entries.iter().rev().collect(),
        }
    }

    /// Total number of headings at any depth.
    pub fn heading_count(&self) -> usize {
        self.headings().count()
    }

    /// The flat outline variant: every heading, no paragraphs.
    pub fn flat(&self) -> Vec<FlatOutlineEntry> {
        self.headings().map(FlatOutlineEntry::from).collect()
    }
}

/// Pre-order iterator over the headings of an [`Outline`].
pub struct Headings<'a> {
    stack: Vec<&'a HeadingNode>,
}

impl<'a> Iterator for Headings<'a> {
    type Item = &'a HeadingNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let children: Vec<_> = node.child_headings().collect();
        self.stack.extend(children.into_iter().rev());
        Some(node)
    }
}

/// One heading of the flat outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatOutlineEntry {
    #[serde(with = "heading_level")]
    pub level: u8,
    pub text: String,
    pub page: u32,
}

impl From<&HeadingNode> for FlatOutlineEntry {
    fn from(node: &HeadingNode) -> Self {
        Self {
            level: node.level,
            text: node.text.clone(),
            page: node.page,
        }
    }
}

/// A document's title and hierarchical outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutline {
    pub title: String,
    pub outline: Outline,
}

impl DocumentOutline {
    /// Drop paragraphs and nesting.
    pub fn to_flat(&self) -> FlatDocumentOutline {
        FlatDocumentOutline {
            title: self.title.clone(),
            outline: self.outline.flat(),
        }
    }
}

/// A document's title and flat heading list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatDocumentOutline {
    pub title: String,
    pub outline: Vec<FlatOutlineEntry>,
}

pub(crate) mod heading_level {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(level: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("H{}", level))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.strip_prefix('H')
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| D::Error::custom(format!("invalid heading level {:?}", s)))
    }
}
