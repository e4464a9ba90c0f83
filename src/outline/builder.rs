//! Folding labeled spans into an outline tree.

use crate::classify::{ClassifiedSpan, SpanLabel};

use super::{HeadingNode, Outline, OutlineEntry, ParagraphNode};

type NodeId = usize;

#[derive(Debug)]
enum ArenaChild {
    Heading(NodeId),
    Paragraph(ParagraphNode),
}

#[derive(Debug)]
struct ArenaNode {
    level: u8,
    text: String,
    page: u32,
    children: Vec<ArenaChild>,
}

/// Single-pass outline construction.
///
/// Headings live in an arena and the open path is a stack of arena ids.
/// A node's children always have larger ids than the node itself.
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    nodes: Vec<ArenaNode>,
    roots: Vec<NodeId>,
    stack: Vec<NodeId>,
    buffer: Vec<String>,
    buffer_page: u32,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next labeled span.
    pub fn push(&mut self, label: SpanLabel, text: &str, page: u32) {
        match label {
            SpanLabel::Heading(level) => self.open_heading(level, text, page),
            SpanLabel::Paragraph => {
                self.buffer.push(text.to_string());
                self.buffer_page = page;
            }
            SpanLabel::Title | SpanLabel::Other => self.flush(),
        }
    }

    /// Feed a classified span.
    pub fn push_span(&mut self, span: &ClassifiedSpan) {
        self.push(span.label, &span.span.text, span.span.page);
    }

    fn open_heading(&mut self, level: u8, text: &str, page: u32) {
        self.flush();

        while let Some(&top) = self.stack.last() {
            if self.nodes[top].level >= level {
                self.stack.pop();
            } else {
                break;
            }
        }

        let id = self.nodes.len();
        self.nodes.push(ArenaNode {
            level,
            text: text.to_string(),
            page,
            children: Vec::new(),
        });
        match self.stack.last() {
            Some(&parent) => self.nodes[parent].children.push(ArenaChild::Heading(id)),
            None => self.roots.push(id),
        }
        self.stack.push(id);
    }

    /// Attach buffered paragraph text to the innermost open heading.
    ///
    /// With no heading open the buffer is kept, so text ahead of the first
    /// heading joins that heading's first paragraph.
    fn flush(&mut self) {
        let Some(&open) = self.stack.last() else {
            return;
        };
        if self.buffer.is_empty() {
            return;
        }
        let text = self.buffer.join(" ").trim().to_string();
        self.buffer.clear();
        self.nodes[open].children.push(ArenaChild::Paragraph(ParagraphNode {
            text,
            page: self.buffer_page,
        }));
    }

    /// Flush remaining text and freeze the arena into an owned tree.
    ///
    /// Text in a document without any heading is dropped here.
    pub fn finish(mut self) -> Outline {
        self.flush();
        if !self.buffer.is_empty() {
            log::debug!(
                "Dropping {} paragraph spans with no enclosing heading",
                self.buffer.len()
            );
        }

        let mut frozen: Vec<Option<HeadingNode>> = Vec::with_capacity(self.nodes.len());
        frozen.resize_with(self.nodes.len(), || None);

        // Children have larger ids, so walking backwards sees them first.
        for (id, node) in self.nodes.into_iter().enumerate().rev() {
            let subsections = node
                .children
                .into_iter()
                .filter_map(|child| match child {
                    ArenaChild::Heading(child) => frozen[child].take().map(OutlineEntry::Heading),
                    ArenaChild::Paragraph(p) => Some(OutlineEntry::Paragraph(p)),
                })
                .collect();
            frozen[id] = Some(HeadingNode {
                level: node.level,
                text: node.text,
                page: node.page,
                subsections,
            });
        }

        Outline {
            entries: self
                .roots
                .into_iter()
                .filter_map(|id| frozen[id].take())
                .collect(),
        }
    }
}

/// Build the outline of one labeled document.
pub fn build_outline(spans: &[ClassifiedSpan]) -> Outline {
    let mut builder = OutlineBuilder::new();
    for span in spans {
        builder.push_span(span);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold(items: &[(&str, &str, u32)]) -> Outline {
        let mut builder = OutlineBuilder::new();
        for (label, text, page) in items {
            builder.push(label.parse().unwrap(), text, *page);
        }
        builder.finish()
    }

    fn para(text: &str, page: u32) -> OutlineEntry {
        OutlineEntry::Paragraph(ParagraphNode {
            text: text.into(),
            page,
        })
    }

    #[test]
    fn test_heading_paragraph_nesting() {
        let outline = fold(&[
            ("H1", "A", 1),
            ("P", "x", 1),
            ("P", "y", 2),
            ("H2", "B", 2),
            ("P", "z", 2),
            ("H1", "C", 3),
        ]);

        let mut b = HeadingNode::new(2, "B", 2);
        b.subsections.push(para("z", 2));
        let mut a = HeadingNode::new(1, "A", 1);
        a.subsections.push(para("x y", 2));
        a.subsections.push(OutlineEntry::Heading(b));
        let c = HeadingNode::new(1, "C", 3);

        assert_eq!(outline.entries, vec![a, c]);
    }

    #[test]
    fn test_equal_levels_are_siblings() {
        let outline = fold(&[("H2", "A", 1), ("H2", "B", 1), ("H3", "C", 1), ("H2", "D", 2)]);
        let top: Vec<_> = outline.entries.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(top, ["A", "B", "D"]);
        assert_eq!(outline.entries[1].child_headings().count(), 1);
    }

    #[test]
    fn test_skipped_levels_nest_under_nearest_shallower() {
        let outline = fold(&[("H1", "A", 1), ("H3", "deep", 1), ("H2", "mid", 1)]);
        let a = &outline.entries[0];
        let children: Vec<_> = a.child_headings().map(|h| (h.level, h.text.as_str())).collect();
        assert_eq!(children, [(3, "deep"), (2, "mid")]);
    }

    #[test]
    fn test_other_flushes_and_discards() {
        let outline = fold(&[
            ("H1", "A", 1),
            ("P", "one", 1),
            ("O", "footer", 1),
            ("P", "two", 2),
            ("Title-ish H1", "Big", 2),
        ]);
        let paragraphs: Vec<_> = outline.entries[0].paragraphs().map(|p| p.text.as_str()).collect();
        assert_eq!(paragraphs, ["one", "two"]);
        assert_eq!(outline.heading_count(), 1);
    }

    #[test]
    fn test_preamble_joins_first_heading() {
        let outline = fold(&[
            ("P", "cover", 1),
            ("H1", "Intro", 2),
            ("P", "x", 2),
            ("H1", "B", 3),
        ]);
        let paragraphs: Vec<_> = outline.entries[0].paragraphs().collect();
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].text, "cover x");
        assert_eq!(paragraphs[0].page, 2);
        assert!(outline.entries[1].subsections.is_empty());
    }

    #[test]
    fn test_preamble_survives_other_before_first_heading() {
        let outline = fold(&[("P", "cover", 1), ("O", "logo", 1), ("H1", "Intro", 2)]);
        let paragraphs: Vec<_> = outline.entries[0].paragraphs().map(|p| p.text.as_str()).collect();
        assert_eq!(paragraphs, ["cover"]);
    }

    #[test]
    fn test_no_headings_gives_empty_outline() {
        assert!(fold(&[("P", "text", 1), ("O", "x", 1)]).is_empty());
        assert!(OutlineBuilder::new().finish().is_empty());
    }

    #[test]
    fn test_idempotent() {
        let input = [
            ("H1", "A", 1),
            ("P", "x", 1),
            ("H3", "B", 1),
            ("H2", "C", 2),
            ("P", "y", 2),
        ];
        assert_eq!(fold(&input), fold(&input));
    }

    #[test]
    fn test_descendants_are_strictly_deeper() {
        fn check(node: &HeadingNode) {
            for child in node.child_headings() {
                assert!(child.level > node.level, "{} under {}", child.text, node.text);
                check(child);
            }
        }

        let levels = [1u8, 3, 2, 2, 4, 1, 5, 5, 3, 1, 2, 6, 4];
        let mut builder = OutlineBuilder::new();
        for (i, level) in levels.iter().enumerate() {
            builder.push(SpanLabel::Heading(*level), &format!("h{}", i), 1);
            builder.push(SpanLabel::Paragraph, "body", 1);
        }
        let outline = builder.finish();
        assert_eq!(outline.heading_count(), levels.len());
        outline.entries.iter().for_each(check);
    }
}
