//! Page layout records produced by a PDF layout source.
//!
//! A layout source yields pages, each page a top-to-bottom sequence of
//! lines, each line a left-to-right sequence of character runs carrying the
//! font that drew them. This is the only view of the PDF the rest of the
//! pipeline relies on.

use crate::error::{Error, Result};

/// A run of characters drawn with one font at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct CharRun {
    /// Decoded text of the run
    pub text: String,
    /// Base font name (e.g., "Helvetica-Bold"), if the font was resolvable
    pub font_name: Option<String>,
    /// Effective font size in points, if known
    pub font_size: Option<f32>,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Approximate advance width of the run
    pub width: f32,
}

impl CharRun {
    /// Create a run with a known font.
    pub fn new(text: impl Into<String>, font_name: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_name: Some(font_name.into()),
            font_size: Some(font_size),
            x: 0.0,
            y: 0.0,
            width: 0.0,
        }
    }

    /// Set the run position.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the run width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    fn size_or_default(&self) -> f32 {
        self.font_size.unwrap_or(12.0)
    }
}

/// One physical line of text: runs sharing a baseline, sorted by X.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutLine {
    /// The runs in this line, left to right
    pub runs: Vec<CharRun>,
}

impl LayoutLine {
    /// Create a line from runs, ordering them left to right.
    pub fn from_runs(mut runs: Vec<CharRun>) -> Self {
        runs.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        Self { runs }
    }

    /// The first run, whose font stands for the whole line.
    pub fn first_run(&self) -> Option<&CharRun> {
        self.runs.first()
    }

    /// Baseline of the line.
    pub fn y(&self) -> f32 {
        self.runs.first().map(|r| r.y).unwrap_or(0.0)
    }

    /// Combined text of all runs.
    ///
    /// A space is inserted between runs separated by a visible horizontal
    /// gap unless one side already carries whitespace.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, run) in self.runs.iter().enumerate() {
            if i > 0 {
                let prev = &self.runs[i - 1];
                let gap = run.x - (prev.x + prev.width);

                let char_count = run.text.chars().count();
                let avg_char_width = if char_count > 0 && run.width > 0.0 {
                    run.width / char_count as f32
                } else {
                    run.size_or_default() * 0.5
                };

                let prev_ends_with_space = prev.text.ends_with(char::is_whitespace);
                let curr_starts_with_space = run.text.starts_with(char::is_whitespace);

                if gap > avg_char_width * 0.2 && !prev_ends_with_space && !curr_starts_with_space
                {
                    result.push(' ');
                }
            }
            result.push_str(&run.text);
        }

        result
    }
}

/// All lines of one page, in reading order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    /// Page number (1-indexed)
    pub number: u32,
    /// Lines, top to bottom
    pub lines: Vec<LayoutLine>,
}

impl PageLayout {
    /// Create an empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            lines: Vec::new(),
        }
    }

    /// Append a line.
    pub fn with_line(mut self, line: LayoutLine) -> Self {
        self.lines.push(line);
        self
    }
}

/// A provider of page layouts, the boundary to the PDF library.
pub trait LayoutSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Layout of a single page (1-indexed).
    fn page_layout(&self, page_num: u32) -> Result<PageLayout>;

    /// Layouts of all pages in page order.
    fn page_layouts(&self) -> Result<Vec<PageLayout>> {
        (1..=self.page_count())
            .map(|page_num| self.page_layout(page_num))
            .collect()
    }
}

impl LayoutSource for [PageLayout] {
    fn page_count(&self) -> u32 {
        self.len() as u32
    }

    fn page_layout(&self, page_num: u32) -> Result<PageLayout> {
        if page_num == 0 {
            return Err(Error::PageOutOfRange(page_num, self.len() as u32));
        }
        self.get((page_num - 1) as usize)
            .cloned()
            .ok_or(Error::PageOutOfRange(page_num, self.len() as u32))
    }
}

impl LayoutSource for Vec<PageLayout> {
    fn page_count(&self) -> u32 {
        self.as_slice().page_count()
    }

    fn page_layout(&self, page_num: u32) -> Result<PageLayout> {
        self.as_slice().page_layout(page_num)
    }
}

/// Group loose runs of one page into lines.
///
/// Runs are ordered top to bottom (PDF Y grows upwards), then left to right;
/// consecutive runs whose baselines differ by at most 30% of the font size
/// share a line.
pub fn group_runs_into_lines(mut runs: Vec<CharRun>) -> Vec<LayoutLine> {
    if runs.is_empty() {
        return vec![];
    }

    runs.sort_by(|a, b| {
        let y_cmp = b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal);
        if y_cmp == std::cmp::Ordering::Equal {
            a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut lines: Vec<LayoutLine> = Vec::new();
    let mut current: Vec<CharRun> = Vec::new();
    let mut current_y: Option<f32> = None;

    for run in runs {
        let y_tolerance = run.size_or_default() * 0.3;

        match current_y {
            Some(y) if (run.y - y).abs() <= y_tolerance => current.push(run),
            _ => {
                if !current.is_empty() {
                    lines.push(LayoutLine::from_runs(std::mem::take(&mut current)));
                }
                current_y = Some(run.y);
                current.push(run);
            }
        }
    }

    if !current.is_empty() {
        lines.push(LayoutLine::from_runs(current));
    }

    lines
}
