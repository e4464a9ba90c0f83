//! The ranking report written for a document collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ranker::{Query, RankedSection};

/// Default number of sections kept in the report.
pub const DEFAULT_TOP_K: usize = 10;

/// Options for report assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankOptions {
    /// Number of top-ranked sections to report
    pub top_k: usize,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl RankOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many sections to report.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// Run information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Documents that contributed ranked sections, first-ranked first
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    /// UTC time of report assembly, ISO-8601 with a trailing `Z`
    pub processing_timestamp: String,
}

/// One reported section heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub importance_rank: usize,
    pub page_number: u32,
}

/// Paragraph text of one reported section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub refined_text: String,
    pub page_number: u32,
}

/// The full ranking output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingReport {
    pub metadata: Metadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

impl RankingReport {
    /// Assemble a report stamped with the current time.
    pub fn build(ranked: &[RankedSection], query: &Query, options: &RankOptions) -> Self {
        Self::build_at(ranked, query, options, Utc::now())
    }

    /// Assemble a report with an explicit timestamp.
    pub fn build_at(
        ranked: &[RankedSection],
        query: &Query,
        options: &RankOptions,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut input_documents: Vec<String> = Vec::new();
        for r in ranked {
            if !input_documents.contains(&r.section.document) {
                input_documents.push(r.section.document.clone());
            }
        }

        let top = &ranked[..ranked.len().min(options.top_k)];

        Self {
            metadata: Metadata {
                input_documents,
                persona: query.persona.clone(),
                job_to_be_done: query.job.clone(),
                processing_timestamp: format_timestamp(timestamp),
            },
            extracted_sections: top
                .iter()
                .map(|r| ExtractedSection {
                    document: r.section.document.clone(),
                    section_title: r.section.text.clone(),
                    importance_rank: r.importance_rank,
                    page_number: r.section.page,
                })
                .collect(),
            subsection_analysis: top
                .iter()
                .filter(|r| r.section.has_refined_text())
                .map(|r| SubsectionAnalysis {
                    document: r.section.document.clone(),
                    refined_text: r.section.refined_text.clone(),
                    page_number: r.section.page,
                })
                .collect(),
        }
    }
}

/// ISO-8601 in UTC; microseconds only when non-zero.
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    if timestamp.timestamp_subsec_micros() == 0 {
        timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    } else {
        timestamp.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::Section;
    use chrono::TimeZone;

    fn ranked(document: &str, text: &str, refined: &str, rank: usize) -> RankedSection {
        RankedSection {
            section: Section {
                text: text.into(),
                page: rank as u32,
                level: 1,
                refined_text: refined.into(),
                document: document.into(),
            },
            score: 1.0 / rank as f32,
            importance_rank: rank,
        }
    }

    fn sample() -> Vec<RankedSection> {
        vec![
            ranked("b.pdf", "Testing", "Unit tests first.", 1),
            ranked("a.pdf", "History", "   ", 2),
            ranked("b.pdf", "Trends", "", 3),
            ranked("a.pdf", "Outlook", "More to come.", 4),
        ]
    }

    #[test]
    fn test_report_sections() {
        let query = Query::new("QA lead", "Plan testing");
        let report = RankingReport::build(&sample(), &query, &RankOptions::default());

        assert_eq!(report.extracted_sections.len(), 4);
        assert_eq!(report.extracted_sections[0].section_title, "Testing");
        assert_eq!(report.extracted_sections[3].importance_rank, 4);

        let analysed: Vec<_> = report
            .subsection_analysis
            .iter()
            .map(|s| s.refined_text.as_str())
            .collect();
        assert_eq!(analysed, ["Unit tests first.", "More to come."]);
        assert!(report
            .subsection_analysis
            .iter()
            .all(|s| !s.refined_text.trim().is_empty()));

        assert_eq!(report.metadata.input_documents, ["b.pdf", "a.pdf"]);
        assert_eq!(report.metadata.job_to_be_done, "Plan testing");
    }

    #[test]
    fn test_top_k_limits_both_lists() {
        let query = Query::new("p", "j");
        let report = RankingReport::build(&sample(), &query, &RankOptions::new().with_top_k(2));
        assert_eq!(report.extracted_sections.len(), 2);
        assert_eq!(report.subsection_analysis.len(), 1);
        // Documents come from the whole ranking, not just the top K.
        assert_eq!(report.metadata.input_documents.len(), 2);
    }

    #[test]
    fn test_empty_ranking() {
        let report = RankingReport::build(&[], &Query::new("p", "j"), &RankOptions::default());
        assert!(report.extracted_sections.is_empty());
        assert!(report.subsection_analysis.is_empty());
        assert!(report.metadata.input_documents.is_empty());
    }

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2025, 7, 10, 8, 30, 5).unwrap();
        let report = RankingReport::build_at(&[], &Query::new("p", "j"), &RankOptions::default(), at);
        assert_eq!(report.metadata.processing_timestamp, "2025-07-10T08:30:05Z");

        let at = at + chrono::Duration::microseconds(1_250);
        assert_eq!(format_timestamp(at), "2025-07-10T08:30:05.001250Z");

        let now = RankingReport::build(&[], &Query::new("p", "j"), &RankOptions::default());
        assert!(now.metadata.processing_timestamp.ends_with('Z'));
    }

    #[test]
    fn test_json_keys() {
        let report = RankingReport::build(&sample(), &Query::new("p", "j"), &RankOptions::default());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["metadata"]["processing_timestamp"].is_string());
        assert_eq!(json["extracted_sections"][0]["page_number"], 1);
        assert_eq!(json["subsection_analysis"][0]["document"], "b.pdf");
    }
}
