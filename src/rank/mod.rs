//! Relevance ranking of sections against a persona/task query.

mod embed;
#[cfg(feature = "embeddings")]
mod minilm;
mod ranker;
mod report;

pub use embed::{cosine_similarity, Embedder};
#[cfg(feature = "embeddings")]
pub use minilm::{MiniLmEmbedder, DEFAULT_MODEL_ID};
pub use ranker::{rank_sections, Query, RankedSection};
pub use report::{
    ExtractedSection, Metadata, RankOptions, RankingReport, SubsectionAnalysis, DEFAULT_TOP_K,
};

use crate::error::Result;
use crate::sections::Section;

/// Rank sections and assemble the report in one step.
pub fn rank_report<E>(
    sections: Vec<Section>,
    query: &Query,
    embedder: &E,
    options: &RankOptions,
) -> Result<RankingReport>
where
    E: Embedder + ?Sized,
{
    let ranked = rank_sections(sections, query, embedder)?;
    Ok(RankingReport::build(&ranked, query, options))
}
