//! Scoring sections against a persona/task query.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sections::Section;

use super::embed::{cosine_similarity, Embedder};

/// Who is reading and what they need to get done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub persona: String,
    pub job: String,
}

impl Query {
    pub fn new(persona: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            job: job.into(),
        }
    }

    /// The text that gets embedded.
    pub fn text(&self) -> String {
        format!("{}. Task: {}", self.persona, self.job)
    }
}

/// A section with its relevance to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSection {
    #[serde(flatten)]
    pub section: Section,
    /// Cosine similarity between section heading and query
    pub score: f32,
    /// 1-based position after sorting
    pub importance_rank: usize,
}

/// Rank sections by similarity of their heading text to the query.
///
/// All texts go to the embedder in one batch, sections first and the query
/// last. Equal scores keep their input order. Vectors of differing
/// dimension are an error rather than a zero score.
pub fn rank_sections<E>(sections: Vec<Section>, query: &Query, embedder: &E) -> Result<Vec<RankedSection>>
where
    E: Embedder + ?Sized,
{
    if sections.is_empty() {
        log::debug!("No sections to rank");
        return Ok(Vec::new());
    }

    let query_text = query.text();
    let mut texts: Vec<&str> = sections.iter().map(|s| s.text.as_str()).collect();
    texts.push(&query_text);

    let mut embeddings = embedder.embed_batch(&texts)?;
    if embeddings.len() != texts.len() {
        return Err(Error::Embedding(format!(
            "embedder returned {} vectors for {} texts",
            embeddings.len(),
            texts.len()
        )));
    }

    let query_embedding = embeddings.pop().unwrap_or_default();
    if let Some(i) = embeddings
        .iter()
        .position(|e| query_embedding.is_empty() || e.len() != query_embedding.len())
    {
        return Err(Error::Embedding(format!(
            "section {} embedded with dimension {}, query with {}",
            i,
            embeddings[i].len(),
            query_embedding.len()
        )));
    }

    let mut ranked: Vec<RankedSection> = sections
        .into_iter()
        .zip(&embeddings)
        .map(|(section, embedding)| RankedSection {
            score: cosine_similarity(embedding, &query_embedding),
            section,
            importance_rank: 0,
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    for (i, r) in ranked.iter_mut().enumerate() {
        r.importance_rank = i + 1;
    }

    log::debug!(
        "Ranked {} sections, top score {:.4}",
        ranked.len(),
        ranked[0].score
    );
    Ok(ranked)
}
