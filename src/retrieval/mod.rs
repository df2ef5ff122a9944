//! Thresholded top-k semantic search over the knowledge base.

pub mod index;
pub mod knowledge;

pub use index::{FlatIpIndex, VectorIndex, l2_normalize};
pub use knowledge::{KnowledgeBase, KnowledgeItem};

use std::future::Future;

use serde::Serialize;
use tracing::{debug, info};

use crate::inference::InferenceError;
use crate::lang::Lang;

/// Sentence-embedding capability. Returns one vector per input, in order.
pub trait Embedder: Send + Sync {
    fn embed(
        &self,
        texts: &[&str],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, InferenceError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] InferenceError),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedder returned {actual} vectors for {expected} texts")]
    CountMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedItem {
    pub domain: String,
    pub lang: Lang,
    pub text: String,
    pub score: f32,
}

/// Embeds queries and searches the knowledge-base index.
///
/// Owns the knowledge base and its index together so the positional
/// item-to-vector mapping cannot drift.
pub struct Retriever<E, I = FlatIpIndex> {
    embedder: E,
    knowledge: KnowledgeBase,
    index: I,
}

impl<E: Embedder> Retriever<E> {
    /// Embeds every passage and builds a flat inner-product index in
    /// knowledge-base order.
    pub async fn build(embedder: E, knowledge: KnowledgeBase) -> Result<Self, RetrievalError> {
        let texts: Vec<&str> = knowledge.items().iter().map(|i| i.text.as_str()).collect();
        let vectors = embedder.embed(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(RetrievalError::CountMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }

        let dimension = vectors.first().map_or(0, Vec::len);
        let mut index = FlatIpIndex::new(dimension);
        for vector in vectors {
            index.add(l2_normalize(vector))?;
        }

        info!(items = index.len(), dimension, "knowledge base indexed");
        Ok(Self {
            embedder,
            knowledge,
            index,
        })
    }
}

impl<E: Embedder, I: VectorIndex> Retriever<E, I> {
    #[cfg(test)]
    pub(crate) fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Returns at most `top_k` passages scoring at least `min_score`, best
    /// first. An empty result is a normal outcome.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<RetrievedItem>, RetrievalError> {
        let vector = self
            .embedder
            .embed(&[query])
            .await?
            .into_iter()
            .next()
            .ok_or(RetrievalError::CountMismatch {
                expected: 1,
                actual: 0,
            })?;

        if vector.len() != self.index.dimension() {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: vector.len(),
            });
        }
        let vector = l2_normalize(vector);

        let results: Vec<RetrievedItem> = self
            .index
            .nearest(&vector, top_k)
            .into_iter()
            .filter(|n| n.score >= min_score)
            .filter_map(|n| {
                let item = usize::try_from(n.index)
                    .ok()
                    .and_then(|i| self.knowledge.get(i))?;
                Some(RetrievedItem {
                    domain: item.domain.clone(),
                    lang: item.lang,
                    text: item.text.clone(),
                    score: n.score,
                })
            })
            .collect();

        debug!(top_k, min_score, hits = results.len(), "retrieval complete");
        Ok(results)
    }
}
