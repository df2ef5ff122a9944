//! End-to-end request processing: detect, normalize, translate in,
//! retrieve, synthesize, translate out.

mod synthesize;

use synthesize::synthesize;

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RetrievalSettings;
use crate::lang::{self, Lang, Normalizer};
use crate::retrieval::{Embedder, RetrievedItem, Retriever};
use crate::translate::{TranslationBackend, TranslationRouter};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("No text provided")]
    EmptyText,
}

#[derive(Debug, Serialize)]
pub struct PipelineResponse {
    pub original_text: String,
    pub detected_language_name: &'static str,
    /// Empty when normalization left the text unchanged.
    pub normalized_text: String,
    pub retrieved_items: Vec<RetrievedItem>,
    pub translated_text: String,
    pub metrics: Metrics,
}

#[derive(Debug, Serialize)]
pub struct Metrics {
    pub latency_ms: u64,
    pub detected_lang: Lang,
    pub target_lang: Lang,
    pub num_retrieved: usize,
    /// Translation-quality fields are reserved and not computed yet; always 0.0.
    pub bleu: f64,
    pub comet: f64,
    pub named_entity_preservation: f64,
    pub toxicity_leakage: f64,
}

/// Process-wide, read-only request context. Built once before serving.
pub struct Pipeline<B, E> {
    normalizer: Normalizer,
    router: TranslationRouter<B>,
    retriever: Retriever<E>,
    retrieval: RetrievalSettings,
}

impl<B: TranslationBackend, E: Embedder> Pipeline<B, E> {
    pub fn new(
        normalizer: Normalizer,
        router: TranslationRouter<B>,
        retriever: Retriever<E>,
        retrieval: RetrievalSettings,
    ) -> Self {
        Self {
            normalizer,
            router,
            retriever,
            retrieval,
        }
    }

    /// Runs one request start to finish. `target` is a language code; any
    /// unsupported value falls back to the detected language.
    pub async fn process(
        &self,
        raw_text: &str,
        target: Option<&str>,
    ) -> Result<PipelineResponse, PipelineError> {
        let started = Instant::now();

        let text = raw_text.trim();
        if text.is_empty() {
            return Err(PipelineError::EmptyText);
        }

        let detected = lang::detect(text);
        let normalized = self.normalizer.normalize(text, detected);
        let source = detected.canonical();
        debug!(?detected, %source, "language detected");
        if detected.is_romanized() {
            debug!(normalized = %normalized, "romanized input rewritten to native script");
        }

        let query = if source == Lang::En {
            normalized.clone()
        } else {
            self.router.translate(&normalized, source, Lang::En).await
        };

        let retrieved = match self
            .retriever
            .search(&query, self.retrieval.top_k, self.retrieval.min_score)
            .await
        {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "retrieval failed, continuing without passages");
                Vec::new()
            }
        };

        let answer = synthesize(&retrieved);

        let output_lang = target.and_then(Lang::from_code).unwrap_or(source);
        let translated_text = if output_lang == Lang::En {
            answer
        } else {
            self.router.translate(&answer, Lang::En, output_lang).await
        };

        let latency_ms = started.elapsed().as_millis() as u64;
        info!(
            detected = %source,
            target = %output_lang,
            retrieved = retrieved.len(),
            latency_ms,
            "request processed"
        );

        let normalized_text = if normalized == text {
            String::new()
        } else {
            normalized
        };

        Ok(PipelineResponse {
            original_text: text.to_string(),
            detected_language_name: source.name(),
            normalized_text,
            metrics: Metrics {
                latency_ms,
                detected_lang: source,
                target_lang: output_lang,
                num_retrieved: retrieved.len(),
                bleu: 0.0,
                comet: 0.0,
                named_entity_preservation: 0.0,
                toxicity_leakage: 0.0,
            },
            retrieved_items: retrieved,
            translated_text,
        })
    }
}
