//! Remote model inference over the Hugging Face Inference API.

pub mod client;
pub mod types;

pub use client::HfClient;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("inference API rate limit exceeded")]
    RateLimited,

    #[error("model is still loading on the inference API")]
    ModelLoading,

    #[error("inference API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("model returned no output")]
    EmptyOutput,
}
