use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

/// Minimum clue-word hits before Latin text counts as romanized Hindi/Telugu.
pub const DETECT_MIN_CLUES: usize = 2;

/// Fraction of tokens that must be clue words; combined with
/// [`DETECT_MIN_CLUES`] as `max(min, ceil(ratio * tokens))`. Tuned, not derived.
pub const DETECT_CLUE_RATIO: f64 = 0.25;

/// Default number of nearest knowledge-base passages to consider.
pub const DEFAULT_TOP_K: usize = 3;

/// Minimum cosine similarity for a passage to be used in an answer.
///
/// Tuned for paraphrase-multilingual-MiniLM-L12-v2, where semantically
/// related passages typically score above 0.5.
pub const DEFAULT_MIN_SCORE: f32 = 0.45;

/// Characters of each passage kept in the synthesized answer.
pub const ANSWER_SNIPPET_CHARS: usize = 220;

/// Generation cap for the multilingual pivot model.
pub const PIVOT_MAX_NEW_TOKENS: u32 = 256;

/// Largest accepted `POST /api/process` body.
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Per-call inference timeout; model cold starts can be slow.
pub const INFERENCE_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_API_BASE: &str = "https://router.huggingface.co/hf-inference";
const DEFAULT_EN_HI_MODEL: &str = "Helsinki-NLP/opus-mt-en-hi";
const DEFAULT_HI_EN_MODEL: &str = "Helsinki-NLP/opus-mt-hi-en";
const DEFAULT_PIVOT_MODEL: &str = "facebook/m2m100_418M";
const DEFAULT_EMBED_MODEL: &str = "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("HF_TOKEN not set. Add it to the environment or a .env file")]
    TokenNotSet,

    #[error("invalid HF_API_BASE: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("invalid value for {name}: '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Model identifiers for each remote capability.
#[derive(Debug, Clone)]
pub struct Models {
    pub en_hi: String,
    pub hi_en: String,
    pub pivot: String,
    pub embed: String,
}

#[derive(Debug, Clone, Copy)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub min_score: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

/// Runtime configuration resolved from environment variables.
///
/// - `HF_TOKEN` (required)
/// - `HF_API_BASE`
/// - `SAHAYAK_EN_HI_MODEL`, `SAHAYAK_HI_EN_MODEL`, `SAHAYAK_PIVOT_MODEL`, `SAHAYAK_EMBED_MODEL`
/// - `SAHAYAK_TOP_K`, `SAHAYAK_MIN_SCORE`
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: ApiToken,
    pub api_base: Url,
    pub models: Models,
    pub retrieval: RetrievalSettings,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let token = var("HF_TOKEN").ok_or(ConfigError::TokenNotSet)?;
        let api_base = Url::parse(&var("HF_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into()))?;

        let models = Models {
            en_hi: var("SAHAYAK_EN_HI_MODEL").unwrap_or_else(|| DEFAULT_EN_HI_MODEL.into()),
            hi_en: var("SAHAYAK_HI_EN_MODEL").unwrap_or_else(|| DEFAULT_HI_EN_MODEL.into()),
            pivot: var("SAHAYAK_PIVOT_MODEL").unwrap_or_else(|| DEFAULT_PIVOT_MODEL.into()),
            embed: var("SAHAYAK_EMBED_MODEL").unwrap_or_else(|| DEFAULT_EMBED_MODEL.into()),
        };

        let mut retrieval = RetrievalSettings::default();
        if let Some(v) = var("SAHAYAK_TOP_K") {
            retrieval.top_k = v
                .parse::<usize>()
                .ok()
                .filter(|k| *k > 0)
                .ok_or(ConfigError::InvalidNumber {
                    name: "SAHAYAK_TOP_K",
                    value: v,
                })?;
        }
        if let Some(v) = var("SAHAYAK_MIN_SCORE") {
            retrieval.min_score = v
                .parse::<f32>()
                .ok()
                .filter(|s| s.is_finite())
                .ok_or(ConfigError::InvalidNumber {
                    name: "SAHAYAK_MIN_SCORE",
                    value: v,
                })?;
        }

        Ok(Self {
            token: ApiToken(token),
            api_base,
            models,
            retrieval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn missing_token_is_fatal() {
        assert!(matches!(settings(&[]), Err(ConfigError::TokenNotSet)));
    }

    #[test]
    fn blank_token_is_fatal() {
        assert!(matches!(
            settings(&[("HF_TOKEN", "   ")]),
            Err(ConfigError::TokenNotSet)
        ));
    }

    #[test]
    fn defaults_applied() {
        let s = settings(&[("HF_TOKEN", "hf_abc")]).unwrap();
        assert_eq!(s.token.expose(), "hf_abc");
        assert_eq!(s.api_base.as_str(), "https://router.huggingface.co/hf-inference");
        assert_eq!(s.models.en_hi, "Helsinki-NLP/opus-mt-en-hi");
        assert_eq!(s.models.hi_en, "Helsinki-NLP/opus-mt-hi-en");
        assert_eq!(s.models.pivot, "facebook/m2m100_418M");
        assert_eq!(s.retrieval.top_k, 3);
        assert!((s.retrieval.min_score - 0.45).abs() < f32::EPSILON);
    }

    #[test]
    fn overrides_applied() {
        let s = settings(&[
            ("HF_TOKEN", "hf_abc"),
            ("HF_API_BASE", "http://localhost:8080"),
            ("SAHAYAK_PIVOT_MODEL", "facebook/m2m100_1.2B"),
            ("SAHAYAK_TOP_K", "5"),
            ("SAHAYAK_MIN_SCORE", "0.6"),
        ])
        .unwrap();
        assert_eq!(s.api_base.as_str(), "http://localhost:8080/");
        assert_eq!(s.models.pivot, "facebook/m2m100_1.2B");
        assert_eq!(s.retrieval.top_k, 5);
        assert!((s.retrieval.min_score - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn invalid_numbers_rejected() {
        let err = settings(&[("HF_TOKEN", "t"), ("SAHAYAK_TOP_K", "zero")]).unwrap_err();
        assert!(err.to_string().contains("SAHAYAK_TOP_K"), "got: {err}");
        let err = settings(&[("HF_TOKEN", "t"), ("SAHAYAK_TOP_K", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
        let err = settings(&[("HF_TOKEN", "t"), ("SAHAYAK_MIN_SCORE", "NaN")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn invalid_base_url_rejected() {
        let err = settings(&[("HF_TOKEN", "t"), ("HF_API_BASE", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));
    }

    #[test]
    fn token_debug_is_redacted() {
        let s = settings(&[("HF_TOKEN", "hf_secret")]).unwrap();
        let dbg = format!("{s:?}");
        assert!(!dbg.contains("hf_secret"));
        assert!(dbg.contains("[REDACTED]"));
    }
}
