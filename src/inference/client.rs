use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::InferenceError;
use super::types::{
    ApiError, FeatureExtractionRequest, GenerateParameters, TranslationOutput,
    TranslationParameters, TranslationRequest,
};
use crate::config::{ApiToken, INFERENCE_TIMEOUT, Models, PIVOT_MAX_NEW_TOKENS, Settings};
use crate::lang::Lang;
use crate::retrieval::Embedder;
use crate::translate::{Direction, TranslationBackend};

/// Client for hosted translation and embedding models.
///
/// One model per bilingual direction, one multilingual pivot model, and one
/// sentence-embedding model, all addressed by Hub model ID.
#[derive(Clone)]
pub struct HfClient {
    http: Client,
    token: ApiToken,
    base_url: String,
    models: Models,
}

impl HfClient {
    pub fn new(http: Client, settings: &Settings) -> Self {
        Self {
            http,
            token: settings.token.clone(),
            base_url: settings.api_base.as_str().trim_end_matches('/').to_string(),
            models: settings.models.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        let settings = Settings::from_lookup(|key| match key {
            "HF_TOKEN" => Some("test-token".into()),
            "HF_API_BASE" => Some(base_url.into()),
            "SAHAYAK_EN_HI_MODEL" => Some("test/en-hi".into()),
            "SAHAYAK_HI_EN_MODEL" => Some("test/hi-en".into()),
            "SAHAYAK_PIVOT_MODEL" => Some("test/m2m".into()),
            "SAHAYAK_EMBED_MODEL" => Some("test/minilm".into()),
            _ => None,
        })
        .expect("test settings");
        Self::new(http, &settings)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, InferenceError> {
        let url = format!("{}/models/{path}", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.token.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(body)
            .timeout(INFERENCE_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => Ok(response.json().await?),
            429 => {
                warn!(path, "inference API rate limited");
                Err(InferenceError::RateLimited)
            }
            503 => {
                warn!(path, "model not loaded yet");
                Err(InferenceError::ModelLoading)
            }
            code => {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&text)
                    .ok()
                    .and_then(|e| e.error)
                    .unwrap_or_else(|| {
                        let end = text.floor_char_boundary(200);
                        format!("HTTP {status}: {}", &text[..end])
                    });
                warn!(path, code, "inference API error");
                Err(InferenceError::Api { code, message })
            }
        }
    }

    async fn translate(
        &self,
        model: &str,
        request: TranslationRequest<'_>,
    ) -> Result<String, InferenceError> {
        let outputs: Vec<TranslationOutput> = self.post_json(model, &request).await?;
        let text = outputs
            .into_iter()
            .next()
            .map(|o| o.translation_text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(InferenceError::EmptyOutput)?;
        debug!(model, chars = text.chars().count(), "translation complete");
        Ok(text)
    }
}

impl TranslationBackend for HfClient {
    async fn translate_bilingual(
        &self,
        text: &str,
        direction: Direction,
    ) -> Result<String, InferenceError> {
        let model = match direction {
            Direction::EnToHi => &self.models.en_hi,
            Direction::HiToEn => &self.models.hi_en,
        };
        let request = TranslationRequest {
            inputs: text,
            parameters: None,
        };
        self.translate(model, request).await
    }

    async fn translate_pivot(
        &self,
        text: &str,
        source: Lang,
        target: Lang,
    ) -> Result<String, InferenceError> {
        let request = TranslationRequest {
            inputs: text,
            parameters: Some(TranslationParameters {
                src_lang: source.code(),
                tgt_lang: target.code(),
                generate_parameters: GenerateParameters {
                    max_new_tokens: PIVOT_MAX_NEW_TOKENS,
                },
            }),
        };
        self.translate(&self.models.pivot, request).await
    }
}

impl Embedder for HfClient {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, InferenceError> {
        let path = format!("{}/pipeline/feature-extraction", self.models.embed);
        let vectors: Vec<Vec<f32>> = self
            .post_json(&path, &FeatureExtractionRequest { inputs: texts })
            .await?;
        if vectors.is_empty() {
            return Err(InferenceError::EmptyOutput);
        }
        debug!(count = vectors.len(), "embedding complete");
        Ok(vectors)
    }
}

#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{body_json, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HfClient {
        HfClient::with_base_url(Client::new(), &server.uri())
    }

    #[tokio::test]
    async fn bilingual_uses_direction_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test/hi-en"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(serde_json::json!({"inputs": "मेरा घर"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"translation_text": "my house"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let out = client(&server)
            .translate_bilingual("मेरा घर", Direction::HiToEn)
            .await
            .unwrap();
        assert_eq!(out, "my house");
    }

    #[tokio::test]
    async fn pivot_sends_language_markers_and_token_cap() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test/m2m"))
            .and(body_partial_json(serde_json::json!({
                "parameters": {
                    "src_lang": "en",
                    "tgt_lang": "te",
                    "generate_parameters": {"max_new_tokens": 256}
                }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"translation_text": "నమస్కారం"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let out = client(&server)
            .translate_pivot("hello", Lang::En, Lang::Te)
            .await
            .unwrap();
        assert_eq!(out, "నమస్కారం");
    }

    #[tokio::test]
    async fn empty_translation_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let result = client(&server)
            .translate_bilingual("hello", Direction::EnToHi)
            .await;
        assert!(matches!(result, Err(InferenceError::EmptyOutput)));
    }

    #[tokio::test]
    async fn status_429_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let result = client(&server)
            .translate_bilingual("hello", Direction::EnToHi)
            .await;
        assert!(matches!(result, Err(InferenceError::RateLimited)));
    }

    #[tokio::test]
    async fn status_503_is_model_loading() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": "Model facebook/m2m100_418M is currently loading",
                "estimated_time": 20.0
            })))
            .mount(&server)
            .await;

        let result = client(&server).embed(&["hello"]).await;
        assert!(matches!(result, Err(InferenceError::ModelLoading)));
    }

    #[tokio::test]
    async fn error_body_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "unknown src_lang"})),
            )
            .mount(&server)
            .await;

        let result = client(&server)
            .translate_pivot("hello", Lang::Hi, Lang::Te)
            .await;
        match result {
            Err(InferenceError::Api { code: 400, message }) => {
                assert_eq!(message, "unknown src_lang");
            }
            other => panic!("expected Api(400), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unstructured_error_body_is_snippeted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let result = client(&server).embed(&["hello"]).await;
        match result {
            Err(InferenceError::Api { code: 500, message }) => {
                assert!(message.contains("upstream exploded"), "got: {message}");
            }
            other => panic!("expected Api(500), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn embed_posts_batch_to_feature_extraction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test/minilm/pipeline/feature-extraction"))
            .and(body_json(serde_json::json!({"inputs": ["a", "b"]})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let vectors = client(&server).embed(&["a", "b"]).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1], vec![0.4, 0.5, 0.6]);
    }
}
