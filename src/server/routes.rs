use serde::Deserialize;
use serde_json::{Value, json};
use tiny_http::Method;
use tracing::warn;

use crate::pipeline::{Pipeline, PipelineError};
use crate::retrieval::Embedder;
use crate::translate::TranslationBackend;

#[derive(Debug, Deserialize)]
struct ProcessRequest {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    target_lang: Option<String>,
}

#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub body: Option<Value>,
}

impl Reply {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub(super) fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "error": message.into() }))
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }
}

/// Routes one request. `path` excludes the query string.
pub async fn dispatch<B, E>(
    pipeline: &Pipeline<B, E>,
    method: &Method,
    path: &str,
    body: &str,
) -> Reply
where
    B: TranslationBackend,
    E: Embedder,
{
    match (method, path) {
        (Method::Options, "/ping" | "/api/process") => Reply::no_content(),
        (Method::Get, "/ping") => Reply::json(
            200,
            json!({ "status": "ok", "message": "sahayak is running" }),
        ),
        (Method::Post, "/api/process") => process(pipeline, body).await,
        (_, "/ping" | "/api/process") => Reply::error(405, "Method not allowed"),
        _ => Reply::error(404, "Not found"),
    }
}

async fn process<B, E>(pipeline: &Pipeline<B, E>, body: &str) -> Reply
where
    B: TranslationBackend,
    E: Embedder,
{
    let request: ProcessRequest = if body.trim().is_empty() {
        ProcessRequest {
            text: None,
            target_lang: None,
        }
    } else {
        match serde_json::from_str(body) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "malformed request body");
                return Reply::error(400, format!("Invalid JSON body: {e}"));
            }
        }
    };

    let text = request.text.unwrap_or_default();
    match pipeline
        .process(&text, request.target_lang.as_deref())
        .await
    {
        Ok(response) => match serde_json::to_value(&response) {
            Ok(value) => Reply::json(200, value),
            Err(e) => Reply::error(500, format!("failed to encode response: {e}")),
        },
        Err(e @ PipelineError::EmptyText) => Reply::error(400, e.to_string()),
    }
}
