//! Minimal JSON HTTP surface over the pipeline.

mod routes;

pub use routes::{Reply, dispatch};

use std::io::{Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tiny_http::{Header, Request, Response, Server};
use tokio::task::{JoinSet, spawn_blocking};
use tracing::{info, warn};

use crate::config::MAX_REQUEST_BODY_BYTES;
use crate::pipeline::Pipeline;
use crate::retrieval::Embedder;
use crate::translate::TranslationBackend;

const RESPONSE_HEADERS: &[(&str, &str)] = &[
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {message}")]
    Bind { addr: String, message: String },

    #[error("listener task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Accepts requests until Ctrl-C. Each request runs on its own task; the
/// pipeline is shared read-only.
pub async fn serve<B, E>(pipeline: Arc<Pipeline<B, E>>, addr: &str) -> Result<(), ServerError>
where
    B: TranslationBackend + 'static,
    E: Embedder + 'static,
{
    let server = Server::http(addr).map_err(|e| ServerError::Bind {
        addr: addr.to_string(),
        message: e.to_string(),
    })?;
    let server = Arc::new(server);
    let shutdown = Arc::new(AtomicBool::new(false));
    info!(addr, "listening");

    {
        let server = Arc::clone(&server);
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown requested");
                stop(&server, &shutdown);
            }
        });
    }

    run(server, shutdown, pipeline).await
}

fn stop(server: &Server, shutdown: &AtomicBool) {
    shutdown.store(true, Ordering::SeqCst);
    server.unblock();
}

/// Accept loop. Returns once `shutdown` is set and every in-flight request
/// has been answered.
async fn run<B, E>(
    server: Arc<Server>,
    shutdown: Arc<AtomicBool>,
    pipeline: Arc<Pipeline<B, E>>,
) -> Result<(), ServerError>
where
    B: TranslationBackend + 'static,
    E: Embedder + 'static,
{
    let mut in_flight = JoinSet::new();

    loop {
        let listener = Arc::clone(&server);
        let request = match spawn_blocking(move || listener.recv()).await? {
            Ok(request) => request,
            Err(_) if shutdown.load(Ordering::SeqCst) => break,
            Err(e) => {
                warn!(error = %e, "failed to accept request");
                continue;
            }
        };

        in_flight.spawn(handle(Arc::clone(&pipeline), request));
        while in_flight.try_join_next().is_some() {}
    }

    info!(pending = in_flight.len(), "draining in-flight requests");
    while let Some(result) = in_flight.join_next().await {
        if let Err(e) = result {
            warn!(error = %e, "request task failed");
        }
    }

    info!("server stopped");
    Ok(())
}

async fn handle<B, E>(pipeline: Arc<Pipeline<B, E>>, mut request: Request)
where
    B: TranslationBackend,
    E: Embedder,
{
    let method = request.method().clone();
    let path = request
        .url()
        .split('?')
        .next()
        .unwrap_or_default()
        .to_string();

    // Body reads hit the socket; a stalled client must not hold a runtime worker.
    let read = spawn_blocking(move || {
        let body = read_body(request.as_reader());
        (request, body)
    })
    .await;
    let (request, body) = match read {
        Ok(read) => read,
        Err(e) => {
            warn!(error = %e, path = %path, "body reader task failed");
            return;
        }
    };

    let reply = match body {
        Ok(body) => dispatch(&pipeline, &method, &path, &body).await,
        Err(reply) => reply,
    };

    info!(%method, path = %path, status = reply.status, "request handled");
    let response = into_response(reply);
    match spawn_blocking(move || request.respond(response)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "failed to write response"),
        Err(e) => warn!(error = %e, "response writer task failed"),
    }
}

/// Reads at most [`MAX_REQUEST_BODY_BYTES`] of UTF-8 body.
fn read_body(reader: impl Read) -> Result<String, Reply> {
    let mut buf = Vec::new();
    if let Err(e) = reader
        .take(MAX_REQUEST_BODY_BYTES as u64 + 1)
        .read_to_end(&mut buf)
    {
        warn!(error = %e, "unreadable request body");
        return Err(Reply::error(400, "Request body could not be read"));
    }
    if buf.len() > MAX_REQUEST_BODY_BYTES {
        return Err(Reply::error(
            413,
            format!("Request body exceeds {MAX_REQUEST_BODY_BYTES} bytes"),
        ));
    }
    String::from_utf8(buf).map_err(|_| Reply::error(400, "Request body must be UTF-8 JSON"))
}

fn into_response(reply: Reply) -> Response<Cursor<Vec<u8>>> {
    let data = reply.body.map(|b| b.to_string()).unwrap_or_default();
    let mut response = Response::from_data(data.into_bytes()).with_status_code(reply.status);
    for (name, value) in RESPONSE_HEADERS {
        if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            response.add_header(header);
        }
    }
    response
}
