mod config;
mod inference;
mod lang;
mod pipeline;
mod retrieval;
mod server;
mod translate;

pub const USER_AGENT: &str = concat!("sahayak/", env!("CARGO_PKG_VERSION"));

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use reqwest::Client;
use tracing::{debug, info};

use config::{CONNECT_TIMEOUT, Settings};
use inference::HfClient;
use lang::Normalizer;
use pipeline::Pipeline;
use retrieval::{KnowledgeBase, Retriever};
use translate::TranslationRouter;

/// Multilingual question answering over a small knowledge base.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "SAHAYAK_BIND", default_value = "0.0.0.0:5000")]
    bind: String,

    /// Knowledge base JSON file
    #[arg(
        long,
        env = "SAHAYAK_KNOWLEDGE_BASE",
        default_value = "data/knowledge_base.json"
    )]
    knowledge_base: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sahayak=info".parse()?),
        )
        .init();

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => debug!("no .env file"),
        Err(e) => return Err(e.into()),
    }

    let args = Args::parse();
    let settings = Settings::from_env()?;

    let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
    let client = HfClient::new(http, &settings);

    let knowledge = KnowledgeBase::load(&args.knowledge_base)?;
    info!(
        path = %args.knowledge_base.display(),
        items = knowledge.len(),
        "knowledge base loaded"
    );

    let retriever = Retriever::build(client.clone(), knowledge).await?;
    let pipeline = Arc::new(Pipeline::new(
        Normalizer::new()?,
        TranslationRouter::new(client),
        retriever,
        settings.retrieval,
    ));

    server::serve(pipeline, &args.bind)
        .await
        .inspect_err(|e| tracing::error!("server failed: {e}"))?;
    Ok(())
}
