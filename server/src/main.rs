use anyhow::Result;
use axum::Router;
use clap::Parser;
use retrieval_core::Bm25Params;
use server::build_app;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus path (JSON/JSONL file or directory)
    #[arg(long, default_value = "./data/corpus.json")]
    corpus: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// BM25 term frequency saturation
    #[arg(long, default_value_t = 1.5)]
    k1: f64,
    /// BM25 length normalization
    #[arg(long, default_value_t = 0.75)]
    b: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let app: Router = build_app(&args.corpus, Bm25Params { k1: args.k1, b: args.b })?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
