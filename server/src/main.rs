use anyhow::Result;
use axum::Router;
use clap::Parser;
use server::{build_app, AppSettings};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus file or directory (.json/.jsonl)
    #[arg(long, default_value = "./corpus")]
    corpus: PathBuf,
    /// Document fields to index, comma separated
    #[arg(long, value_delimiter = ',', default_value = "title,body")]
    fields: Vec<String>,
    /// Stem terms and drop English stopwords
    #[arg(long, default_value_t = false)]
    stemming: bool,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let settings = AppSettings { corpus_path: args.corpus, fields: args.fields, stemming: args.stemming };
    let app: Router = build_app(settings)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
