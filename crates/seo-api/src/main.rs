//! Binary entry point: the only place in this workspace that initializes
//! tracing or parses process arguments, per this repository's convention
//! that library crates never configure global state.

mod errors;
mod routes;

use clap::Parser;
use routes::{router, AppState};
use seo_config::AuditConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "seo-api")]
#[command(about = "SEO audit engine HTTP surface")]
struct Args {
    #[arg(long, default_value = "0.0.0.0:8080", env = "SEO_AUDIT_BIND")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = AuditConfig::from_env()?;

    let state = AppState { config: Arc::new(config) };
    let app = router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = args.bind.parse()?;
    tracing::info!(%addr, "seo-api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
