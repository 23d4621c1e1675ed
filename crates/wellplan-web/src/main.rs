//! Wellness plan wizard server.
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run -p wellplan-web
//! GEMINI_API_KEY=... cargo run -p wellplan-web -- --port 8080
//! cargo run -p wellplan-web -- --secrets ~/.wellplan/secrets.toml --static-dir web/out
//! ```
//!
//! Then open the printed URL in a browser (or use curl) to walk through the
//! wizard:
//!
//! ```bash
//! curl -X POST localhost:3001/api/sessions
//! curl -X POST localhost:3001/api/sessions/$ID/actions \
//!   -H 'content-type: application/json' \
//!   -d '{"type":"submit_profile","name":"Sam","age":30}'
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wellplan_rs::GeminiClient;
use wellplan_rs::config::AppConfig;
use wellplan_web::{WebConfig, spawn_web};

/// Browser wizard for one-day wellness plans.
#[derive(Parser)]
#[command(about = "Wellness plan wizard with a browser-based UI")]
struct Args {
    /// Port for the web server.
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Listen on all interfaces instead of loopback only.
    #[arg(long)]
    public: bool,

    /// Directory of front-end assets to serve.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Path to a TOML secrets file holding GEMINI_API_KEY.
    #[arg(long)]
    secrets: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 1. Configuration; a missing API key is fatal.
    let config = AppConfig::load(args.secrets.as_deref()).map_err(|e| e.to_string())?;

    // 2. Gemini client.
    let client = GeminiClient::with_base_url(&config.api_key, &config.api_base)
        .map_err(|e| e.to_string())?;

    // 3. Serve.
    let host = if args.public { [0, 0, 0, 0] } else { [127, 0, 0, 1] };
    let web_config = WebConfig {
        bind_addr: (host, args.port).into(),
        static_dir: args.static_dir,
        provider: config.provider_config(),
        ..Default::default()
    };
    let addr = spawn_web(Arc::new(client), web_config)
        .await
        .map_err(|e| format!("failed to start web server: {e}"))?;
    println!("Web UI: http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for shutdown signal: {e}"))?;
    tracing::info!("Shutting down");
    Ok(())
}
