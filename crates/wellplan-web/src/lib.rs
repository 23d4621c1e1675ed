//! Browser wizard server for `wellplan-rs`.
//!
//! `wellplan-web` exposes the three-step wizard (profile → symptoms → plan)
//! as a small REST API. Each browser session gets its own
//! [`SessionState`](wellplan_rs::wizard::SessionState); the server only
//! applies actions and returns rendered views, so any front end can drive it.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use wellplan_rs::GeminiClient;
//! use wellplan_web::{WebConfig, spawn_web};
//!
//! let client = GeminiClient::new(api_key)?;
//! let addr = spawn_web(Arc::new(client), WebConfig::default()).await?;
//! println!("Web UI: http://{addr}");
//! ```
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/sessions` | Start a session; `201 {"session_id", "view"}` |
//! | `GET` | `/api/sessions/{id}` | Current [`WizardView`](wellplan_rs::wizard::WizardView) |
//! | `POST` | `/api/sessions/{id}/actions` | Apply a tagged [`WizardAction`](wellplan_rs::wizard::WizardAction) |
//! | `DELETE` | `/api/sessions/{id}` | End a session |
//! | `GET` | `/api/symptoms` | Common symptom list |
//!
//! A `generate` action runs the plan pipeline before responding; the
//! returned view already contains the reminders, plus any fallback warning.

mod api;
mod server;
pub mod sessions;

pub use api::{AppState, CreatedSession};
pub use server::{build_router, start_server};
pub use sessions::SessionStore;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use wellplan_rs::api::GenerationService;
use wellplan_rs::plan::{PlanProvider, PlanProviderConfig};

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:3001`.
    pub bind_addr: SocketAddr,
    /// Directory of front-end assets served for non-API paths.
    ///
    /// If `None`, only the API is served.
    pub static_dir: Option<PathBuf>,
    /// Backend priority, timeouts, and model-list policy for plan generation.
    pub provider: PlanProviderConfig,
    /// Sessions idle for longer than this are dropped. Default: 30 minutes.
    pub session_idle_ttl: Duration,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            static_dir: None,
            provider: PlanProviderConfig::default(),
            session_idle_ttl: sessions::DEFAULT_IDLE_TTL,
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
pub async fn spawn_web(
    service: Arc<dyn GenerationService>,
    config: WebConfig,
) -> std::io::Result<SocketAddr> {
    let app_state = AppState {
        sessions: Arc::new(SessionStore::with_idle_ttl(config.session_idle_ttl)),
        provider: Arc::new(PlanProvider::new(service, config.provider)),
    };
    let router = build_router(app_state, config.static_dir);
    start_server(router, config.bind_addr).await
}
