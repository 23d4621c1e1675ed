//! REST API endpoint handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use tracing::{debug, info};
use wellplan_rs::plan::{
    CompositeEventHandler, LoggingHandler, PlanPipeline, PlanProvider, WarningCollector,
};
use wellplan_rs::wizard::{COMMON_SYMPTOMS, WizardAction, WizardView, render, transition};

use crate::sessions::SessionStore;

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub provider: Arc<PlanProvider>,
}

/// Response body for POST /api/sessions.
#[derive(Serialize)]
pub struct CreatedSession {
    pub session_id: String,
    pub view: WizardView,
}

/// POST /api/sessions: Start a new wizard session.
pub async fn create_session(State(app): State<AppState>) -> (StatusCode, Json<CreatedSession>) {
    let session_id = app.sessions.create();
    debug!("Created session {session_id}");
    let view = app
        .sessions
        .with(&session_id, |s| render(s))
        .unwrap_or_else(|| render(&Default::default()));
    (StatusCode::CREATED, Json(CreatedSession { session_id, view }))
}

/// GET /api/sessions/{id}: Current view. 404 if unknown.
pub async fn get_session(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WizardView>, StatusCode> {
    app.sessions
        .with(&id, |s| Json(render(s)))
        .ok_or(StatusCode::NOT_FOUND)
}

/// POST /api/sessions/{id}/actions: Apply a wizard action.
///
/// After a successful `generate`, runs the plan pipeline outside the store
/// lock. The result is attached only if the session is still on the same
/// generation; a restart or a newer generate in the meantime discards it.
/// Validation problems are returned as warnings in the view, not as error
/// statuses.
pub async fn post_action(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(action): Json<WizardAction>,
) -> Result<Json<WizardView>, StatusCode> {
    let is_generate = matches!(action, WizardAction::Generate);
    let inputs = app
        .sessions
        .with(&id, |state| {
            let t = transition(std::mem::take(state), action);
            *state = t.state;
            (is_generate && state.needs_plan()).then(|| {
                (
                    state.generation,
                    state.symptoms.as_slice().to_vec(),
                    state.profile.clone(),
                )
            })
        })
        .ok_or(StatusCode::NOT_FOUND)?;

    if let Some((generation, symptoms, profile)) = inputs {
        info!("Generating plan for session {id} ({} symptom(s))", symptoms.len());
        let warnings = WarningCollector::new();
        let handler = CompositeEventHandler::new()
            .with(LoggingHandler)
            .with(&warnings);
        let result = PlanPipeline::new(&app.provider)
            .with_event_handler(&handler)
            .run(&symptoms, &profile)
            .await;

        app.sessions
            .with(&id, |state| {
                if state.attach_plan_for(generation, result) {
                    state
                        .warnings
                        .extend(warnings.take().into_iter().map(|w| w.to_string()));
                } else {
                    debug!("Discarded stale plan for session {id} (generation {generation})");
                }
            })
            .ok_or(StatusCode::NOT_FOUND)?;
    }

    app.sessions
        .with(&id, |s| Json(render(s)))
        .ok_or(StatusCode::NOT_FOUND)
}

/// DELETE /api/sessions/{id}: 204 on success, 404 if unknown.
pub async fn delete_session(State(app): State<AppState>, Path(id): Path<String>) -> StatusCode {
    if app.sessions.remove(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// GET /api/symptoms: The common symptom list, in display order.
pub async fn get_symptoms() -> Json<&'static [&'static str]> {
    Json(COMMON_SYMPTOMS.as_slice())
}
