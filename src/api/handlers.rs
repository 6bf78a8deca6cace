//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, Json, Redirect,
    },
    Form,
};
use futures::{stream, Stream, StreamExt};
use tracing::{debug, warn};

use super::{
    page::render_panel,
    responses::{HealthResponse, SecondsForm, StatusResponse},
};
use crate::{error::SessionError, state::Session};

/// Handle GET / - Render the control panel
pub async fn panel_handler(State(session): State<Arc<Session>>) -> Html<String> {
    Html(render_panel(&session.snapshot()).into_string())
}

/// Handle GET /events - Stream panel snapshots as server-sent events
///
/// The current snapshot is sent first, then one event per published change.
pub async fn events_handler(
    State(session): State<Arc<Session>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let mut updates = session.subscribe();
    let current = updates.borrow_and_update().clone();
    debug!("Panel subscriber attached");

    let changes = stream::unfold(updates, |mut updates| async move {
        updates.changed().await.ok()?;
        let snapshot = updates.borrow_and_update().clone();
        Some((snapshot, updates))
    });
    let events = stream::once(async move { current })
        .chain(changes)
        .map(|snapshot| Event::default().json_data(&snapshot));

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle POST /slots/:slot/set - Arm a slot
pub async fn set_handler(
    State(session): State<Arc<Session>>,
    Path(slot): Path<usize>,
    Form(form): Form<SecondsForm>,
) -> Result<Redirect, SessionError> {
    let id = session.slot_id(slot)?;
    session
        .set(id, form.seconds)
        .inspect_err(|e| warn!("Set on slot {} refused: {}", id, e))?;
    Ok(Redirect::to("/"))
}

/// Handle POST /slots/:slot/cancel - Request cancellation of a slot
pub async fn cancel_handler(
    State(session): State<Arc<Session>>,
    Path(slot): Path<usize>,
) -> Result<Redirect, SessionError> {
    let id = session.slot_id(slot)?;
    session
        .cancel(id)
        .inspect_err(|e| warn!("Cancel on slot {} refused: {}", id, e))?;
    Ok(Redirect::to("/"))
}

/// Handle POST /slots/:slot/reset - Re-arm a slot
pub async fn reset_handler(
    State(session): State<Arc<Session>>,
    Path(slot): Path<usize>,
    Form(form): Form<SecondsForm>,
) -> Result<Redirect, SessionError> {
    let id = session.slot_id(slot)?;
    session
        .reset(id, form.seconds)
        .inspect_err(|e| warn!("Reset on slot {} refused: {}", id, e))?;
    Ok(Redirect::to("/"))
}

/// Handle GET /status - Panel state as JSON
pub async fn status_handler(State(session): State<Arc<Session>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        panel: session.snapshot(),
        uptime: session.uptime(),
    })
}

/// Handle GET /health - Health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
