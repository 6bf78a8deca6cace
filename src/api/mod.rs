//! HTTP panel module
//!
//! This module serves the control panel page and the slot action endpoints.

pub mod handlers;
pub mod page;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::Session;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(session: Arc<Session>) -> Router {
    Router::new()
        .route("/", get(panel_handler))
        .route("/slots/:slot/set", post(set_handler))
        .route("/slots/:slot/cancel", post(cancel_handler))
        .route("/slots/:slot/reset", post(reset_handler))
        .route("/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(session)
}
