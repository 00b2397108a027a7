//! JSON API surface. Every handler locks the trainer, calls one method,
//! and serializes the result; all practice logic lives in [`crate::state`].

pub mod filters;
pub mod practice;
pub mod stats;

use std::sync::MutexGuard;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;

use crate::state::{AppState, Trainer};

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/api/card", get(practice::get_card))
    .route("/api/check", post(practice::check))
    .route("/api/skip", post(practice::skip))
    .route("/api/reveal", post(practice::reveal))
    .route("/api/next", post(practice::next))
    .route("/api/shuffle", post(practice::shuffle))
    .route("/api/mode", post(practice::set_mode))
    .route(
      "/api/filters",
      get(filters::get_filters).post(filters::set_filters),
    )
    .route("/api/filters/clear", post(filters::clear_filters))
    .route("/api/packs", get(filters::list_packs))
    .route("/api/packs/clear", post(filters::clear_pack))
    .route("/api/packs/{id}", post(filters::apply_pack))
    .route("/api/session", get(stats::get_session))
    .route("/api/session/new", post(stats::new_session))
    .route("/api/session/reset-streak", post(stats::reset_streak))
    .route("/api/stats", get(stats::get_stats))
    .route("/api/reset", post(stats::reset_device))
    .with_state(state)
}

/// Lock the trainer, mapping a poisoned lock to a 500.
pub(crate) fn lock(
  state: &AppState,
) -> Result<MutexGuard<'_, Trainer>, StatusCode> {
  state.trainer.lock().map_err(|e| {
    tracing::error!("trainer lock poisoned: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
  })
}
