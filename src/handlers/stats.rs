//! Session and lifetime statistics, plus the device reset.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::session::Tally;
use crate::state::{AppState, LifetimeStats, Trainer};

use super::lock;
use super::practice::{card_response, CardResponse};

#[derive(Debug, Serialize)]
pub struct SessionView {
  pub done: u32,
  pub correct: u32,
  pub accuracy: u32,
  pub points: u32,
  pub streak: u32,
  pub best_streak: u32,
  pub by_outcome: HashMap<String, Tally>,
  pub by_category: HashMap<String, Tally>,
  pub mastered: usize,
  pub pool: usize,
}

pub(crate) fn session_view(trainer: &Trainer) -> SessionView {
  let s = trainer.session();
  let (mastered, pool) = trainer.mastery();
  SessionView {
    done: s.done,
    correct: s.correct,
    accuracy: s.accuracy(),
    points: s.points,
    streak: s.streak,
    best_streak: s.best_streak,
    by_outcome: s.by_outcome.clone(),
    by_category: s.by_category.clone(),
    mastered,
    pool,
  }
}

pub async fn get_session(
  State(state): State<AppState>,
) -> Result<Json<SessionView>, StatusCode> {
  let trainer = lock(&state)?;
  Ok(Json(session_view(&trainer)))
}

pub async fn new_session(
  State(state): State<AppState>,
) -> Result<Json<SessionView>, StatusCode> {
  let mut trainer = lock(&state)?;
  trainer.new_session();
  Ok(Json(session_view(&trainer)))
}

pub async fn reset_streak(
  State(state): State<AppState>,
) -> Result<Json<SessionView>, StatusCode> {
  let mut trainer = lock(&state)?;
  trainer.reset_streak();
  Ok(Json(session_view(&trainer)))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
  pub lifetime: LifetimeStats,
  /// Cards per Leitner box over the current pool; index 0 unused.
  pub boxes: [usize; 6],
  pub mastered: usize,
  pub pool: usize,
}

pub async fn get_stats(
  State(state): State<AppState>,
) -> Result<Json<StatsResponse>, StatusCode> {
  let trainer = lock(&state)?;
  let (mastered, pool) = trainer.mastery();
  Ok(Json(StatsResponse {
    lifetime: trainer.lifetime_stats(),
    boxes: trainer.box_counts(),
    mastered,
    pool,
  }))
}

pub async fn reset_device(
  State(state): State<AppState>,
) -> Result<Json<CardResponse>, StatusCode> {
  let mut trainer = lock(&state)?;
  trainer.reset_device();
  Ok(Json(card_response(&trainer)))
}
