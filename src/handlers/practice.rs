//! Practice flow: fetch the current card, check an answer, skip, reveal,
//! advance, reshuffle, switch mode.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::Card;
use crate::srs::PracticeMode;
use crate::state::{AppState, Feedback, Trainer};

use super::lock;

/// What the practice surface needs to render a prompt. The answer itself is
/// only ever sent back through [`Feedback`].
#[derive(Debug, Serialize)]
pub struct CardView {
  pub id: String,
  pub before: String,
  pub after: String,
  pub base: String,
  pub trigger: String,
  pub rule_category: String,
  pub word_category: String,
  pub hint: Option<char>,
  pub translate: String,
}

impl CardView {
  fn from_card(card: &Card) -> Self {
    Self {
      id: card.id.clone(),
      before: card.before.clone(),
      after: card.after.clone(),
      base: card.base.clone(),
      trigger: card.trigger.clone(),
      rule_category: card.rule_category.clone(),
      word_category: card.word_category.clone(),
      hint: card.hint(),
      translate: card.translate.clone(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct CardResponse {
  /// `None` when the current filters leave nothing to practise.
  pub card: Option<CardView>,
  pub pool: usize,
  pub mode: &'static str,
  /// `"3 / 18"` in shuffle mode, absent in smart mode.
  pub position: Option<String>,
  pub revealed: bool,
}

pub(crate) fn card_response(trainer: &Trainer) -> CardResponse {
  CardResponse {
    card: trainer.current_card().map(CardView::from_card),
    pool: trainer.pool_size(),
    mode: trainer.mode().as_str(),
    position: trainer.position().map(|(at, of)| format!("{} / {}", at, of)),
    revealed: trainer.revealed(),
  }
}

pub async fn get_card(
  State(state): State<AppState>,
) -> Result<Json<CardResponse>, StatusCode> {
  let trainer = lock(&state)?;
  Ok(Json(card_response(&trainer)))
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
  pub guess: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
  pub feedback: Option<Feedback>,
  pub session: super::stats::SessionView,
}

pub async fn check(
  State(state): State<AppState>,
  Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, StatusCode> {
  let mut trainer = lock(&state)?;
  let feedback = trainer.check(&req.guess);
  Ok(Json(CheckResponse {
    feedback,
    session: super::stats::session_view(&trainer),
  }))
}

#[derive(Debug, Serialize)]
pub struct SkipResponse {
  pub feedback: Option<Feedback>,
  pub card: CardResponse,
  pub session: super::stats::SessionView,
}

pub async fn skip(
  State(state): State<AppState>,
) -> Result<Json<SkipResponse>, StatusCode> {
  let mut trainer = lock(&state)?;
  let feedback = trainer.skip();
  Ok(Json(SkipResponse {
    feedback,
    card: card_response(&trainer),
    session: super::stats::session_view(&trainer),
  }))
}

pub async fn reveal(
  State(state): State<AppState>,
) -> Result<Json<CheckResponse>, StatusCode> {
  let mut trainer = lock(&state)?;
  let feedback = trainer.reveal();
  Ok(Json(CheckResponse {
    feedback,
    session: super::stats::session_view(&trainer),
  }))
}

pub async fn next(
  State(state): State<AppState>,
) -> Result<Json<CardResponse>, StatusCode> {
  let mut trainer = lock(&state)?;
  trainer.advance();
  Ok(Json(card_response(&trainer)))
}

pub async fn shuffle(
  State(state): State<AppState>,
) -> Result<Json<CardResponse>, StatusCode> {
  let mut trainer = lock(&state)?;
  trainer.reshuffle();
  Ok(Json(card_response(&trainer)))
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
  pub mode: String,
}

pub async fn set_mode(
  State(state): State<AppState>,
  Json(req): Json<ModeRequest>,
) -> Result<Json<CardResponse>, StatusCode> {
  let Some(mode) = PracticeMode::from_str(&req.mode) else {
    return Err(StatusCode::BAD_REQUEST);
  };
  let mut trainer = lock(&state)?;
  trainer.set_mode(mode);
  Ok(Json(card_response(&trainer)))
}
