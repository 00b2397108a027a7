//! Filter and pack endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::content::packs;
use crate::domain::RuleFamily;
use crate::filter::FilterState;
use crate::state::AppState;

use super::lock;
use super::practice::{card_response, CardResponse};

#[derive(Debug, Serialize)]
pub struct FiltersResponse {
  pub filters: FilterState,
  pub pool: usize,
}

pub async fn get_filters(
  State(state): State<AppState>,
) -> Result<Json<FiltersResponse>, StatusCode> {
  let trainer = lock(&state)?;
  Ok(Json(FiltersResponse {
    filters: trainer.filters().clone(),
    pool: trainer.pool_size(),
  }))
}

#[derive(Debug, Deserialize)]
pub struct SetFiltersRequest {
  #[serde(default)]
  pub families: Vec<RuleFamily>,
  #[serde(default)]
  pub categories: Vec<String>,
  #[serde(default)]
  pub trigger_query: String,
  #[serde(default)]
  pub nil_only: bool,
}

pub async fn set_filters(
  State(state): State<AppState>,
  Json(req): Json<SetFiltersRequest>,
) -> Result<Json<FiltersResponse>, StatusCode> {
  let mut trainer = lock(&state)?;
  trainer.set_user_filters(
    req.families,
    req.categories,
    req.trigger_query,
    req.nil_only,
  );
  Ok(Json(FiltersResponse {
    filters: trainer.filters().clone(),
    pool: trainer.pool_size(),
  }))
}

pub async fn clear_filters(
  State(state): State<AppState>,
) -> Result<Json<FiltersResponse>, StatusCode> {
  let mut trainer = lock(&state)?;
  trainer.clear_user_filters();
  Ok(Json(FiltersResponse {
    filters: trainer.filters().clone(),
    pool: trainer.pool_size(),
  }))
}

#[derive(Debug, Serialize)]
pub struct PackView {
  pub id: &'static str,
  pub title: &'static str,
  pub description: &'static str,
  pub active: bool,
}

pub async fn list_packs(
  State(state): State<AppState>,
) -> Result<Json<Vec<PackView>>, StatusCode> {
  let trainer = lock(&state)?;
  let active = trainer
    .filters()
    .pack
    .as_ref()
    .map(|p| p.pack_id.clone());
  let views = packs::all()
    .iter()
    .map(|p| PackView {
      id: p.id,
      title: p.title,
      description: p.description,
      active: active.as_deref() == Some(p.id),
    })
    .collect();
  Ok(Json(views))
}

pub async fn apply_pack(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<CardResponse>, StatusCode> {
  let mut trainer = lock(&state)?;
  if !trainer.apply_pack(&id) {
    return Err(StatusCode::NOT_FOUND);
  }
  Ok(Json(card_response(&trainer)))
}

pub async fn clear_pack(
  State(state): State<AppState>,
) -> Result<Json<CardResponse>, StatusCode> {
  let mut trainer = lock(&state)?;
  trainer.clear_pack();
  Ok(Json(card_response(&trainer)))
}
