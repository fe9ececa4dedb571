//! JSON API consumed by scripts and the browser client.

use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::WithRejection;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{Deck, NewCard, ReviewEvent};
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::{upload, validation};

pub const GENERATION_HEADER: &str = "x-generation";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
  #[serde(default)]
  pub text: Option<String>,
  /// Number or numeric string
  #[serde(default)]
  pub max_items: Option<Value>,
}

/// POST /api/generate
pub async fn generate(
  State(state): State<AppState>,
  WithRejection(Json(req), _): WithRejection<Json<GenerateRequest>, AppError>,
) -> Result<Response> {
  let max_items = validation::normalize_max_items(validation::max_items_from_json(req.max_items.as_ref()));
  let text = req.text.unwrap_or_default();
  let generation = state.generator.generate(&text, max_items).await?;

  let mut response = Json(generation.deck).into_response();
  if generation.source.is_fallback() {
    response.headers_mut().insert(
      HeaderName::from_static(GENERATION_HEADER),
      HeaderValue::from_static("local-fallback"),
    );
  }
  Ok(response)
}

/// POST /api/upload - extract text from the multipart `file` field
pub async fn upload_file(mut multipart: Multipart) -> Result<Json<Value>> {
  while let Some(field) = multipart.next_field().await? {
    if field.name() != Some("file") {
      continue;
    }
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await?;
    let text = upload::extract_text(&file_name, content_type.as_deref(), &bytes)?;
    tracing::debug!("Extracted {} characters from '{}'", text.chars().count(), file_name);
    return Ok(Json(json!({ "text": text })));
  }
  Err(AppError::validation("No file uploaded"))
}

/// GET /api/deck
pub async fn list_decks(State(state): State<AppState>) -> Result<Json<Vec<Deck>>> {
  Ok(Json(state.decks.list().await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateDeckRequest {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub cards: Option<Vec<NewCard>>,
}

/// POST /api/deck
pub async fn create_deck(
  State(state): State<AppState>,
  WithRejection(Json(req), _): WithRejection<Json<CreateDeckRequest>, AppError>,
) -> Result<Json<Deck>> {
  let name = req.name.unwrap_or_default();
  let cards = req.cards.unwrap_or_default();
  Ok(Json(state.decks.create(&name, &cards).await?))
}

#[derive(Debug, Deserialize)]
pub struct DeckQuery {
  pub id: Option<String>,
}

/// DELETE /api/deck?id=
pub async fn delete_deck(
  State(state): State<AppState>,
  Query(query): Query<DeckQuery>,
) -> Result<Json<Value>> {
  let id = query
    .id
    .filter(|id| !id.trim().is_empty())
    .ok_or_else(|| AppError::validation("id required"))?;
  state.decks.delete(&id).await?;
  Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
  pub card_id: Option<String>,
}

/// GET /api/review?cardId=
pub async fn list_reviews(
  State(state): State<AppState>,
  Query(query): Query<ReviewQuery>,
) -> Result<Json<Vec<ReviewEvent>>> {
  let card_id = query
    .card_id
    .filter(|id| !id.trim().is_empty())
    .ok_or_else(|| AppError::validation("cardId required"))?;
  Ok(Json(state.reviews.list(&card_id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendReviewRequest {
  pub card_id: Option<String>,
  #[serde(default)]
  pub result: Option<String>,
  #[serde(default)]
  pub interval: i64,
}

/// POST /api/review - log a review computed by the client
pub async fn append_review(
  State(state): State<AppState>,
  WithRejection(Json(req), _): WithRejection<Json<AppendReviewRequest>, AppError>,
) -> Result<Json<ReviewEvent>> {
  let (card_id, outcome) = validation::validate_review_append(
    req.card_id.as_deref(),
    req.result.as_deref().unwrap_or_default(),
    req.interval,
  )?;
  let now = Utc::now();
  let next_due = now + Duration::minutes(req.interval);
  let event = state
    .reviews
    .append(&card_id, now, outcome, req.interval, next_due)
    .await?;
  Ok(Json(event))
}
