//! Server-rendered pages: paste or upload, preview, deck list.

use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use chrono::Utc;
use std::sync::Arc;

use crate::config;
use crate::db::LogOnError;
use crate::domain::{Deck, NewCard};
use crate::error::AppError;
use crate::generator::{GeneratedCard, Generation};
use crate::srs;
use crate::state::AppState;
use crate::validation;

use super::templates::{DeckRow, DecksTemplate, IndexTemplate, PreviewCard, PreviewTemplate, SaveDeckForm};
use super::{error_page, format_relative_time, read_generate_form, render};

const UNTITLED_DECK: &str = "Untitled Deck";

fn index_page(state: &AppState, error: Option<String>, text: String, max_items: usize) -> Response {
  let template = IndexTemplate {
    error,
    text,
    max_items,
    remote_enabled: state.generator.has_remote(),
  };
  render(&template).into_response()
}

/// GET /
pub async fn index(State(state): State<AppState>) -> Response {
  index_page(&state, None, String::new(), config::DEFAULT_MAX_ITEMS)
}

/// POST /generate
pub async fn generate(State(state): State<AppState>, multipart: Multipart) -> Response {
  let form = match read_generate_form(multipart).await {
    Ok(form) => form,
    Err(e @ AppError::Validation(_)) => {
      return index_page(&state, Some(e.to_string()), String::new(), config::DEFAULT_MAX_ITEMS);
    }
    Err(e) => return error_page(e),
  };

  let max_items = validation::normalize_max_items(form.max_items);
  let text = form.source_text().to_string();

  match state.generator.generate(&text, max_items).await {
    Ok(generation) => render(&preview_template(generation)).into_response(),
    Err(e @ AppError::Validation(_)) => index_page(&state, Some(e.to_string()), text, max_items),
    Err(e) => error_page(e),
  }
}

fn preview_card(card: &GeneratedCard) -> PreviewCard {
  PreviewCard {
    kind: card.card_type.label(),
    question: card.question.clone(),
    answer: card.answer.clone(),
    source: card.source.as_ref().and_then(|s| s.text.clone()),
  }
}

fn preview_template(generation: Generation) -> PreviewTemplate {
  let deck = generation.deck;
  let new_cards: Vec<NewCard> = deck.flashcards.iter().map(GeneratedCard::to_new_card).collect();
  let cards_json = serde_json::to_string(&new_cards).log_warn_default("Failed to serialize preview cards");

  PreviewTemplate {
    summary_lines: deck
      .summary
      .lines()
      .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim().to_string())
      .filter(|l| !l.is_empty())
      .collect(),
    cards: deck.flashcards.iter().map(preview_card).collect(),
    suggested_name: deck.deck_name_suggestions.first().cloned().unwrap_or_default(),
    suggestions: deck.deck_name_suggestions,
    cards_json,
    used_fallback: generation.source.is_fallback(),
  }
}

/// Name typed by the user, else the first suggestion, else a placeholder
fn resolve_deck_name(name: &str, suggested: &str) -> String {
  [name, suggested]
    .into_iter()
    .map(str::trim)
    .find(|n| !n.is_empty())
    .unwrap_or(UNTITLED_DECK)
    .to_string()
}

/// POST /decks
pub async fn save_deck(State(state): State<AppState>, Form(form): Form<SaveDeckForm>) -> Response {
  let cards: Vec<NewCard> = match serde_json::from_str(&form.cards_json) {
    Ok(cards) => cards,
    Err(e) => {
      tracing::warn!("Rejected deck save with unreadable cards: {}", e);
      return error_page(AppError::validation("The generated cards could not be read. Generate them again."));
    }
  };

  let name = resolve_deck_name(&form.name, &form.suggested_name);
  match state.decks.create(&name, &cards).await {
    Ok(_) => Redirect::to("/decks").into_response(),
    Err(e) => error_page(e),
  }
}

async fn deck_row(state: &AppState, deck: Deck) -> DeckRow {
  let now = Utc::now();
  let states = srs::load_latest_states(Arc::clone(&state.reviews), &deck.cards).await;
  let due_count = srs::due_count(&deck.cards, &states, now);
  let next_due = (due_count == 0)
    .then(|| states.values().map(|s| s.due).min())
    .flatten()
    .map(|due| format_relative_time(due, now));

  DeckRow {
    card_count: deck.card_count(),
    created: deck.created_at.format("%b %-d, %Y").to_string(),
    id: deck.id,
    name: deck.name,
    due_count,
    next_due,
  }
}

/// GET /decks
pub async fn decks(State(state): State<AppState>) -> Response {
  let decks = match state.decks.list().await {
    Ok(decks) => decks,
    Err(e) => return error_page(e),
  };

  let mut rows = Vec::with_capacity(decks.len());
  for deck in decks {
    rows.push(deck_row(&state, deck).await);
  }
  render(&DecksTemplate { decks: rows }).into_response()
}

/// POST /decks/{id}/delete
pub async fn delete_deck(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
  state.decks.delete(&id).await.log_warn("Failed to delete deck");
  Redirect::to("/decks")
}
