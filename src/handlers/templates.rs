//! Template and form structs for page handlers.

use askama::Template;
use serde::Deserialize;

use crate::filters;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
  pub error: Option<String>,
  pub text: String,
  pub max_items: usize,
  pub remote_enabled: bool,
}

/// Card as shown in the generation preview
pub struct PreviewCard {
  pub kind: &'static str,
  pub question: String,
  pub answer: String,
  pub source: Option<String>,
}

#[derive(Template)]
#[template(path = "preview.html")]
pub struct PreviewTemplate {
  pub summary_lines: Vec<String>,
  pub cards: Vec<PreviewCard>,
  pub suggestions: Vec<String>,
  pub suggested_name: String,
  /// Serialized cards posted back when the deck is saved
  pub cards_json: String,
  pub used_fallback: bool,
}

pub struct DeckRow {
  pub id: String,
  pub name: String,
  pub created: String,
  pub card_count: usize,
  pub due_count: usize,
  /// Shown when nothing is due
  pub next_due: Option<String>,
}

#[derive(Template)]
#[template(path = "decks.html")]
pub struct DecksTemplate {
  pub decks: Vec<DeckRow>,
}

pub struct OutcomeButton {
  pub value: &'static str,
  pub label: &'static str,
  pub interval: String,
}

pub struct ReviewCardView {
  pub kind: &'static str,
  pub question: String,
  pub answer: String,
  pub source: Option<String>,
}

#[derive(Template)]
#[template(path = "review.html")]
pub struct ReviewTemplate {
  pub deck_id: String,
  pub deck_name: String,
  pub answered: usize,
  pub total: usize,
  pub card: Option<ReviewCardView>,
  pub revealed: bool,
  pub buttons: Vec<OutcomeButton>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
  pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveDeckForm {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub suggested_name: String,
  pub cards_json: String,
}

#[derive(Debug, Deserialize)]
pub struct OutcomeForm {
  pub outcome: String,
}
