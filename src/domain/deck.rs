use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Card;

/// A named set of cards created together from one source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
  pub id: String,
  pub name: String,
  pub created_at: DateTime<Utc>,
  pub cards: Vec<Card>,
}

impl Deck {
  pub fn card_count(&self) -> usize {
    self.cards.len()
  }
}
