//! Due-card selection for a review session.
//!
//! The due set is computed once from a snapshot of `now` and the latest
//! scheduling state of every card. Order follows the deck, not urgency.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::domain::{Card, SchedulingState};
use crate::store::ReviewLogStore;

/// Latest scheduling state keyed by card id. Missing means never reviewed.
pub type StateMap = HashMap<String, SchedulingState>;

fn is_due(card: &Card, states: &StateMap, now: DateTime<Utc>) -> bool {
  states.get(&card.id).is_none_or(|state| state.is_due(now))
}

/// Cards that are due at `now`, in deck order
pub fn due_cards(cards: &[Card], states: &StateMap, now: DateTime<Utc>) -> Vec<Card> {
  cards
    .iter()
    .filter(|card| is_due(card, states, now))
    .cloned()
    .collect()
}

/// Number of cards due at `now`
pub fn due_count(cards: &[Card], states: &StateMap, now: DateTime<Utc>) -> usize {
  cards.iter().filter(|card| is_due(card, states, now)).count()
}

/// Load the newest scheduling state of every card.
///
/// Lookups run concurrently and any completion order is fine. A failed
/// lookup is logged and leaves the card without state, so it counts as due.
pub async fn load_latest_states(reviews: Arc<dyn ReviewLogStore>, cards: &[Card]) -> StateMap {
  let mut lookups = JoinSet::new();

  for card in cards {
    let store = Arc::clone(&reviews);
    let card_id = card.id.clone();
    lookups.spawn(async move {
      let events = store.list(&card_id).await;
      (card_id, events)
    });
  }

  let mut states = StateMap::with_capacity(cards.len());
  while let Some(joined) = lookups.join_next().await {
    match joined {
      Ok((card_id, Ok(events))) => {
        if let Some(state) = SchedulingState::from_latest(&events) {
          states.insert(card_id, state);
        }
      }
      Ok((card_id, Err(e))) => {
        tracing::warn!("Review lookup failed for card {}, treating as due: {}", card_id, e);
      }
      Err(e) => {
        tracing::warn!("Review lookup task failed: {}", e);
      }
    }
  }

  states
}
