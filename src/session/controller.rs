//! Review session state machine.
//!
//! A session walks a due set frozen at load time:
//! `Loading -> Presenting(0, hidden) -> Presenting(0, revealed) -> ... -> Complete`.
//! Each submitted outcome spawns one review log append that the session
//! never waits on.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::domain::{Card, ReviewOutcome, SchedulingState};
use crate::error::{AppError, Result};
use crate::srs::{self, ScheduleStep, StateMap};
use crate::store::{DeckStore, ReviewLogStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
  Loading,
  Presenting { index: usize, revealed: bool },
  Complete,
}

/// Outcome of one submission
#[derive(Debug)]
pub struct Submission {
  pub card_id: String,
  pub step: ScheduleStep,
  /// Pending review log append; dropping it does not cancel the write
  pub append: JoinHandle<()>,
}

pub struct ReviewSession {
  deck_id: String,
  deck_name: String,
  state: SessionState,
  due: Vec<Card>,
  schedule: StateMap,
  reviews: Arc<dyn ReviewLogStore>,
}

impl ReviewSession {
  pub fn new(deck_id: impl Into<String>, reviews: Arc<dyn ReviewLogStore>) -> Self {
    Self {
      deck_id: deck_id.into(),
      deck_name: String::new(),
      state: SessionState::Loading,
      due: Vec::new(),
      schedule: StateMap::new(),
      reviews,
    }
  }

  /// Resolve the deck and freeze its due set at `now`.
  pub async fn load(&mut self, decks: &dyn DeckStore, now: DateTime<Utc>) -> Result<()> {
    if self.state != SessionState::Loading {
      return Err(AppError::invalid_state("Session already loaded"));
    }

    let deck = decks
      .get(&self.deck_id)
      .await?
      .ok_or_else(|| AppError::not_found(format!("Deck {} not found", self.deck_id)))?;

    let schedule = srs::load_latest_states(Arc::clone(&self.reviews), &deck.cards).await;
    self.due = srs::due_cards(&deck.cards, &schedule, now);
    self.schedule = schedule;
    self.deck_name = deck.name;

    self.state = if self.due.is_empty() {
      SessionState::Complete
    } else {
      SessionState::Presenting {
        index: 0,
        revealed: false,
      }
    };

    tracing::debug!(
      "Review session for deck {} loaded: {}/{} cards due",
      self.deck_id,
      self.due.len(),
      deck.cards.len()
    );
    Ok(())
  }

  /// Show the answer of the current card. Revealing twice is a no-op.
  pub fn reveal(&mut self) -> Result<()> {
    match self.state {
      SessionState::Presenting { index, .. } => {
        self.state = SessionState::Presenting {
          index,
          revealed: true,
        };
        Ok(())
      }
      SessionState::Loading => Err(AppError::invalid_state("Session is still loading")),
      SessionState::Complete => Err(AppError::invalid_state("Session is complete")),
    }
  }

  /// Record the learner's judgment on the revealed card and move on.
  pub fn submit(&mut self, outcome: ReviewOutcome, now: DateTime<Utc>) -> Result<Submission> {
    let index = match self.state {
      SessionState::Presenting {
        index,
        revealed: true,
      } => index,
      SessionState::Presenting { revealed: false, .. } => {
        return Err(AppError::invalid_state("Reveal the answer before rating the card"));
      }
      SessionState::Loading => return Err(AppError::invalid_state("Session is still loading")),
      SessionState::Complete => return Err(AppError::invalid_state("Session is complete")),
    };

    let card_id = self.due[index].id.clone();
    let prior = self.scheduling_state(&card_id);
    let step = srs::next_state(prior.interval, outcome);

    let append = self.spawn_append(&card_id, outcome, step, now);

    self.schedule.insert(
      card_id.clone(),
      SchedulingState {
        last_reviewed: Some(now),
        interval: step.interval,
        due: now + step.interval,
      },
    );

    self.state = if index + 1 >= self.due.len() {
      SessionState::Complete
    } else {
      SessionState::Presenting {
        index: index + 1,
        revealed: false,
      }
    };

    Ok(Submission {
      card_id,
      step,
      append,
    })
  }

  /// Persist the review without holding up the session.
  fn spawn_append(
    &self,
    card_id: &str,
    outcome: ReviewOutcome,
    step: ScheduleStep,
    now: DateTime<Utc>,
  ) -> JoinHandle<()> {
    let reviews = Arc::clone(&self.reviews);
    let card_id = card_id.to_string();
    let next_due = now + Duration::minutes(step.minutes_for_log);

    tokio::spawn(async move {
      if let Err(e) = reviews
        .append(&card_id, now, outcome, step.minutes_for_log, next_due)
        .await
      {
        tracing::warn!("Review log append for card {} dropped: {}", card_id, e);
      }
    })
  }

  pub fn state(&self) -> SessionState {
    self.state
  }

  pub fn deck_id(&self) -> &str {
    &self.deck_id
  }

  pub fn deck_name(&self) -> &str {
    &self.deck_name
  }

  pub fn current_card(&self) -> Option<&Card> {
    match self.state {
      SessionState::Presenting { index, .. } => self.due.get(index),
      _ => None,
    }
  }

  pub fn is_revealed(&self) -> bool {
    matches!(self.state, SessionState::Presenting { revealed: true, .. })
  }

  /// (cards answered, cards in the due set)
  pub fn progress(&self) -> (usize, usize) {
    let total = self.due.len();
    match self.state {
      SessionState::Loading => (0, 0),
      SessionState::Presenting { index, .. } => (index, total),
      SessionState::Complete => (total, total),
    }
  }

  /// Live scheduling state of a card, unreviewed if unknown
  pub fn scheduling_state(&self, card_id: &str) -> SchedulingState {
    self.schedule.get(card_id).copied().unwrap_or_default()
  }

  /// The frozen due set
  pub fn due_cards(&self) -> &[Card] {
    &self.due
  }
}

/// Builds review sessions from injected stores
#[derive(Clone)]
pub struct ReviewController {
  decks: Arc<dyn DeckStore>,
  reviews: Arc<dyn ReviewLogStore>,
}

impl ReviewController {
  pub fn new(decks: Arc<dyn DeckStore>, reviews: Arc<dyn ReviewLogStore>) -> Self {
    Self { decks, reviews }
  }

  /// Start a session over the cards of `deck_id` due at `now`
  pub async fn start_session(&self, deck_id: &str, now: DateTime<Utc>) -> Result<ReviewSession> {
    let mut session = ReviewSession::new(deck_id, Arc::clone(&self.reviews));
    session.load(self.decks.as_ref(), now).await?;
    Ok(session)
  }
}
