use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Learner's self-reported recall quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
  Hard,
  Okay,
  Got,
}

impl ReviewOutcome {
  pub const ALL: [ReviewOutcome; 3] = [Self::Hard, Self::Okay, Self::Got];

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "hard" => Some(Self::Hard),
      "okay" => Some(Self::Okay),
      "got" => Some(Self::Got),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Hard => "hard",
      Self::Okay => "okay",
      Self::Got => "got",
    }
  }

  /// Button caption on the review page
  pub fn label(&self) -> &'static str {
    match self {
      Self::Hard => "Hard",
      Self::Okay => "Okay",
      Self::Got => "Got it!",
    }
  }
}

/// One persisted review of a card. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
  pub id: String,
  pub card_id: String,
  pub reviewed_at: DateTime<Utc>,
  pub result: ReviewOutcome,
  /// Interval chosen for this review, in whole minutes
  pub interval: i64,
  pub next_due: DateTime<Utc>,
}

/// Scheduling state of a card, derived from its newest review event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingState {
  pub last_reviewed: Option<DateTime<Utc>>,
  /// Millisecond precision while live, minute precision once reloaded
  pub interval: Duration,
  pub due: DateTime<Utc>,
}

impl SchedulingState {
  /// Never reviewed: zero interval, due immediately
  pub fn unreviewed() -> Self {
    Self {
      last_reviewed: None,
      interval: Duration::zero(),
      due: DateTime::<Utc>::UNIX_EPOCH,
    }
  }

  pub fn from_event(event: &ReviewEvent) -> Self {
    Self {
      last_reviewed: Some(event.reviewed_at),
      interval: Duration::minutes(event.interval),
      due: event.next_due,
    }
  }

  /// State from the newest event of a newest-first list
  pub fn from_latest(events: &[ReviewEvent]) -> Option<Self> {
    events.first().map(Self::from_event)
  }

  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.due <= now
  }
}

impl Default for SchedulingState {
  fn default() -> Self {
    Self::unreviewed()
  }
}
