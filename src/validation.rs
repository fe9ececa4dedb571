//! Input validation for deck creation, review appends and generation
//! requests.
//!
//! Everything here runs before a store or generator is touched, so a
//! rejected request leaves storage unchanged.

use serde_json::Value;

use crate::config;
use crate::domain::{NewCard, ReviewOutcome};
use crate::error::{AppError, Result};
use crate::srs::scheduler::MAX_INTERVAL_MS;

const DECK_REQUIREMENTS: &str = "Deck must have a name and at least one card.";

/// Longest interval a client may log, the same ceiling the scheduler applies
pub const MAX_INTERVAL_MINUTES: i64 = MAX_INTERVAL_MS / 60_000;

/// Check a deck creation request and return the trimmed name
pub fn validate_new_deck(name: &str, cards: &[NewCard]) -> Result<String> {
  let name = name.trim();
  if name.is_empty() || cards.is_empty() {
    return Err(AppError::validation(DECK_REQUIREMENTS));
  }

  if let Some(idx) = cards
    .iter()
    .position(|c| c.question.trim().is_empty() || c.answer.trim().is_empty())
  {
    return Err(AppError::validation(format!(
      "Card {} needs a question and an answer.",
      idx + 1
    )));
  }

  Ok(name.to_string())
}

/// Parse a review outcome coming from a client
pub fn parse_outcome(raw: &str) -> Result<ReviewOutcome> {
  ReviewOutcome::from_str(raw.trim())
    .ok_or_else(|| AppError::validation(format!("Invalid result '{}': expected hard, okay or got", raw)))
}

/// Check a raw review log append and return the card id and outcome
pub fn validate_review_append(
  card_id: Option<&str>,
  result: &str,
  interval_minutes: i64,
) -> Result<(String, ReviewOutcome)> {
  let card_id = card_id
    .map(str::trim)
    .filter(|id| !id.is_empty())
    .ok_or_else(|| AppError::validation("Missing cardId or invalid result"))?;
  let outcome = ReviewOutcome::from_str(result)
    .ok_or_else(|| AppError::validation("Missing cardId or invalid result"))?;
  if interval_minutes < 0 {
    return Err(AppError::validation("Interval must not be negative"));
  }
  if interval_minutes > MAX_INTERVAL_MINUTES {
    return Err(AppError::validation("Interval is too long"));
  }
  Ok((card_id.to_string(), outcome))
}

/// Reject blank generation input
pub fn validate_generation_text(text: &str) -> Result<&str> {
  if text.trim().is_empty() {
    return Err(AppError::validation("No text provided"));
  }
  Ok(text)
}

/// Read a JSON card count sent as a number or a numeric string.
/// Fractions are truncated; anything else counts as absent.
pub fn max_items_from_json(raw: Option<&Value>) -> Option<i64> {
  match raw? {
    Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
    Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64),
    _ => None,
  }
}

/// Requested card count, defaulted and clamped to what a deck can hold
pub fn normalize_max_items(requested: Option<i64>) -> usize {
  match requested {
    Some(n) if n > 0 => (n as usize).min(config::MAX_ITEMS_LIMIT),
    _ => config::DEFAULT_MAX_ITEMS,
  }
}
