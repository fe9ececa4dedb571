//! Interval scheduling for review outcomes.
//!
//! `hard` always snaps back to one minute. `okay` doubles and `got`
//! multiplies by 3.5 the previous interval, seeding from the outcome's base
//! interval when the card has none yet.

use chrono::Duration;

use crate::domain::{ReviewOutcome, SchedulingState};

/// Base interval for `hard`, in milliseconds (1 minute)
pub const HARD_BASE_MS: i64 = 60 * 1000;

/// Base interval for `okay`, in milliseconds (10 minutes)
pub const OKAY_BASE_MS: i64 = 10 * 60 * 1000;

/// Base interval for `got`, in milliseconds (1 day)
pub const GOT_BASE_MS: i64 = 24 * 60 * 60 * 1000;

const MS_PER_MINUTE: i64 = 60 * 1000;

/// Ceiling on any interval (100 years); keeps `now + interval` in range
pub const MAX_INTERVAL_MS: i64 = 100 * 365 * GOT_BASE_MS;

/// Result of scheduling one review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleStep {
  /// Full precision interval kept in the live session
  pub interval: Duration,
  /// Interval persisted with the review event
  pub minutes_for_log: i64,
}

/// Base interval for an outcome
pub fn base_interval(outcome: ReviewOutcome) -> Duration {
  Duration::milliseconds(match outcome {
    ReviewOutcome::Hard => HARD_BASE_MS,
    ReviewOutcome::Okay => OKAY_BASE_MS,
    ReviewOutcome::Got => GOT_BASE_MS,
  })
}

/// Grow `prior_ms` by `numerator / denominator`, floored.
///
/// A zero prior returns the seed unchanged.
fn grow(prior_ms: i64, seed_ms: i64, numerator: i64, denominator: i64) -> i64 {
  if prior_ms <= 0 {
    return seed_ms;
  }
  (prior_ms.saturating_mul(numerator) / denominator).min(MAX_INTERVAL_MS)
}

/// Compute the next interval from the card's previous interval and the outcome.
pub fn next_state(prior: Duration, outcome: ReviewOutcome) -> ScheduleStep {
  let prior_ms = prior.num_milliseconds();
  let seed_ms = base_interval(outcome).num_milliseconds();

  let interval_ms = match outcome {
    ReviewOutcome::Hard => seed_ms,
    ReviewOutcome::Okay => grow(prior_ms, seed_ms, 2, 1),
    // x3.5 as x7/2 keeps the floor exact for integer milliseconds
    ReviewOutcome::Got => grow(prior_ms, seed_ms, 7, 2),
  };

  ScheduleStep {
    interval: Duration::milliseconds(interval_ms),
    minutes_for_log: minutes_for_log(interval_ms),
  }
}

/// Whole minutes for persistence, rounding half away from zero
pub fn minutes_for_log(interval_ms: i64) -> i64 {
  (interval_ms as f64 / MS_PER_MINUTE as f64).round() as i64
}

/// Short label for an interval: `3d`, `4h`, `20m` or `< 1m`
pub fn format_interval(interval: Duration) -> String {
  let minutes = interval.num_milliseconds() / MS_PER_MINUTE;
  let hours = minutes / 60;
  let days = hours / 24;

  if days > 0 {
    format!("{}d", days)
  } else if hours > 0 {
    format!("{}h", hours)
  } else if minutes > 0 {
    format!("{}m", minutes)
  } else {
    "< 1m".to_string()
  }
}

/// Interval label each outcome would produce for a card in `state`
pub fn preview(state: &SchedulingState) -> [(ReviewOutcome, String); 3] {
  ReviewOutcome::ALL.map(|outcome| (outcome, format_interval(next_state(state.interval, outcome).interval)))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn minutes(n: i64) -> Duration {
    Duration::minutes(n)
  }

  #[test]
  fn test_hard_always_resets() {
    for prior in [minutes(1), minutes(10), Duration::days(30), Duration::milliseconds(1)] {
      let step = next_state(prior, ReviewOutcome::Hard);
      assert_eq!(step.interval, minutes(1));
      assert_eq!(step.minutes_for_log, 1);
    }
  }

  #[test]
  fn test_hard_on_fresh_card() {
    assert_eq!(next_state(Duration::zero(), ReviewOutcome::Hard).interval, minutes(1));
  }

  #[test]
  fn test_okay_seeds_on_zero() {
    let step = next_state(Duration::zero(), ReviewOutcome::Okay);
    assert_eq!(step.interval, minutes(10));
    assert_eq!(step.minutes_for_log, 10);
  }

  #[test]
  fn test_okay_doubles() {
    assert_eq!(next_state(minutes(10), ReviewOutcome::Okay).interval, minutes(20));
    assert_eq!(next_state(minutes(20), ReviewOutcome::Okay).interval, minutes(40));
  }

  #[test]
  fn test_got_seeds_on_zero() {
    let step = next_state(Duration::zero(), ReviewOutcome::Got);
    assert_eq!(step.interval, Duration::days(1));
    assert_eq!(step.minutes_for_log, 1440);
  }

  #[test]
  fn test_got_multiplies_by_three_and_a_half() {
    let step = next_state(Duration::days(1), ReviewOutcome::Got);
    assert_eq!(step.interval, Duration::days(3) + Duration::hours(12));
    assert_eq!(step.minutes_for_log, 5040);
  }

  #[test]
  fn test_got_floors_odd_milliseconds() {
    // 3 ms * 3.5 = 10.5 ms -> 10 ms
    assert_eq!(
      next_state(Duration::milliseconds(3), ReviewOutcome::Got).interval,
      Duration::milliseconds(10)
    );
  }

  #[test]
  fn test_negative_prior_treated_as_zero() {
    assert_eq!(next_state(minutes(-5), ReviewOutcome::Okay).interval, minutes(10));
  }

  #[test]
  fn test_live_interval_keeps_milliseconds() {
    // 45 s doubled is 90 s: logged as 2 minutes, live state keeps 90 s
    let step = next_state(Duration::seconds(45), ReviewOutcome::Okay);
    assert_eq!(step.interval, Duration::seconds(90));
    assert_eq!(step.minutes_for_log, 2);
  }

  #[test]
  fn test_minutes_for_log_rounding() {
    assert_eq!(minutes_for_log(89_999), 1);
    assert_eq!(minutes_for_log(90_000), 2);
    assert_eq!(minutes_for_log(29_999), 0);
    assert_eq!(minutes_for_log(30_000), 1);
  }

  #[test]
  fn test_format_interval() {
    assert_eq!(format_interval(Duration::seconds(30)), "< 1m");
    assert_eq!(format_interval(minutes(1)), "1m");
    assert_eq!(format_interval(minutes(59)), "59m");
    assert_eq!(format_interval(minutes(90)), "1h");
    assert_eq!(format_interval(Duration::days(1)), "1d");
    assert_eq!(format_interval(Duration::days(3) + Duration::hours(12)), "3d");
  }

  #[test]
  fn test_preview_for_fresh_card() {
    let labels = preview(&SchedulingState::unreviewed());
    assert_eq!(labels[0], (ReviewOutcome::Hard, "1m".to_string()));
    assert_eq!(labels[1], (ReviewOutcome::Okay, "10m".to_string()));
    assert_eq!(labels[2], (ReviewOutcome::Got, "1d".to_string()));
  }

  #[test]
  fn test_growth_is_capped() {
    let step = next_state(Duration::days(36_000), ReviewOutcome::Got);
    assert_eq!(step.interval, Duration::milliseconds(MAX_INTERVAL_MS));
  }

  #[test]
  fn test_base_interval() {
    assert_eq!(base_interval(ReviewOutcome::Hard), minutes(1));
    assert_eq!(base_interval(ReviewOutcome::Okay), minutes(10));
    assert_eq!(base_interval(ReviewOutcome::Got), Duration::days(1));
  }
}
