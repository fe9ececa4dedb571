//! In-memory storage for live review sessions.
//!
//! Sessions are keyed by the id carried in the review cookie and expire
//! after a configurable duration of inactivity.

use crate::config;
use crate::session::ReviewSession;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Session entry with last access time for expiration
struct SessionEntry {
  session: ReviewSession,
  last_access: DateTime<Utc>,
}

/// Live review sessions, owned by `AppState`
#[derive(Default)]
pub struct SessionRegistry {
  sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
    // A panic mid-update leaves at worst one stale session behind
    self.sessions.lock().unwrap_or_else(|poisoned| {
      tracing::warn!("Session registry lock poisoned, recovering");
      poisoned.into_inner()
    })
  }

  /// Store a session under a fresh id and return the id
  pub fn insert(&self, session: ReviewSession) -> String {
    self.insert_at(session, Utc::now(), roll_cleanup())
  }

  fn insert_at(&self, session: ReviewSession, now: DateTime<Utc>, cleanup: bool) -> String {
    let mut sessions = self.lock();
    if cleanup {
      cleanup_expired(&mut sessions, now);
    }

    let id = generate_session_id();
    sessions.insert(
      id.clone(),
      SessionEntry {
        session,
        last_access: now,
      },
    );
    id
  }

  /// Run `f` against the session with this id, if it is still alive
  pub fn with_session<R>(&self, session_id: &str, f: impl FnOnce(&mut ReviewSession) -> R) -> Option<R> {
    let mut sessions = self.lock();
    let now = Utc::now();

    if roll_cleanup() {
      cleanup_expired(&mut sessions, now);
    }

    let entry = sessions.get_mut(session_id)?;
    if is_expired(entry.last_access, now) {
      sessions.remove(session_id);
      return None;
    }
    entry.last_access = now;
    Some(f(&mut entry.session))
  }

  pub fn remove(&self, session_id: &str) {
    self.lock().remove(session_id);
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  #[cfg(test)]
  fn set_last_access(&self, session_id: &str, at: DateTime<Utc>) {
    if let Some(entry) = self.lock().get_mut(session_id) {
      entry.last_access = at;
    }
  }
}

/// Clean up expired sessions occasionally (~10% chance)
fn roll_cleanup() -> bool {
  rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD
}

fn is_expired(last_access: DateTime<Utc>, now: DateTime<Utc>) -> bool {
  last_access <= now - Duration::hours(config::SESSION_EXPIRY_HOURS)
}

/// Clean up expired sessions
fn cleanup_expired(sessions: &mut HashMap<String, SessionEntry>, now: DateTime<Utc>) {
  let before = sessions.len();
  sessions.retain(|_, entry| !is_expired(entry.last_access, now));
  let dropped = before - sessions.len();
  if dropped > 0 {
    tracing::debug!("Expired {} review sessions", dropped);
  }
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestEnv;

  fn session(env: &TestEnv, deck_id: &str) -> ReviewSession {
    ReviewSession::new(deck_id, env.store())
  }

  #[test]
  fn test_session_id_shape() {
    let id = generate_session_id();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    assert_ne!(id, generate_session_id());
  }

  #[test]
  fn test_insert_and_lookup() {
    let env = TestEnv::new().unwrap();
    let registry = SessionRegistry::new();
    let id = registry.insert(session(&env, "deck-1"));

    let deck_id = registry.with_session(&id, |s| s.deck_id().to_string());
    assert_eq!(deck_id.as_deref(), Some("deck-1"));
    assert!(registry.with_session("unknown", |_| ()).is_none());
  }

  #[test]
  fn test_expired_session_is_gone() {
    let env = TestEnv::new().unwrap();
    let registry = SessionRegistry::new();
    let id = registry.insert(session(&env, "deck-1"));
    registry.set_last_access(&id, Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS + 1));

    assert!(registry.with_session(&id, |_| ()).is_none());
    assert!(registry.is_empty());
  }

  #[test]
  fn test_insert_cleanup_keeps_active_sessions() {
    let env = TestEnv::new().unwrap();
    let registry = SessionRegistry::new();
    let stale = registry.insert(session(&env, "old"));
    let fresh = registry.insert(session(&env, "new"));
    registry.set_last_access(&stale, Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS * 2));

    // A new session that rolls cleanup drops the abandoned one
    let newest = registry.insert_at(session(&env, "newest"), Utc::now(), true);
    assert_eq!(registry.len(), 2);
    assert!(registry.with_session(&fresh, |_| ()).is_some());
    assert!(registry.with_session(&newest, |_| ()).is_some());
    assert!(registry.with_session(&stale, |_| ()).is_none());
  }

  #[test]
  fn test_insert_without_cleanup_roll_keeps_stale_entry() {
    let env = TestEnv::new().unwrap();
    let registry = SessionRegistry::new();
    let stale = registry.insert_at(session(&env, "old"), Utc::now(), false);
    registry.set_last_access(&stale, Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS * 2));

    registry.insert_at(session(&env, "new"), Utc::now(), false);
    assert_eq!(registry.len(), 2);
  }

  #[test]
  fn test_remove() {
    let env = TestEnv::new().unwrap();
    let registry = SessionRegistry::new();
    let id = registry.insert(session(&env, "deck-1"));
    registry.remove(&id);
    assert!(registry.is_empty());
  }
}
