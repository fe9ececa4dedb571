//! Storage capabilities consumed by the review session and the handlers.
//!
//! `SqliteStore` implements both traits over one shared connection. Stores
//! are constructed in `main` and injected through `AppState`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::{self, try_lock, DbPool};
use crate::domain::{Deck, NewCard, ReviewEvent, ReviewOutcome};
use crate::error::{AppError, Result};
use crate::validation;

#[async_trait]
pub trait DeckStore: Send + Sync {
    /// Create a deck with its cards. Rejects a blank name or an empty card list.
    async fn create(&self, name: &str, cards: &[NewCard]) -> Result<Deck>;

    /// All decks, newest first, cards included
    async fn list(&self) -> Result<Vec<Deck>>;

    async fn get(&self, id: &str) -> Result<Option<Deck>>;

    /// Delete a deck with its cards and their review events
    async fn delete(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait ReviewLogStore: Send + Sync {
    async fn append(
        &self,
        card_id: &str,
        reviewed_at: DateTime<Utc>,
        result: ReviewOutcome,
        interval_minutes: i64,
        next_due: DateTime<Utc>,
    ) -> Result<ReviewEvent>;

    /// Review events of a card, newest first
    async fn list(&self, card_id: &str) -> Result<Vec<ReviewEvent>>;
}

/// Deck and review log store backed by SQLite
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeckStore for SqliteStore {
    async fn create(&self, name: &str, cards: &[NewCard]) -> Result<Deck> {
        let name = validation::validate_new_deck(name, cards)?;
        let conn = try_lock(&self.pool)?;
        let deck = db::insert_deck(&conn, &name, cards, Utc::now())?;
        tracing::info!("Created deck '{}' ({}) with {} cards", deck.name, deck.id, deck.cards.len());
        Ok(deck)
    }

    async fn list(&self) -> Result<Vec<Deck>> {
        let conn = try_lock(&self.pool)?;
        Ok(db::list_decks(&conn)?)
    }

    async fn get(&self, id: &str) -> Result<Option<Deck>> {
        let conn = try_lock(&self.pool)?;
        Ok(db::get_deck(&conn, id)?)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let conn = try_lock(&self.pool)?;
        if !db::delete_deck(&conn, id)? {
            return Err(AppError::not_found(format!("Deck {} not found", id)));
        }
        tracing::info!("Deleted deck {}", id);
        Ok(())
    }
}

#[async_trait]
impl ReviewLogStore for SqliteStore {
    async fn append(
        &self,
        card_id: &str,
        reviewed_at: DateTime<Utc>,
        result: ReviewOutcome,
        interval_minutes: i64,
        next_due: DateTime<Utc>,
    ) -> Result<ReviewEvent> {
        let conn = try_lock(&self.pool)?;
        if !db::card_exists(&conn, card_id)? {
            return Err(AppError::not_found(format!("Card {} not found", card_id)));
        }

        let event = ReviewEvent {
            id: Uuid::new_v4().to_string(),
            card_id: card_id.to_string(),
            reviewed_at,
            result,
            interval: interval_minutes,
            next_due,
        };
        db::insert_review_event(&conn, &event)?;
        tracing::debug!(
            "Logged review of card {}: {} ({} min)",
            card_id,
            result.as_str(),
            interval_minutes
        );
        Ok(event)
    }

    async fn list(&self, card_id: &str) -> Result<Vec<ReviewEvent>> {
        let conn = try_lock(&self.pool)?;
        Ok(db::get_review_events(&conn, card_id)?)
    }
}
