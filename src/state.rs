//! Application state shared by all handlers.

use std::sync::Arc;

use crate::generator::GenerationPolicy;
use crate::session::{ReviewController, SessionRegistry};
use crate::store::{DeckStore, ReviewLogStore, SqliteStore};

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub decks: Arc<dyn DeckStore>,
    pub reviews: Arc<dyn ReviewLogStore>,
    pub generator: Arc<GenerationPolicy>,
    /// Live review sessions keyed by cookie id
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(
        decks: Arc<dyn DeckStore>,
        reviews: Arc<dyn ReviewLogStore>,
        generator: GenerationPolicy,
    ) -> Self {
        Self {
            decks,
            reviews,
            generator: Arc::new(generator),
            sessions: Arc::new(SessionRegistry::new()),
        }
    }

    /// State backed by one SQLite store for both decks and review logs
    pub fn with_sqlite(store: Arc<SqliteStore>, generator: GenerationPolicy) -> Self {
        Self::new(store.clone(), store, generator)
    }

    pub fn review_controller(&self) -> ReviewController {
        ReviewController::new(Arc::clone(&self.decks), Arc::clone(&self.reviews))
    }
}
