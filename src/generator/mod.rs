//! Flashcard generation from study text.
//!
//! A `Generator` turns raw text into a summary, cards and deck name
//! suggestions. `RemoteGenerator` asks a chat-completions model,
//! `LocalFallbackGenerator` uses sentence heuristics, and
//! `GenerationPolicy` decides which one answers.

pub mod local;
pub mod policy;
pub mod remote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{CardType, NewCard};
use crate::error::Result;

pub use local::LocalFallbackGenerator;
pub use policy::{Generation, GenerationPolicy, GenerationSource};
pub use remote::RemoteGenerator;

#[async_trait]
pub trait Generator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn generate(&self, text: &str, max_items: usize) -> Result<GeneratedDeck>;
}

/// Where a generated card came from in the source text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCard {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub card_type: CardType,
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<CardSource>,
}

impl GeneratedCard {
    /// Card ready to be saved into a deck
    pub fn to_new_card(&self) -> NewCard {
        let card = NewCard::new(self.question.trim(), self.answer.trim(), self.card_type);
        match self.source.as_ref().and_then(|s| s.text.as_deref()) {
            Some(text) if !text.trim().is_empty() => card.with_source(text.trim()),
            _ => card,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDeck {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub flashcards: Vec<GeneratedCard>,
    #[serde(default)]
    pub deck_name_suggestions: Vec<String>,
}
