//! Chooses between the remote generator and the local fallback.

use std::sync::Arc;

use super::{GeneratedDeck, Generator, LocalFallbackGenerator, RemoteGenerator};
use crate::config::{self, GeneratorSettings};
use crate::error::{AppError, Result};
use crate::validation;

/// Which generator produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationSource {
    Remote,
    LocalFallback,
}

impl GenerationSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::LocalFallback)
    }
}

#[derive(Debug)]
pub struct Generation {
    pub deck: GeneratedDeck,
    pub source: GenerationSource,
}

pub struct GenerationPolicy {
    remote: Option<Arc<dyn Generator>>,
    fallback: Arc<dyn Generator>,
    remote_attempts: u32,
    fallback_cap: usize,
}

impl GenerationPolicy {
    pub fn new(remote: Option<Arc<dyn Generator>>, fallback: Arc<dyn Generator>) -> Self {
        Self {
            remote,
            fallback,
            remote_attempts: config::DEFAULT_AI_ATTEMPTS,
            fallback_cap: config::FALLBACK_MAX_ITEMS,
        }
    }

    /// Local heuristics only
    pub fn local_only() -> Self {
        Self::new(None, Arc::new(LocalFallbackGenerator::new()))
    }

    /// Remote generator when an API key is configured, local fallback always
    pub fn from_settings(settings: &GeneratorSettings) -> Self {
        let remote = match RemoteGenerator::from_settings(settings) {
            Ok(remote) => remote.map(|r| Arc::new(r) as Arc<dyn Generator>),
            Err(e) => {
                tracing::warn!("Remote generator unavailable, using local fallback only: {}", e);
                None
            }
        };
        Self::new(remote, Arc::new(LocalFallbackGenerator::new())).with_attempts(settings.attempts)
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.remote_attempts = attempts.max(1);
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Generate a deck from `text`.
    ///
    /// Blank text is a validation error. Remote failures never surface: a
    /// transient error is retried up to the attempt budget, anything else
    /// goes straight to the local fallback.
    pub async fn generate(&self, text: &str, max_items: usize) -> Result<Generation> {
        let text = validation::validate_generation_text(text)?;

        if let Some(remote) = &self.remote {
            match self.try_remote(remote.as_ref(), text, max_items).await {
                Ok(deck) => {
                    return Ok(Generation {
                        deck,
                        source: GenerationSource::Remote,
                    });
                }
                Err(e) => {
                    tracing::warn!("Generation via {} failed, using local fallback: {}", remote.name(), e);
                }
            }
        }

        let deck = self
            .fallback
            .generate(text, max_items.min(self.fallback_cap))
            .await?;
        tracing::debug!("Local fallback produced {} cards", deck.flashcards.len());
        Ok(Generation {
            deck,
            source: GenerationSource::LocalFallback,
        })
    }

    async fn try_remote(&self, remote: &dyn Generator, text: &str, max_items: usize) -> Result<GeneratedDeck> {
        let mut attempt = 1;
        loop {
            match remote.generate(text, max_items).await {
                Ok(deck) => return Ok(deck),
                Err(e @ AppError::TransientIo(_)) if attempt < self.remote_attempts => {
                    tracing::debug!("Generation attempt {} failed, retrying: {}", attempt, e);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CardType;
    use crate::generator::GeneratedCard;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    const NOTES: &str = "Mitochondria produce cellular energy. Ribosomes assemble proteins. \
        Chloroplasts capture sunlight. Nuclei store genetic material.";

    /// Remote stand-in that fails with a fixed error or returns one card
    struct ScriptedRemote {
        error: Option<fn() -> AppError>,
        calls: AtomicU32,
    }

    impl ScriptedRemote {
        fn failing(error: fn() -> AppError) -> Self {
            Self {
                error: Some(error),
                calls: AtomicU32::new(0),
            }
        }

        fn working() -> Self {
            Self {
                error: None,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Generator for ScriptedRemote {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn generate(&self, _text: &str, _max_items: usize) -> Result<GeneratedDeck> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = self.error {
                return Err(error());
            }
            Ok(GeneratedDeck {
                summary: "- remote".into(),
                flashcards: vec![GeneratedCard {
                    id: "r1".into(),
                    card_type: CardType::Qa,
                    question: "Q".into(),
                    answer: "A".into(),
                    source: None,
                }],
                deck_name_suggestions: vec!["Remote Deck".into()],
            })
        }
    }

    fn policy(remote: Arc<ScriptedRemote>, attempts: u32) -> GenerationPolicy {
        GenerationPolicy::new(Some(remote as Arc<dyn Generator>), Arc::new(LocalFallbackGenerator::new()))
            .with_attempts(attempts)
    }

    #[tokio::test]
    async fn test_remote_success() {
        let remote = Arc::new(ScriptedRemote::working());
        let generation = policy(remote.clone(), 1).generate(NOTES, 10).await.unwrap();
        assert_eq!(generation.source, GenerationSource::Remote);
        assert_eq!(generation.deck.flashcards[0].id, "r1");
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_retried_then_falls_back() {
        let remote = Arc::new(ScriptedRemote::failing(|| AppError::TransientIo("timeout".into())));
        let generation = policy(remote.clone(), 3).generate(NOTES, 10).await.unwrap();
        assert_eq!(generation.source, GenerationSource::LocalFallback);
        assert_eq!(remote.calls.load(Ordering::SeqCst), 3);
        assert_eq!(generation.deck.flashcards.len(), 4);
    }

    #[tokio::test]
    async fn test_malformed_response_not_retried() {
        let remote = Arc::new(ScriptedRemote::failing(|| AppError::MalformedResponse("prose".into())));
        let generation = policy(remote.clone(), 3).generate(NOTES, 10).await.unwrap();
        assert!(generation.source.is_fallback());
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_text_is_validation_error() {
        let remote = Arc::new(ScriptedRemote::working());
        let err = policy(remote.clone(), 1).generate("  \n ", 10).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_caps_card_count() {
        let text = (0..60)
            .map(|i| format!("Sentence number {} describes something.", i))
            .collect::<Vec<_>>()
            .join(" ");
        let generation = GenerationPolicy::local_only().generate(&text, 100).await.unwrap();
        assert_eq!(generation.source, GenerationSource::LocalFallback);
        assert_eq!(generation.deck.flashcards.len(), config::FALLBACK_MAX_ITEMS);
    }

    #[test]
    fn test_from_settings_without_key_is_local_only() {
        let policy = GenerationPolicy::from_settings(&GeneratorSettings::default());
        assert!(!policy.has_remote());
    }
}
