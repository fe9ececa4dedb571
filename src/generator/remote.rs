//! Flashcard generation through an OpenAI-compatible chat-completions API.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

use super::{local, GeneratedDeck, Generator};
use crate::config::{self, GeneratorSettings};
use crate::error::{AppError, Result};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("valid code fence regex"));

const SYSTEM_PROMPT: &str = r#"You turn study material into flashcards.

First decide which kind of material you were given:

A) A quiz: numbered questions followed by answer lines such as "Answer: c) Nvidia".
   - Keep every question exactly as written; do not rephrase or invent questions.
   - The answer is only the answer text: drop "Answer:" and option letters like "a)".
   - Every card is type "qa". Never produce cloze cards for a quiz.
   - Include all questions, not just the first few.

B) Study notes: paragraphs and explanations without ready-made questions.
   - Write new cards covering the whole document, one concept per card.
   - Use "cloze" for definitions, vocabulary, formulas and key facts: replace the key
     term in the question with "_____" and put the term in the answer.
   - Use "qa" for processes and why/how questions.

Deck names: 3 to 5 short topic names of 2 to 5 words about the subject matter,
for example "Plant Biology Basics". Never use a question or a question fragment.

Summary: 6 to 10 markdown bullet points covering the main topics.

Reply with raw JSON only, no code fences, in exactly this shape:
{
  "summary": "- bullet\n- bullet",
  "deckNameSuggestions": ["Topic One", "Topic Two", "Topic Three"],
  "flashcards": [
    {
      "id": "unique-id",
      "type": "qa",
      "question": "question or cloze text",
      "answer": "answer or missing term",
      "source": { "text": "supporting excerpt" }
    }
  ]
}"#;

fn user_prompt(text: &str, max_items: usize) -> String {
    let excerpt: String = text.chars().take(config::PROMPT_TEXT_LIMIT).collect();
    format!(
        "Create {max_items} flashcards from the study material below.\n\n\
         {excerpt}\n\n\
         Reminders:\n\
         1. Detect whether this is a quiz. If so keep the questions and clean the answers.\n\
         2. Suggest 3 to 5 short deck names about the main topic.\n\
         3. Spread the cards across the whole material.\n\
         4. Return exactly {max_items} cards as raw JSON."
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

pub struct RemoteGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl RemoteGenerator {
    /// Build a client from settings; None when no API key is configured
    pub fn from_settings(settings: &GeneratorSettings) -> Result<Option<Self>> {
        let Some(api_key) = settings.api_key.clone() else {
            return Ok(None);
        };
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Some(Self {
            client,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            api_key,
            temperature: settings.temperature,
        }))
    }

    async fn complete(&self, text: &str, max_items: usize) -> Result<String> {
        let prompt = user_prompt(text, max_items);
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let body = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: ChatResponse = serde_json::from_str(&body)?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::MalformedResponse("No content from model".into()))
    }
}

#[async_trait]
impl Generator for RemoteGenerator {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn generate(&self, text: &str, max_items: usize) -> Result<GeneratedDeck> {
        let content = self.complete(text, max_items).await?;
        parse_model_output(&content, text)
    }
}

/// Turn the model's reply into a deck, filling ids and deck names it left out.
pub fn parse_model_output(content: &str, raw_text: &str) -> Result<GeneratedDeck> {
    let json = CODE_FENCE
        .captures(content)
        .and_then(|c| c.get(1))
        .map_or(content, |m| m.as_str());

    let mut deck: GeneratedDeck = serde_json::from_str(json.trim())?;

    deck.flashcards
        .retain(|c| !c.question.trim().is_empty() && !c.answer.trim().is_empty());
    if deck.flashcards.is_empty() {
        return Err(AppError::MalformedResponse("Model returned no flashcards".into()));
    }

    let batch = Uuid::new_v4().simple().to_string();
    for (idx, card) in deck.flashcards.iter_mut().enumerate() {
        if card.id.trim().is_empty() {
            card.id = format!("card-{}-{}", batch, idx);
        }
    }

    deck.deck_name_suggestions.retain(|n| !n.trim().is_empty());
    if deck.deck_name_suggestions.is_empty() {
        deck.deck_name_suggestions = local::fallback_deck_names(&deck.summary, raw_text);
    }

    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CardType;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    #[test]
    fn test_parse_plain_json() {
        let deck = parse_model_output(
            r#"{"summary":"- Mars","deckNameSuggestions":["Planets"],
                "flashcards":[{"id":"a","type":"qa","question":"Red planet?","answer":"Mars"}]}"#,
            "",
        )
        .unwrap();
        assert_eq!(deck.flashcards[0].id, "a");
        assert_eq!(deck.deck_name_suggestions, vec!["Planets"]);
    }

    #[test]
    fn test_parse_fenced_json_fills_ids_and_names() {
        let content = "Here you go:\n```json\n{\"summary\":\"- Mitochondria make energy\",\
            \"flashcards\":[{\"type\":\"cloze\",\"question\":\"_____ make energy\",\"answer\":\"Mitochondria\"},\
            {\"type\":\"qa\",\"question\":\"What makes energy?\",\"answer\":\"Mitochondria\"}]}\n```";
        let deck = parse_model_output(content, "").unwrap();

        assert_eq!(deck.flashcards.len(), 2);
        assert_eq!(deck.flashcards[0].card_type, CardType::Cloze);
        assert!(deck.flashcards[0].id.starts_with("card-"));
        assert!(deck.flashcards[1].id.ends_with("-1"));
        assert_eq!(deck.deck_name_suggestions, vec!["Mitochondria make energy"]);
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = parse_model_output("I cannot help with that.", "").unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn test_no_cards_is_malformed() {
        let err = parse_model_output(r#"{"summary":"- x","flashcards":[]}"#, "").unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn test_prompt_caps_text() {
        let text = "ж".repeat(config::PROMPT_TEXT_LIMIT + 500);
        let prompt = user_prompt(&text, 12);
        assert!(prompt.starts_with("Create 12 flashcards"));
        assert_eq!(prompt.matches('ж').count(), config::PROMPT_TEXT_LIMIT);
    }

    /// Serve one canned chat completion on a local port
    async fn fake_model(reply: Value) -> String {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(body): Json<Value>| {
                let reply = reply.clone();
                async move {
                    assert_eq!(body["messages"][0]["role"], "system");
                    assert_eq!(body["model"], "test-model");
                    Json(reply)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1/chat/completions", addr)
    }

    fn settings(endpoint: String) -> GeneratorSettings {
        GeneratorSettings {
            endpoint,
            model: "test-model".into(),
            api_key: Some("test-key".into()),
            ..GeneratorSettings::default()
        }
    }

    #[tokio::test]
    async fn test_generate_against_fake_model() {
        let content = json!({
            "summary": "- Water boils at 100 C",
            "deckNameSuggestions": ["Physics Basics"],
            "flashcards": [{"type": "qa", "question": "Boiling point of water?", "answer": "100 C"}]
        })
        .to_string();
        let endpoint = fake_model(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
        .await;

        let generator = RemoteGenerator::from_settings(&settings(endpoint)).unwrap().unwrap();
        let deck = generator.generate("Water boils at 100 C.", 5).await.unwrap();
        assert_eq!(deck.flashcards[0].answer, "100 C");
        assert_eq!(deck.deck_name_suggestions, vec!["Physics Basics"]);
    }

    #[tokio::test]
    async fn test_empty_content_is_malformed() {
        let endpoint = fake_model(json!({"choices": [{"message": {"content": ""}}]})).await;
        let generator = RemoteGenerator::from_settings(&settings(endpoint)).unwrap().unwrap();
        let err = generator.generate("text", 5).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transient() {
        // Port 9 (discard) is closed on test hosts
        let generator = RemoteGenerator::from_settings(&settings("http://127.0.0.1:9/v1".into()))
            .unwrap()
            .unwrap();
        let err = generator.generate("text", 5).await.unwrap_err();
        assert!(matches!(err, AppError::TransientIo(_)));
    }

    #[test]
    fn test_no_key_disables_remote() {
        let settings = GeneratorSettings::default();
        assert!(RemoteGenerator::from_settings(&settings).unwrap().is_none());
    }
}
