use serde::{Deserialize, Serialize};

/// Presentation style of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
  /// Open question with a free-form answer
  #[default]
  Qa,
  /// Sentence with the key term blanked out as `_____`
  Cloze,
}

impl CardType {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "qa" => Some(Self::Qa),
      "cloze" => Some(Self::Cloze),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Qa => "qa",
      Self::Cloze => "cloze",
    }
  }

  /// Badge shown above the question
  pub fn label(&self) -> &'static str {
    match self {
      Self::Qa => "Question",
      Self::Cloze => "Fill-in-the-blank",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
  pub id: String,
  pub deck_id: String,
  pub question: String,
  pub answer: String,
  #[serde(rename = "type")]
  pub card_type: CardType,
  pub source: Option<String>,
  /// Position within the deck, in submission order
  pub position: i64,
}

impl Card {
  /// Source excerpt shortened for display next to the question
  pub fn source_preview(&self) -> Option<String> {
    self
      .source
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(|s| s.chars().take(60).collect())
  }
}

/// Card as submitted for deck creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCard {
  pub question: String,
  pub answer: String,
  #[serde(rename = "type", default)]
  pub card_type: CardType,
  #[serde(default)]
  pub source: Option<String>,
}

impl NewCard {
  pub fn new(question: impl Into<String>, answer: impl Into<String>, card_type: CardType) -> Self {
    Self {
      question: question.into(),
      answer: answer.into(),
      card_type,
      source: None,
    }
  }

  pub fn with_source(mut self, source: impl Into<String>) -> Self {
    self.source = Some(source.into());
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_card_type_from_str() {
    assert_eq!(CardType::from_str("qa"), Some(CardType::Qa));
    assert_eq!(CardType::from_str("cloze"), Some(CardType::Cloze));
    assert_eq!(CardType::from_str("QA"), None);
    assert_eq!(CardType::from_str(""), None);
  }

  #[test]
  fn test_card_type_serde_lowercase() {
    let parsed: CardType = serde_json::from_str("\"cloze\"").unwrap();
    assert_eq!(parsed, CardType::Cloze);
    assert_eq!(serde_json::to_string(&CardType::Qa).unwrap(), "\"qa\"");
  }

  #[test]
  fn test_new_card_type_defaults_to_qa() {
    let card: NewCard = serde_json::from_str(r#"{"question":"Q","answer":"A"}"#).unwrap();
    assert_eq!(card.card_type, CardType::Qa);
    assert!(card.source.is_none());
  }

  #[test]
  fn test_source_preview_truncates() {
    let card = Card {
      id: "c1".into(),
      deck_id: "d1".into(),
      question: "Q".into(),
      answer: "A".into(),
      card_type: CardType::Qa,
      source: Some("x".repeat(100)),
      position: 0,
    };
    assert_eq!(card.source_preview().unwrap().chars().count(), 60);
  }

  #[test]
  fn test_source_preview_blank_is_none() {
    let card = Card {
      id: "c1".into(),
      deck_id: "d1".into(),
      question: "Q".into(),
      answer: "A".into(),
      card_type: CardType::Cloze,
      source: Some("   ".into()),
      position: 0,
    };
    assert!(card.source_preview().is_none());
  }
}
