//! Deck and card CRUD

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use uuid::Uuid;

use crate::domain::{Card, CardType, Deck, NewCard};

use super::{from_db_time, to_db_time};

/// Insert a deck and its cards in one transaction.
///
/// Callers validate input first; this only enforces what the schema does.
pub fn insert_deck(
    conn: &Connection,
    name: &str,
    cards: &[NewCard],
    created_at: DateTime<Utc>,
) -> Result<Deck> {
    let tx = conn.unchecked_transaction()?;
    let deck_id = Uuid::new_v4().to_string();

    tx.execute(
        "INSERT INTO decks (id, name, created_at) VALUES (?1, ?2, ?3)",
        params![deck_id, name, to_db_time(created_at)],
    )?;

    let mut inserted = Vec::with_capacity(cards.len());
    {
        let mut stmt = tx.prepare(
            r#"
    INSERT INTO cards (id, deck_id, question, answer, card_type, source, position)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
        )?;

        for (position, new_card) in cards.iter().enumerate() {
            let card = Card {
                id: Uuid::new_v4().to_string(),
                deck_id: deck_id.clone(),
                question: new_card.question.clone(),
                answer: new_card.answer.clone(),
                card_type: new_card.card_type,
                source: new_card.source.clone().filter(|s| !s.trim().is_empty()),
                position: position as i64,
            };
            stmt.execute(params![
                card.id,
                card.deck_id,
                card.question,
                card.answer,
                card.card_type.as_str(),
                card.source,
                card.position,
            ])?;
            inserted.push(card);
        }
    }

    tx.commit()?;

    Ok(Deck {
        id: deck_id,
        name: name.to_string(),
        created_at,
        cards: inserted,
    })
}

/// All decks, newest first, cards included
pub fn list_decks(conn: &Connection) -> Result<Vec<Deck>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, name, created_at
    FROM decks
    ORDER BY created_at DESC, rowid DESC
    "#,
    )?;

    let headers = stmt
        .query_map([], |row| row_to_deck_header(row))?
        .collect::<Result<Vec<_>>>()?;

    headers
        .into_iter()
        .map(|mut deck| {
            deck.cards = get_deck_cards(conn, &deck.id)?;
            Ok(deck)
        })
        .collect()
}

pub fn get_deck(conn: &Connection, id: &str) -> Result<Option<Deck>> {
    let header = conn
        .query_row(
            "SELECT id, name, created_at FROM decks WHERE id = ?1",
            params![id],
            |row| row_to_deck_header(row),
        )
        .optional()?;

    match header {
        Some(mut deck) => {
            deck.cards = get_deck_cards(conn, &deck.id)?;
            Ok(Some(deck))
        }
        None => Ok(None),
    }
}

/// Cards of a deck in submission order
pub fn get_deck_cards(conn: &Connection, deck_id: &str) -> Result<Vec<Card>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, deck_id, question, answer, card_type, source, position
    FROM cards
    WHERE deck_id = ?1
    ORDER BY position ASC, rowid ASC
    "#,
    )?;

    let cards = stmt
        .query_map(params![deck_id], |row| row_to_card(row))?
        .collect::<Result<Vec<_>>>()?;

    Ok(cards)
}

/// Delete a deck; cards and their review logs go with it.
///
/// Returns false when no deck had that id.
pub fn delete_deck(conn: &Connection, id: &str) -> Result<bool> {
    let removed = conn.execute("DELETE FROM decks WHERE id = ?1", params![id])?;
    Ok(removed > 0)
}

pub fn card_exists(conn: &Connection, card_id: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM cards WHERE id = ?1)",
        params![card_id],
        |row| row.get(0),
    )
}

fn row_to_deck_header(row: &Row) -> Result<Deck> {
    let created_at: String = row.get(2)?;
    Ok(Deck {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: from_db_time(2, &created_at)?,
        cards: Vec::new(),
    })
}

fn row_to_card(row: &Row) -> Result<Card> {
    let card_type: String = row.get(4)?;
    Ok(Card {
        id: row.get(0)?,
        deck_id: row.get(1)?,
        question: row.get(2)?,
        answer: row.get(3)?,
        card_type: CardType::from_str(&card_type).unwrap_or_default(),
        source: row.get(5)?,
        position: row.get(6)?,
    })
}
