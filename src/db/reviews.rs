//! Review log persistence

use rusqlite::{params, Connection, Result, Row};

use crate::domain::{ReviewEvent, ReviewOutcome};

use super::{from_db_time, to_db_time};

pub fn insert_review_event(conn: &Connection, event: &ReviewEvent) -> Result<()> {
    conn.execute(
        r#"
    INSERT INTO review_logs (id, card_id, reviewed_at, result, interval, next_due)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
        params![
            event.id,
            event.card_id,
            to_db_time(event.reviewed_at),
            event.result.as_str(),
            event.interval,
            to_db_time(event.next_due),
        ],
    )?;
    Ok(())
}

/// All review events of a card, newest first
pub fn get_review_events(conn: &Connection, card_id: &str) -> Result<Vec<ReviewEvent>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, card_id, reviewed_at, result, interval, next_due
    FROM review_logs
    WHERE card_id = ?1
    ORDER BY reviewed_at DESC, rowid DESC
    "#,
    )?;

    let events = stmt
        .query_map(params![card_id], |row| row_to_event(row))?
        .collect::<Result<Vec<_>>>()?;

    Ok(events)
}

fn row_to_event(row: &Row) -> Result<ReviewEvent> {
    let reviewed_at: String = row.get(2)?;
    let result: String = row.get(3)?;
    let next_due: String = row.get(5)?;

    let result = ReviewOutcome::from_str(&result).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown review result '{}'", result).into(),
        )
    })?;

    Ok(ReviewEvent {
        id: row.get(0)?,
        card_id: row.get(1)?,
        reviewed_at: from_db_time(2, &reviewed_at)?,
        result,
        interval: row.get(4)?,
        next_due: from_db_time(5, &next_due)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{delete_deck, insert_deck};
    use crate::domain::{CardType, NewCard};
    use crate::testing::TestEnv;
    use chrono::{DateTime, Duration, Utc};

    fn event(card_id: &str, at: DateTime<Utc>, result: ReviewOutcome, minutes: i64) -> ReviewEvent {
        ReviewEvent {
            id: uuid::Uuid::new_v4().to_string(),
            card_id: card_id.to_string(),
            reviewed_at: at,
            result,
            interval: minutes,
            next_due: at + Duration::minutes(minutes),
        }
    }

    fn seeded(env: &TestEnv) -> (String, String) {
        let deck = insert_deck(
            &env.conn,
            "Deck",
            &[NewCard::new("Q", "A", CardType::Qa)],
            Utc::now(),
        )
        .unwrap();
        (deck.id, deck.cards[0].id.clone())
    }

    #[test]
    fn test_events_newest_first() {
        let env = TestEnv::new().unwrap();
        let (_, card_id) = seeded(&env);
        let now = Utc::now();

        insert_review_event(&env.conn, &event(&card_id, now - Duration::hours(2), ReviewOutcome::Hard, 1)).unwrap();
        insert_review_event(&env.conn, &event(&card_id, now, ReviewOutcome::Got, 1440)).unwrap();
        insert_review_event(&env.conn, &event(&card_id, now - Duration::hours(1), ReviewOutcome::Okay, 10)).unwrap();

        let events = get_review_events(&env.conn, &card_id).unwrap();
        let results: Vec<_> = events.iter().map(|e| e.result).collect();
        assert_eq!(
            results,
            vec![ReviewOutcome::Got, ReviewOutcome::Okay, ReviewOutcome::Hard]
        );
        assert_eq!(events[0].interval, 1440);
    }

    #[test]
    fn test_same_instant_latest_insert_wins() {
        let env = TestEnv::new().unwrap();
        let (_, card_id) = seeded(&env);
        let now = Utc::now();

        insert_review_event(&env.conn, &event(&card_id, now, ReviewOutcome::Hard, 1)).unwrap();
        insert_review_event(&env.conn, &event(&card_id, now, ReviewOutcome::Okay, 10)).unwrap();

        let events = get_review_events(&env.conn, &card_id).unwrap();
        assert_eq!(events[0].result, ReviewOutcome::Okay);
    }

    #[test]
    fn test_unknown_card_rejected_by_foreign_key() {
        let env = TestEnv::new().unwrap();
        let result = insert_review_event(&env.conn, &event("ghost", Utc::now(), ReviewOutcome::Hard, 1));
        assert!(result.is_err());
    }

    #[test]
    fn test_deck_delete_removes_events() {
        let env = TestEnv::new().unwrap();
        let (deck_id, card_id) = seeded(&env);
        insert_review_event(&env.conn, &event(&card_id, Utc::now(), ReviewOutcome::Got, 1440)).unwrap();
        assert_eq!(get_review_events(&env.conn, &card_id).unwrap().len(), 1);

        delete_deck(&env.conn, &deck_id).unwrap();
        assert!(get_review_events(&env.conn, &card_id).unwrap().is_empty());
    }
}
