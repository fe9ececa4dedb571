use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  // Cascades below only fire with enforcement on, and it is per connection
  conn.execute_batch("PRAGMA foreign_keys = ON;")?;

  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS decks (
      id TEXT PRIMARY KEY,
      name TEXT NOT NULL,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS cards (
      id TEXT PRIMARY KEY,
      deck_id TEXT NOT NULL,
      question TEXT NOT NULL,
      answer TEXT NOT NULL,
      card_type TEXT NOT NULL,
      source TEXT,
      position INTEGER NOT NULL DEFAULT 0,
      FOREIGN KEY (deck_id) REFERENCES decks(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS review_logs (
      id TEXT PRIMARY KEY,
      card_id TEXT NOT NULL,
      reviewed_at TEXT NOT NULL,
      result TEXT NOT NULL CHECK (result IN ('hard', 'okay', 'got')),
      interval INTEGER NOT NULL,
      next_due TEXT NOT NULL,
      FOREIGN KEY (card_id) REFERENCES cards(id) ON DELETE CASCADE
    );

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_decks_created_at ON decks(created_at);
    CREATE INDEX IF NOT EXISTS idx_cards_deck_id ON cards(deck_id);
    CREATE INDEX IF NOT EXISTS idx_review_logs_card_id ON review_logs(card_id);
    CREATE INDEX IF NOT EXISTS idx_review_logs_reviewed_at ON review_logs(reviewed_at);
    "#,
  )?;

  // ============================================================
  // MIGRATIONS FOR EXISTING DATABASES
  // These are no-ops for new databases (columns already exist)
  // ============================================================

  // Migration: card ordering within a deck
  add_column_if_missing(conn, "cards", "position", "INTEGER NOT NULL DEFAULT 0")?;

  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}
