//! Versioned schema for the level database
//!
//! Each SQL file under `migrations/` is baked into the library and runs once,
//! in file order; `_migrations` records which ones a database has seen.

use rusqlite::Connection;
use tracing::{debug, info, warn};

/// (file name, SQL) in apply order
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_initial_schema.sql",
        include_str!("../migrations/001_initial_schema.sql"),
    ),
    (
        "002_add_settings.sql",
        include_str!("../migrations/002_add_settings.sql"),
    ),
];

/// Apply every embedded migration that is not yet recorded in `_migrations`
///
/// Returns the number of migrations applied by this call.
pub fn run_migrations(conn: &Connection) -> Result<usize, rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let applied = get_applied_migrations(conn)?;
    let pending: Vec<_> = MIGRATIONS
        .iter()
        .filter(|(name, _)| !applied.iter().any(|a| a == name))
        .collect();

    if pending.is_empty() {
        debug!("No pending migrations");
        return Ok(0);
    }

    for (name, sql) in &pending {
        info!("Running migration {}", name);

        let tx = conn.unchecked_transaction()?;
        if let Err(e) = tx.execute_batch(sql) {
            let message = e.to_string();
            if !(message.contains("duplicate column name") || message.contains("already exists"))
            {
                return Err(e);
            }
            // schema change already present in an older database
            warn!("Migration {} partially applied: {}", name, e);
        }
        tx.execute("INSERT OR IGNORE INTO _migrations (name) VALUES (?1)", [name])?;
        tx.commit()?;
    }

    info!("Applied {} new migration(s)", pending.len());
    Ok(pending.len())
}

/// Whether `name` is recorded as applied
pub fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM _migrations WHERE name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Names of applied migrations, oldest first
pub fn get_applied_migrations(conn: &Connection) -> Result<Vec<String>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT name FROM _migrations ORDER BY id")?;
    stmt.query_map([], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()
}
