//! Versioned schema for the geocode cache table.
//!
//! Each upgrade runs in its own transaction together with its row in
//! `_migrations`, so a failed step leaves the store at the last good version.

use rusqlite::Connection;

use super::error::DatabaseError;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_geocode_cache_table",
        sql: include_str!("sql/001_create_geocode_cache.sql"),
    },
    Migration {
        version: 2,
        description: "index_geocode_cache_updated_at",
        sql: include_str!("sql/002_index_geocode_cache_updated_at.sql"),
    },
];

/// Version a fully upgraded store reports.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Highest upgrade recorded in the store, 0 for a fresh file.
pub fn current_version(conn: &Connection) -> Result<u32, DatabaseError> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;
    Ok(version)
}

/// Brings the geocode cache schema up to [`latest_version`].
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let from = current_version(conn)?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > from) {
        apply(conn, migration).map_err(|source| DatabaseError::Migration {
            version: migration.version,
            description: migration.description,
            source,
        })?;
        log::info!(
            "Geocode store upgraded to v{} ({})",
            migration.version,
            migration.description
        );
    }

    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
        rusqlite::params![migration.version, migration.description],
    )?;
    tx.commit()
}
