//! Geocode cache repository: CRUD operations for the `geocode_cache` table.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DatabaseError};

/// A raw geocode cache row. `updated_at` is RFC 3339.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeRow {
    pub address_key: String,
    pub lat: f64,
    pub lng: f64,
    pub updated_at: String,
}

impl GeocodeRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            address_key: row.get("address_key")?,
            lat: row.get("lat")?,
            lng: row.get("lng")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Inserts or replaces the row for `row.address_key`.
pub fn upsert(db: &Database, row: &GeocodeRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO geocode_cache (address_key, lat, lng, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(address_key) DO UPDATE SET
               lat = excluded.lat,
               lng = excluded.lng,
               updated_at = excluded.updated_at",
            params![row.address_key, row.lat, row.lng, row.updated_at],
        )?;
        Ok(())
    })
}

/// Finds the row for an address key.
pub fn find(db: &Database, address_key: &str) -> Result<Option<GeocodeRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT address_key, lat, lng, updated_at FROM geocode_cache WHERE address_key = ?1",
                params![address_key],
                GeocodeRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Deletes a single entry. Returns whether a row was removed.
pub fn delete(db: &Database, address_key: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let affected = conn.execute(
            "DELETE FROM geocode_cache WHERE address_key = ?1",
            params![address_key],
        )?;
        Ok(affected > 0)
    })
}

/// Deletes every entry last updated before `cutoff` (RFC 3339, UTC).
pub fn delete_older_than(db: &Database, cutoff: &str) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let affected = conn.execute(
            "DELETE FROM geocode_cache WHERE updated_at < ?1",
            params![cutoff],
        )?;
        Ok(affected)
    })
}

/// Counts cached entries.
pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM geocode_cache", [], |r| r.get(0))?;
        Ok(count.max(0) as u64)
    })
}
