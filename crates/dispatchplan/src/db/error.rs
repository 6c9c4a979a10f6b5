use std::path::PathBuf;
use thiserror::Error;

/// Failures of the on-disk geocode cache store.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Geocode store query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The directory that should hold the cache file could not be created.
    #[error("Cannot create geocode store directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A schema upgrade was rolled back; the store stays at the previous version.
    #[error("Geocode store upgrade to v{version} ({description}) failed: {source}")]
    Migration {
        version: u32,
        description: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Geocode store connection poisoned by a panicking writer")]
    LockPoisoned,
}
