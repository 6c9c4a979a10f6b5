use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("Travel estimate error: {0}")]
    Travel(#[from] TravelError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read data file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON data: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse YAML data: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Unsupported data file extension: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid {kind} '{id}': {reason}")]
    InvalidRecord {
        kind: &'static str,
        id: String,
        reason: String,
    },

    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
}

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    Request(String),

    #[error("Geocoding service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse geocoding response: {0}")]
    Parse(String),

    #[error("Geocoding timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl GeocodeError {
    /// Whether a retry has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            GeocodeError::Request(_) | GeocodeError::Timeout(_) => true,
            GeocodeError::Status { status, .. } => *status == 429 || *status >= 500,
            GeocodeError::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        GeocodeError::Request(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum TravelError {
    #[error("Travel estimate request failed: {0}")]
    Request(String),

    #[error("No route between points: {0}")]
    NoRoute(String),

    #[error("Travel estimate timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl TravelError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TravelError::Request(_) | TravelError::Timeout(_))
    }
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache backend failed: {0}")]
    Backend(String),

    #[error("Corrupt cache entry for '{key}': {reason}")]
    CorruptEntry { key: String, reason: String },
}

impl From<crate::db::DatabaseError> for CacheError {
    fn from(err: crate::db::DatabaseError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
