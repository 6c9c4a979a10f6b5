use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub travel: TravelConfig,
    #[serde(default)]
    pub calls: CallConfig,
    #[serde(default)]
    pub planning: PlanningConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            geocoding: GeocodingConfig::default(),
            cache: CacheConfig::default(),
            travel: TravelConfig::default(),
            calls: CallConfig::default(),
            planning: PlanningConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Geocoding service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of a Nominatim-compatible service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sent as the `User-Agent` header; public Nominatim requires one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// ISO 3166-1 alpha-2 codes restricting results (e.g. `["au"]`).
    #[serde(default)]
    pub country_codes: Vec<String>,
}

fn default_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("dispatchplan/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            country_codes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    #[default]
    Memory,
    Sqlite,
}

/// Geocode cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub kind: CacheKind,
    /// SQLite file; defaults to `~/.dispatchplan/data/geocode.db`.
    #[serde(default)]
    pub path: Option<String>,
    /// Entries older than this are re-geocoded. `0` keeps entries forever.
    #[serde(default = "default_ttl_days")]
    pub ttl_days: u32,
    /// Capacity of the in-memory cache.
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

fn default_ttl_days() -> u32 {
    90
}

fn default_max_entries() -> u64 {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            kind: CacheKind::default(),
            path: None,
            ttl_days: default_ttl_days(),
            max_entries: default_max_entries(),
        }
    }
}

/// Parameters of the offline straight-line travel estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelConfig {
    /// Multiplier from great-circle to road distance.
    #[serde(default = "default_road_factor")]
    pub road_factor: f64,
    #[serde(default = "default_average_speed")]
    pub average_speed_kmh: f64,
}

fn default_road_factor() -> f64 {
    1.3
}

fn default_average_speed() -> f64 {
    40.0
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            road_factor: default_road_factor(),
            average_speed_kmh: default_average_speed(),
        }
    }
}

/// Timeout and retry policy for collaborator calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_base_delay_ms() -> u64 {
    250
}

fn default_max_delay_ms() -> u64 {
    4_000
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfig {
    #[serde(default)]
    pub week_start: WeekStart,
    /// Label for the first leg when the employee has none.
    #[serde(default = "default_origin_label")]
    pub origin_label: String,
}

fn default_origin_label() -> String {
    "Current location".to_string()
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            week_start: WeekStart::default(),
            origin_label: default_origin_label(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
