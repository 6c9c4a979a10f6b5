use std::path::Path;

use crate::config::schema::{Config, CONFIG_VERSION};
use crate::error::ConfigError;
use crate::geocode::MAX_TTL_DAYS;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

/// Semantic checks the schema cannot express.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    match reqwest::Url::parse(&config.geocoding.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => {
            return Err(ConfigError::Validation {
                message: format!("geocoding.base_url must be http(s), got '{}'", url.scheme()),
            });
        }
        Err(e) => {
            return Err(ConfigError::Validation {
                message: format!("Invalid geocoding.base_url: {}", e),
            });
        }
    }

    if !(config.travel.road_factor.is_finite() && config.travel.road_factor >= 1.0) {
        return Err(ConfigError::Validation {
            message: "travel.road_factor must be at least 1.0".to_string(),
        });
    }
    if !(config.travel.average_speed_kmh.is_finite() && config.travel.average_speed_kmh > 0.0) {
        return Err(ConfigError::Validation {
            message: "travel.average_speed_kmh must be positive".to_string(),
        });
    }

    if config.calls.timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "calls.timeout_secs must be positive".to_string(),
        });
    }
    if config.calls.base_delay_ms > config.calls.max_delay_ms {
        return Err(ConfigError::Validation {
            message: format!(
                "calls.base_delay_ms ({}) exceeds calls.max_delay_ms ({})",
                config.calls.base_delay_ms, config.calls.max_delay_ms
            ),
        });
    }

    if config.cache.max_entries == 0 {
        return Err(ConfigError::Validation {
            message: "cache.max_entries must be positive".to_string(),
        });
    }
    if config.cache.ttl_days > MAX_TTL_DAYS {
        return Err(ConfigError::Validation {
            message: format!(
                "cache.ttl_days ({}) exceeds the maximum of {}",
                config.cache.ttl_days, MAX_TTL_DAYS
            ),
        });
    }

    Ok(())
}
