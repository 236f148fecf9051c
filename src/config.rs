use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};

pub const CAPACITY_HINT_VAR: &str = "OSM_CAPACITY_HINT";
pub const LOG_LEVEL_VAR: &str = "OSM_LOG_LEVEL";
pub const LOG_FORMAT_VAR: &str = "OSM_LOG_FORMAT";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 3] = ["compact", "pretty", "json"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Number of entries to preallocate. Zero means default allocation.
    pub capacity_hint: usize,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "compact", "pretty" or "json"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl MapConfig {
    /// Build a configuration from the process environment, falling back to
    /// defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`MapConfig::from_env`] with a caller-provided variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = MapConfig::default();

        if let Some(raw) = lookup(CAPACITY_HINT_VAR) {
            config.capacity_hint = raw.trim().parse::<usize>()?;
        }

        if let Some(level) = lookup(LOG_LEVEL_VAR) {
            config.logging.level = level.trim().to_lowercase();
        }

        if let Some(format) = lookup(LOG_FORMAT_VAR) {
            config.logging.format = format.trim().to_lowercase();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.logging.validate()
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.level.as_str()) {
            return Err(MapError::ConfigError(format!(
                "Unknown log level '{}', expected one of {:?}",
                self.level, LOG_LEVELS
            )));
        }

        if !LOG_FORMATS.contains(&self.format.as_str()) {
            return Err(MapError::ConfigError(format!(
                "Unknown log format '{}', expected one of {:?}",
                self.format, LOG_FORMATS
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = MapConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, MapConfig::default());
        assert_eq!(config.capacity_hint, 0);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "compact");
    }

    #[test]
    fn test_reads_all_variables() {
        let config = MapConfig::from_lookup(lookup_from(&[
            (CAPACITY_HINT_VAR, " 128 "),
            (LOG_LEVEL_VAR, "DEBUG"),
            (LOG_FORMAT_VAR, "json"),
        ]))
        .unwrap();

        assert_eq!(config.capacity_hint, 128);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_rejects_bad_capacity() {
        let err = MapConfig::from_lookup(lookup_from(&[(CAPACITY_HINT_VAR, "-1")])).unwrap_err();
        assert!(matches!(err, MapError::ConfigError(_)));
    }

    #[test]
    fn test_rejects_unknown_level_and_format() {
        let err = MapConfig::from_lookup(lookup_from(&[(LOG_LEVEL_VAR, "loud")])).unwrap_err();
        assert!(err.to_string().contains("loud"));

        let err = MapConfig::from_lookup(lookup_from(&[(LOG_FORMAT_VAR, "xml")])).unwrap_err();
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: MapConfig = serde_json::from_str(r#"{"capacity_hint": 16}"#).unwrap();
        assert_eq!(config.capacity_hint, 16);
        assert_eq!(config.logging, LoggingConfig::default());
    }
}
