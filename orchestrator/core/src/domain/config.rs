// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0

// Runtime Configuration
//
// YAML-backed configuration for a cogmesh host:
// - Orchestrator worker tuning (poll interval, event buffer)
// - AtomSpace name index policy
// - Logging level and format
//
// Example:
//
//   orchestrator:
//     poll_interval: 10ms
//     event_capacity: 1000
//   atomspace:
//     name_index_policy: last_write_wins
//   logging:
//     level: info
//     format: compact

use cogmesh_atomspace::AtomStoreConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CogmeshConfig {
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub atomspace: AtomStoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Sleep between worker loop iterations. Bounds dispatch latency.
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,

    /// Events buffered per subscriber before the oldest are dropped
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl OrchestratorConfig {
    /// Replace values the worker cannot run with (a zero poll interval would
    /// spin, a zero event capacity cannot back a channel) by their defaults.
    pub fn normalized(mut self) -> Self {
        if self.poll_interval.is_zero() {
            tracing::warn!(
                "orchestrator.poll_interval is zero; using {:?}",
                default_poll_interval()
            );
            self.poll_interval = default_poll_interval();
        }

        if self.event_capacity == 0 {
            tracing::warn!(
                "orchestrator.event_capacity is zero; using {}",
                default_event_capacity()
            );
            self.event_capacity = default_event_capacity();
        }

        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval.is_zero() {
            anyhow::bail!("orchestrator.poll_interval must be greater than zero");
        }

        if self.event_capacity == 0 {
            anyhow::bail!("orchestrator.event_capacity must be greater than zero");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(10)
}

fn default_event_capacity() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl CogmeshConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config at {:?}: {}", path, e))?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides (`COGMESH_LOG_LEVEL`,
    /// `COGMESH_POLL_INTERVAL`).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("COGMESH_LOG_LEVEL") {
            tracing::info!("Environment override: COGMESH_LOG_LEVEL={}", level);
            self.logging.level = level;
        }

        if let Ok(val) = std::env::var("COGMESH_POLL_INTERVAL") {
            match humantime::parse_duration(&val) {
                Ok(interval) if !interval.is_zero() => {
                    tracing::info!("Environment override: COGMESH_POLL_INTERVAL={}", val);
                    self.orchestrator.poll_interval = interval;
                }
                _ => {
                    tracing::warn!(
                        "Invalid value for COGMESH_POLL_INTERVAL: '{}'. Expected a non-zero duration like '10ms'. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.orchestrator.validate()?;

        if self.logging.level.trim().is_empty() {
            anyhow::bail!("logging.level cannot be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogmesh_atomspace::NameIndexPolicy;

    #[test]
    fn test_defaults() {
        let config = CogmeshConfig::default();
        assert_eq!(config.orchestrator.poll_interval, Duration::from_millis(10));
        assert_eq!(config.orchestrator.event_capacity, 1000);
        assert_eq!(config.atomspace.name_index_policy, NameIndexPolicy::LastWriteWins);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_document() {
        let yaml = r#"
orchestrator:
  poll_interval: 25ms
  event_capacity: 64
atomspace:
  name_index_policy: first_write_wins
logging:
  level: debug
  format: json
"#;
        let config = CogmeshConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.orchestrator.poll_interval, Duration::from_millis(25));
        assert_eq!(config.orchestrator.event_capacity, 64);
        assert_eq!(config.atomspace.name_index_policy, NameIndexPolicy::FirstWriteWins);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config = CogmeshConfig::from_yaml_str("orchestrator:\n  event_capacity: 8\n").unwrap();
        assert_eq!(config.orchestrator.poll_interval, Duration::from_millis(10));
        assert_eq!(config.orchestrator.event_capacity, 8);
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let err = CogmeshConfig::from_yaml_str("orchestrator:\n  poll_interval: 0s\n").unwrap_err();
        assert!(err.to_string().contains("poll_interval"));
    }

    #[test]
    fn test_normalized_replaces_zero_values() {
        let config = OrchestratorConfig {
            poll_interval: Duration::ZERO,
            event_capacity: 0,
        };
        assert!(config.validate().is_err());

        let config = config.normalized();
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.event_capacity, 1000);
        assert!(config.validate().is_ok());

        let custom = OrchestratorConfig {
            poll_interval: Duration::from_millis(3),
            event_capacity: 7,
        }
        .normalized();
        assert_eq!(custom.poll_interval, Duration::from_millis(3));
        assert_eq!(custom.event_capacity, 7);
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cogmesh.yaml");
        std::fs::write(&path, "logging:\n  level: warn\n").unwrap();

        let config = CogmeshConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.logging.level, "warn");

        assert!(CogmeshConfig::from_yaml_file(dir.path().join("missing.yaml")).is_err());
    }
}
