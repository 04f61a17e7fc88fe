// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::domain::config::{LogFormat, LoggingConfig};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Returns `Ok(false)` when a
/// global subscriber was already installed, so repeated calls are harmless.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<bool> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };

    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        let config = LoggingConfig::default();
        init_tracing(&config).unwrap();

        // Whoever installed first, a second call must not install again.
        assert!(!init_tracing(&config).unwrap());
    }
}
