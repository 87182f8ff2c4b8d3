// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for vessmorph hosts
//!
//! Installs a console subscriber writing to stderr, so tool output on stdout
//! stays machine-readable.

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

/// Builds the `EnvFilter` for `config` and `debug_flags`.
///
/// # Errors
/// Fails if the configured level is not a valid filter directive.
pub fn build_filter(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<EnvFilter> {
    let filter = debug_flags.to_filter_string(&config.level.to_lowercase());
    EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter '{}'", filter))
}

/// Initialize the global subscriber
///
/// # Errors
/// Fails if the filter is invalid or a global subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<()> {
    let env_filter = build_filter(debug_flags, config)?;
    let directives = env_filter.to_string();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(config.with_target)
        .with_file(false)
        .with_line_number(false);

    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow!("Failed to install logging subscriber: {}", e))?;

    tracing::debug!(filter = %directives, format = ?config.format, "logging initialized");
    Ok(())
}

/// Initialize logging with default settings
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<()> {
    init_logging(debug_flags, &LoggingConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_levels() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-vessmorph-io".to_string()]);
        let config = LoggingConfig {
            level: "WARN".to_string(),
            ..LoggingConfig::default()
        };
        assert!(build_filter(&flags, &config).is_ok());
    }

    #[test]
    fn test_build_filter_rejects_garbage() {
        let config = LoggingConfig {
            level: "vessmorph-io=notalevel".to_string(),
            ..LoggingConfig::default()
        };
        assert!(build_filter(&CrateDebugFlags::default(), &config).is_err());
    }

    #[test]
    fn test_second_init_fails_cleanly() {
        let flags = CrateDebugFlags::default();
        let first = init_logging_default(&flags);
        let second = init_logging_default(&flags);
        // Whichever call lost the race reports an error instead of panicking.
        assert!(first.is_err() || second.is_err());
    }
}
