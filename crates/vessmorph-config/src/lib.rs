// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! # vessmorph Configuration
//!
//! Type-safe configuration for the vessmorph loaders, processing passes and
//! analysis kernels, with support for:
//! - TOML file parsing (`vessmorph.toml`)
//! - Environment variable overrides (`VESSMORPH_*`)
//! - CLI argument overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vessmorph_config::{load_config, validate_config};
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! validate_config(&config).expect("Invalid config");
//!
//! println!("Zero radius threshold: {}", config.analysis.zero_radius_threshold);
//! ```
//!
//! The library crates never read the environment themselves; hosts load a
//! [`VessmorphConfig`] and hand the relevant section to the core.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{
    apply_cli_overrides, apply_environment_overrides, apply_override, find_config_file,
    load_config, OVERRIDE_KEYS,
};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

use std::path::PathBuf;

/// Errors raised while locating, reading or checking `vessmorph.toml`
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("VESSMORPH_CONFIG_PATH points at {}, which is not a file", .0.display())]
    EnvPathMissing(PathBuf),

    #[error("vessmorph.toml not found (searched {} locations)", .searched.len())]
    FileNotFound { searched: Vec<PathBuf> },

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
