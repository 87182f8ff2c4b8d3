// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! # vessmorph-observability
//!
//! Logging setup for programs hosting the vessmorph libraries.
//!
//! The library crates only emit `tracing` events (each under its own crate
//! name as target). A host decides whether anything is printed by calling
//! [`init_logging`] once, usually with flags from [`parse_debug_flags`].

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known vessmorph crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "vessmorph-structures",
    "vessmorph-io",
    "vessmorph-analysis",
    "morphology_report",
];
