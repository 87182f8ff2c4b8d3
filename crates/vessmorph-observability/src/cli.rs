// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Per-crate debug flags
//!
//! `--debug-vessmorph-io` (or `VESSMORPH_DEBUG=vessmorph-io`) raises one
//! crate's events to debug level while the rest stay at the configured level.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

const FLAG_PREFIX: &str = "--debug-";
const DEBUG_ENV_VAR: &str = "VESSMORPH_DEBUG";

/// Crates selected for debug output, by package name (`vessmorph-io`)
///
/// # Example
/// ```rust
/// use vessmorph_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-vessmorph-io".to_string()]);
/// assert!(flags.is_enabled("vessmorph-io"));
/// assert_eq!(flags.to_filter_string("warn"), "vessmorph-io=debug,warn");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Collect `--debug-<crate>` arguments; `--debug-all` selects every known crate.
    ///
    /// Other arguments are skipped, so the full `env::args()` can be passed.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for arg in args {
            if let Some(name) = arg.strip_prefix(FLAG_PREFIX) {
                flags.enable(name);
            }
        }
        flags
    }

    /// Adds the crates listed in a `VESSMORPH_DEBUG`-style value (`all` or a comma list).
    pub fn merge_env_value(&mut self, value: &str) {
        value.split(',').for_each(|name| self.enable(name));
    }

    fn enable(&mut self, name: &str) {
        match name.trim() {
            "" => {}
            "all" => self
                .enabled_crates
                .extend(KNOWN_CRATES.iter().map(|c| c.to_string())),
            name => {
                if !KNOWN_CRATES.contains(&name) {
                    // Still honoured: hosts may log under their own targets.
                    eprintln!("warning: debug flag for unknown crate '{}'", name);
                }
                self.enabled_crates.insert(name.to_string());
            }
        }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    /// `EnvFilter` directives, e.g. `"vessmorph-io=debug,info"`
    ///
    /// Library events carry their package name as explicit target.
    pub fn to_filter_string(&self, base_level: &str) -> String {
        self.enabled_crates
            .iter()
            .map(|name| format!("{}=debug", name))
            .chain(std::iter::once(base_level.to_string()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Debug flags from the process arguments plus `VESSMORPH_DEBUG`
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(value) = env::var(DEBUG_ENV_VAR) {
        flags.merge_env_value(&value);
    }
    flags
}

/// Help text listing the debug flags and known crates
pub fn debug_flags_help() -> String {
    let mut help = String::from("Debug Flags:\n");
    help.push_str("  --debug-all            debug output from every vessmorph crate\n");
    for name in KNOWN_CRATES {
        help.push_str(&format!("  --debug-{:<22} debug output from {}\n", name, name));
    }
    help.push_str(&format!(
        "\nEnvironment: {}=<crate>[,<crate>] or {}=all\n",
        DEBUG_ENV_VAR, DEBUG_ENV_VAR
    ));
    help
}
