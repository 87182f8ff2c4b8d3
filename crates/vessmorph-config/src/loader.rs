// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Values are layered in this order, later layers winning:
//! 1. `vessmorph.toml` (every key optional, serde defaults fill the rest)
//! 2. `VESSMORPH_<KEY>` environment variables
//! 3. `key=value` pairs supplied by the host, usually from the command line
//!
//! Layers 2 and 3 share one flat key space, see [`OVERRIDE_KEYS`].

use crate::{
    ConfigError, ConfigResult, LogOutputFormat, MeanDenominator, ResamplingMode, TableFormat,
    VessmorphConfig,
};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "vessmorph.toml";
const CONFIG_PATH_VAR: &str = "VESSMORPH_CONFIG_PATH";
const ENV_PREFIX: &str = "VESSMORPH_";

/// Parent directories searched above the working directory
const PARENT_SEARCH_DEPTH: usize = 5;

/// Flat override keys accepted by [`apply_override`]
pub const OVERRIDE_KEYS: &[&str] = &[
    "center_at_origin",
    "remove_doubles",
    "doubles_tolerance",
    "zero_radius_threshold",
    "zero_length_threshold",
    "mean_denominator",
    "resampling_mode",
    "resampling_step",
    "vmv_precision",
    "table_format",
    "log_level",
    "log_format",
];

/// Find the vessmorph configuration file
///
/// `VESSMORPH_CONFIG_PATH` wins when set and must point at an existing file.
/// Otherwise `vessmorph.toml` is looked up in the working directory and
/// its parents.
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Some(explicit) = env::var_os(CONFIG_PATH_VAR) {
        let path = PathBuf::from(explicit);
        return if path.is_file() {
            Ok(path)
        } else {
            Err(ConfigError::EnvPathMissing(path))
        };
    }

    let searched: Vec<PathBuf> = env::current_dir()
        .map(|cwd| {
            cwd.ancestors()
                .take(PARENT_SEARCH_DEPTH + 1)
                .map(|dir| dir.join(CONFIG_FILE_NAME))
                .collect()
        })
        .unwrap_or_default();

    match searched.iter().find(|candidate| candidate.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(ConfigError::FileNotFound { searched }),
    }
}

/// Load configuration from TOML file, then apply environment and CLI overrides
///
/// Without `config_path` the file is located with [`find_config_file`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<VessmorphConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file).map_err(|source| ConfigError::Read {
        path: config_file.clone(),
        source,
    })?;
    let mut config: VessmorphConfig =
        toml::from_str(&content).map_err(|err| ConfigError::Parse {
            path: config_file,
            reason: err.to_string(),
        })?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_mean_denominator(value: &str) -> Option<MeanDenominator> {
    match value.to_lowercase().replace('-', "_").as_str() {
        "per_sample" => Some(MeanDenominator::PerSample),
        "per_segment" => Some(MeanDenominator::PerSegment),
        _ => None,
    }
}

fn parse_table_format(value: &str) -> Option<TableFormat> {
    match value.to_lowercase().as_str() {
        "csv" => Some(TableFormat::Csv),
        "json" => Some(TableFormat::Json),
        _ => None,
    }
}

fn parse_log_format(value: &str) -> Option<LogOutputFormat> {
    match value.to_lowercase().as_str() {
        "text" => Some(LogOutputFormat::Text),
        "json" => Some(LogOutputFormat::Json),
        _ => None,
    }
}

/// Set one field from a flat `key=value` override
///
/// Returns `false` when the key is unknown or the value does not parse; the
/// configuration is left untouched in that case.
pub fn apply_override(config: &mut VessmorphConfig, key: &str, value: &str) -> bool {
    fn set<T>(slot: &mut T, parsed: Option<T>) -> bool {
        parsed.map(|v| *slot = v).is_some()
    }

    let value = value.trim();
    match key {
        "center_at_origin" => set(&mut config.loading.center_at_origin, parse_flag(value)),
        "remove_doubles" => set(&mut config.loading.remove_doubles, parse_flag(value)),
        "doubles_tolerance" => set(&mut config.loading.doubles_tolerance, value.parse().ok()),
        "zero_radius_threshold" => {
            set(&mut config.analysis.zero_radius_threshold, value.parse().ok())
        }
        "zero_length_threshold" => {
            set(&mut config.analysis.zero_length_threshold, value.parse().ok())
        }
        "mean_denominator" => set(
            &mut config.analysis.mean_denominator,
            parse_mean_denominator(value),
        ),
        "resampling_mode" => set(&mut config.resampling.mode, value.parse::<ResamplingMode>().ok()),
        "resampling_step" => set(&mut config.resampling.step, value.parse().ok()),
        "vmv_precision" => set(&mut config.output.vmv_precision, value.parse().ok()),
        "table_format" => set(&mut config.output.table_format, parse_table_format(value)),
        "log_level" => set(&mut config.logging.level, Some(value.to_string())),
        "log_format" => set(&mut config.logging.format, parse_log_format(value)),
        _ => false,
    }
}

/// Apply `VESSMORPH_<KEY>` environment variables
///
/// Every entry of [`OVERRIDE_KEYS`] is read upper-cased, e.g.
/// `VESSMORPH_RESAMPLING_MODE=adaptive`. Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut VessmorphConfig) {
    for key in OVERRIDE_KEYS {
        let variable = format!("{}{}", ENV_PREFIX, key.to_uppercase());
        if let Ok(value) = env::var(&variable) {
            apply_override(config, key, &value);
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// Keys are those of [`OVERRIDE_KEYS`] (e.g. `{"resampling_mode": "adaptive"}`).
/// Unknown keys and unparsable values are ignored.
pub fn apply_cli_overrides(config: &mut VessmorphConfig, cli_args: &HashMap<String, String>) {
    for (key, value) in cli_args {
        apply_override(config, key, value);
    }
}
