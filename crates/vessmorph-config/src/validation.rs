// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks that thresholds and tolerances are usable numbers and that the
//! resampling and output settings are consistent. Every problem is collected
//! and reported together.

use crate::{ConfigError, ConfigResult, ResamplingMode, VessmorphConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const MAX_VMV_PRECISION: usize = 6;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    NotFinite { field: String },
    Negative { field: String, value: f64 },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFinite { field } => write!(f, "{} must be a finite number", field),
            Self::Negative { field, value } => {
                write!(f, "{} = {} must not be negative", field, value)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Finite, non-negative tolerances and thresholds
/// - A positive step when fixed-step resampling is selected
/// - VMV precision of at most six digits
/// - A known log level
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &VessmorphConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);
    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "{} problem(s)\n{}",
            errors.len(),
            error_messages
        )));
    }
    Ok(())
}

/// Every validation problem of `config`, in section order.
pub fn collect_errors(config: &VessmorphConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_thresholds(config, &mut errors);
    validate_resampling(config, &mut errors);
    validate_output(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn check_non_negative(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !value.is_finite() {
        errors.push(ConfigValidationError::NotFinite {
            field: field.to_string(),
        });
    } else if value < 0.0 {
        errors.push(ConfigValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }
}

fn validate_thresholds(config: &VessmorphConfig, errors: &mut Vec<ConfigValidationError>) {
    check_non_negative(
        "loading.doubles_tolerance",
        config.loading.doubles_tolerance as f64,
        errors,
    );
    check_non_negative(
        "analysis.zero_radius_threshold",
        config.analysis.zero_radius_threshold,
        errors,
    );
    check_non_negative(
        "analysis.zero_length_threshold",
        config.analysis.zero_length_threshold,
        errors,
    );
    check_non_negative("analysis.ratio_epsilon", config.analysis.ratio_epsilon, errors);
}

fn validate_resampling(config: &VessmorphConfig, errors: &mut Vec<ConfigValidationError>) {
    let step = config.resampling.step;
    if config.resampling.mode == ResamplingMode::FixedStep && !(step.is_finite() && step > 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "resampling.step".to_string(),
            reason: format!("fixed-step resampling needs a positive step, got {}", step),
        });
    }
}

fn validate_output(config: &VessmorphConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.output.vmv_precision > MAX_VMV_PRECISION {
        errors.push(ConfigValidationError::InvalidValue {
            field: "output.vmv_precision".to_string(),
            reason: format!(
                "{} digits requested, at most {} supported",
                config.output.vmv_precision, MAX_VMV_PRECISION
            ),
        });
    }
}

fn validate_logging(config: &VessmorphConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("'{}' is not one of {}", config.logging.level, LOG_LEVELS.join("/")),
        });
    }
}
