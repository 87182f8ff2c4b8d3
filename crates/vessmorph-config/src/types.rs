// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `vessmorph.toml`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VessmorphConfig {
    pub loading: LoadingConfig,
    pub analysis: AnalysisConfig,
    pub resampling: ResamplingConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Post-load passes applied by every loader
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Move the recorded origin (or the bounding-box center) to (0, 0, 0)
    pub center_at_origin: bool,
    pub remove_doubles: bool,
    /// Distance below which consecutive samples count as duplicates
    pub doubles_tolerance: f32,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            center_at_origin: false,
            remove_doubles: false,
            doubles_tolerance: 1e-5,
        }
    }
}

/// Denominator used for "segment mean X per section" quantities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeanDenominator {
    /// Divide by the number of samples, matching historical reports
    #[default]
    PerSample,
    /// Divide by the number of segments
    PerSegment,
}

/// Numeric thresholds for the analysis kernels
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub zero_radius_threshold: f64,
    pub zero_length_threshold: f64,
    pub ratio_epsilon: f64,
    pub mean_denominator: MeanDenominator,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            zero_radius_threshold: 1e-3,
            zero_length_threshold: 1e-5,
            ratio_epsilon: 1e-32,
            mean_denominator: MeanDenominator::PerSample,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplingMode {
    #[default]
    None,
    Adaptive,
    FixedStep,
}

impl Display for ResamplingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResamplingMode::None => "none",
            ResamplingMode::Adaptive => "adaptive",
            ResamplingMode::FixedStep => "fixed_step",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ResamplingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(ResamplingMode::None),
            "adaptive" => Ok(ResamplingMode::Adaptive),
            "fixed_step" | "fixed-step" => Ok(ResamplingMode::FixedStep),
            other => Err(format!("unknown resampling mode '{}'", other)),
        }
    }
}

/// Resampling pass run by hosts after loading
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResamplingConfig {
    pub mode: ResamplingMode,
    /// Maximum segment length for [`ResamplingMode::FixedStep`]
    pub step: f32,
}

impl Default for ResamplingConfig {
    fn default() -> Self {
        Self {
            mode: ResamplingMode::None,
            step: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    #[default]
    Csv,
    Json,
}

impl TableFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Json => "json",
        }
    }
}

/// Output formatting
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Decimal digits of VMV coordinates and radii
    pub vmv_precision: usize,
    pub table_format: TableFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            vmv_precision: 2,
            table_format: TableFormat::Csv,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOutputFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogOutputFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogOutputFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VessmorphConfig::default();
        assert!(!config.loading.center_at_origin);
        assert_eq!(config.loading.doubles_tolerance, 1e-5);
        assert_eq!(config.analysis.zero_radius_threshold, 1e-3);
        assert_eq!(config.analysis.mean_denominator, MeanDenominator::PerSample);
        assert_eq!(config.resampling.mode, ResamplingMode::None);
        assert_eq!(config.output.vmv_precision, 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: VessmorphConfig = toml::from_str(
            r#"
            [analysis]
            mean_denominator = "per_segment"

            [resampling]
            mode = "fixed_step"
            step = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis.mean_denominator, MeanDenominator::PerSegment);
        assert_eq!(config.analysis.ratio_epsilon, 1e-32);
        assert_eq!(config.resampling.mode, ResamplingMode::FixedStep);
        assert_eq!(config.resampling.step, 0.5);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_resampling_mode_from_str() {
        assert_eq!("Adaptive".parse::<ResamplingMode>(), Ok(ResamplingMode::Adaptive));
        assert_eq!("fixed-step".parse::<ResamplingMode>(), Ok(ResamplingMode::FixedStep));
        assert!("sometimes".parse::<ResamplingMode>().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = VessmorphConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: VessmorphConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
