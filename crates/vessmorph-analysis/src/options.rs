// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

use vessmorph_config::AnalysisConfig;
pub use vessmorph_config::MeanDenominator;
use vessmorph_structures::geometry::math::{safe_ratio_with, RATIO_EPSILON, ZERO_RADIUS_THRESHOLD};
use vessmorph_structures::Section;

/// Thresholds shared by every kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisOptions {
    /// Samples with a smaller radius count as zero-radius
    pub zero_radius_threshold: f64,
    /// Segments and sections shorter than this count as zero-length
    pub zero_length_threshold: f64,
    pub ratio_epsilon: f64,
    pub mean_denominator: MeanDenominator,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            zero_radius_threshold: ZERO_RADIUS_THRESHOLD,
            zero_length_threshold: 1e-5,
            ratio_epsilon: RATIO_EPSILON,
            mean_denominator: MeanDenominator::PerSample,
        }
    }
}

impl AnalysisOptions {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        AnalysisOptions {
            zero_radius_threshold: config.zero_radius_threshold,
            zero_length_threshold: config.zero_length_threshold,
            ratio_epsilon: config.ratio_epsilon,
            mean_denominator: config.mean_denominator,
        }
    }

    pub(crate) fn ratio(&self, numerator: f64, denominator: f64) -> f64 {
        safe_ratio_with(numerator, denominator, self.ratio_epsilon)
    }

    /// Per-section mean of a segment quantity summing to `total`.
    pub(crate) fn segment_mean(&self, total: f64, section: &Section) -> f64 {
        let denominator = match self.mean_denominator {
            MeanDenominator::PerSample => section.number_samples(),
            MeanDenominator::PerSegment => section.number_segments(),
        };
        if denominator == 0 {
            0.0
        } else {
            total / denominator as f64
        }
    }

    pub(crate) fn is_zero_length(&self, length: f64) -> bool {
        length < self.zero_length_threshold
    }
}
