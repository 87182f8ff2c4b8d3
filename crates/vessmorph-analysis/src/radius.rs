// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Sample and section radius statistics.
//!
//! Zero-radius samples (below the configured threshold) are kept in every
//! minimum and count, but the smallest non-zero radius and the global ratio
//! ignore them.

use crate::frame::{Cell, DataFrame};
use crate::options::AnalysisOptions;
use crate::stats::{RunningStats, SmallestAbove};
use crate::summary::{SummaryItem, UNIT_LENGTH, UNIT_NONE};
use serde::Serialize;
use tracing::debug;
use vessmorph_structures::{Morphology, MorphologyError, MorphologyResult, Sample, TaskControl};

pub const SAMPLE_RADIUS_COLUMNS: [&str; 4] = ["radius", "x", "y", "z"];

pub const SECTION_RADIUS_COLUMNS: [&str; 8] = [
    "section_index",
    "min_radius",
    "mean_radius",
    "max_radius",
    "radius_ratio",
    "center_x",
    "center_y",
    "center_z",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadiusSummary {
    pub min_radius: f64,
    pub max_radius: f64,
    pub mean_radius: f64,
    pub smallest_non_zero_radius: f64,
    /// Smallest non-zero radius over the largest radius
    pub radius_ratio: f64,
    /// Inverse of `radius_ratio`
    pub radius_factor: f64,
    pub number_samples_with_zero_radius: usize,
}

impl RadiusSummary {
    pub fn summary_items(&self) -> Vec<SummaryItem> {
        const GROUP: &str = "radius";
        vec![
            SummaryItem::new(GROUP, "min_radius", "Minimum sample radius", self.min_radius, UNIT_LENGTH),
            SummaryItem::new(GROUP, "max_radius", "Maximum sample radius", self.max_radius, UNIT_LENGTH),
            SummaryItem::new(GROUP, "mean_radius", "Mean sample radius", self.mean_radius, UNIT_LENGTH),
            SummaryItem::new(
                GROUP,
                "smallest_non_zero_radius",
                "Smallest non-zero radius",
                self.smallest_non_zero_radius,
                UNIT_LENGTH,
            ),
            SummaryItem::new(GROUP, "radius_ratio", "Radius ratio", self.radius_ratio, UNIT_NONE),
            SummaryItem::new(GROUP, "radius_factor", "Radius factor", self.radius_factor, UNIT_NONE),
            SummaryItem::count(
                GROUP,
                "number_samples_with_zero_radius",
                "Samples with zero radius",
                self.number_samples_with_zero_radius,
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadiusAnalysis {
    pub samples: DataFrame,
    pub sections: DataFrame,
    pub summary: RadiusSummary,
}

fn checked_radius(sample: &Sample) -> MorphologyResult<f64> {
    let radius = sample.radius as f64;
    if radius.is_finite() {
        Ok(radius)
    } else {
        Err(MorphologyError::numeric(format!(
            "sample {} has radius {}",
            sample.index, sample.radius
        )))
    }
}

/// Radius tables and summary.
///
/// The per-sample table lists every distinct sample once; section rows use
/// all samples of the section.
///
/// # Errors
/// [`MorphologyError::Numeric`] for a non-finite radius.
pub fn analyze_radii(
    morphology: &Morphology,
    options: &AnalysisOptions,
    control: &TaskControl,
) -> MorphologyResult<RadiusAnalysis> {
    let mut samples = DataFrame::new("radius_samples", &SAMPLE_RADIUS_COLUMNS);
    let mut global = RunningStats::default();
    let mut smallest = SmallestAbove::new(options.zero_radius_threshold);
    let mut zero_radius = 0;
    for sample in morphology.unique_samples() {
        let radius = checked_radius(sample)?;
        samples.push_row(vec![
            Cell::from(radius),
            Cell::from(sample.point.x),
            Cell::from(sample.point.y),
            Cell::from(sample.point.z),
        ])?;
        global.push(radius);
        if smallest.push(radius) {
            zero_radius += 1;
        }
    }

    let mut sections = DataFrame::new("radius_sections", &SECTION_RADIUS_COLUMNS);
    for section in morphology.sections() {
        control.checkpoint()?;
        let mut stats = RunningStats::default();
        for sample in &section.samples {
            stats.push(checked_radius(sample)?);
        }
        let center = section.center();
        let ratio = if stats.max() > 0.0 {
            options.ratio(stats.min(), stats.max())
        } else {
            0.0
        };
        sections.push_row(vec![
            Cell::from(section.index),
            Cell::from(stats.min()),
            Cell::from(stats.mean()),
            Cell::from(stats.max()),
            Cell::from(ratio),
            Cell::from(center.x),
            Cell::from(center.y),
            Cell::from(center.z),
        ])?;
    }

    let summary = RadiusSummary {
        min_radius: global.min(),
        max_radius: global.max(),
        mean_radius: global.mean(),
        smallest_non_zero_radius: smallest.get(),
        radius_ratio: options.ratio(smallest.get(), global.max()),
        radius_factor: options.ratio(global.max(), smallest.get()),
        number_samples_with_zero_radius: zero_radius,
    };
    debug!(
        target: "vessmorph-analysis",
        "Radii of '{}': {} samples, {} with zero radius",
        morphology.name(),
        global.count(),
        zero_radius
    );
    Ok(RadiusAnalysis {
        samples,
        sections,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{line_morphology, y_branch};

    #[test]
    fn test_zero_radius_sample() {
        let morphology = line_morphology(&[1.0, 0.0, 1.0, 1.0]);
        let analysis =
            analyze_radii(&morphology, &AnalysisOptions::default(), &TaskControl::none()).unwrap();
        let summary = &analysis.summary;
        assert_eq!(summary.number_samples_with_zero_radius, 1);
        assert_eq!(summary.smallest_non_zero_radius, 1.0);
        assert_eq!(summary.min_radius, 0.0);
        assert_eq!(summary.radius_ratio, 1.0);
        assert_eq!(analysis.sections.column("min_radius"), Some(vec![0.0]));
        assert_eq!(analysis.sections.column("radius_ratio"), Some(vec![0.0]));
        assert_eq!(analysis.sections.column("mean_radius"), Some(vec![0.75]));
    }

    #[test]
    fn test_all_zero_section_has_zero_ratio() {
        let morphology = line_morphology(&[0.0, 0.0]);
        let analysis =
            analyze_radii(&morphology, &AnalysisOptions::default(), &TaskControl::none()).unwrap();
        assert_eq!(analysis.sections.column("radius_ratio"), Some(vec![0.0]));
        assert_eq!(analysis.summary.radius_ratio, 0.0);
        assert_eq!(analysis.summary.radius_factor, 0.0);
        assert_eq!(analysis.summary.number_samples_with_zero_radius, 2);
    }

    #[test]
    fn test_tapering() {
        let morphology = line_morphology(&[1.0, 0.5]);
        let analysis =
            analyze_radii(&morphology, &AnalysisOptions::default(), &TaskControl::none()).unwrap();
        assert_eq!(analysis.sections.column("radius_ratio"), Some(vec![0.5]));
        assert_eq!(analysis.summary.radius_factor, 2.0);
    }

    #[test]
    fn test_branching_points_listed_once() {
        let analysis =
            analyze_radii(&y_branch(), &AnalysisOptions::default(), &TaskControl::none()).unwrap();
        assert_eq!(analysis.samples.number_rows(), 5);
        assert_eq!(analysis.sections.number_rows(), 3);
    }

    #[test]
    fn test_nan_radius_is_numeric_error() {
        let morphology = line_morphology(&[1.0, f32::NAN]);
        let err = analyze_radii(&morphology, &AnalysisOptions::default(), &TaskControl::none())
            .unwrap_err();
        assert_eq!(err.kind(), "numeric");
    }
}
