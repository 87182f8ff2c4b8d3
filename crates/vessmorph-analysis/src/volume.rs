// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Segment volumes of truncated cones.

use crate::frame::DataFrame;
use crate::frustum::{analyze_quantity, Quantity, SegmentQuantitySummary};
use crate::options::AnalysisOptions;
use crate::summary::UNIT_VOLUME;
use serde::Serialize;
use vessmorph_structures::geometry::math::frustum_volume;
use vessmorph_structures::{Morphology, MorphologyResult, TaskControl};

pub const SEGMENT_VOLUME_COLUMNS: [&str; 4] = ["x_center", "y_center", "z_center", "segment_volume"];

pub const SECTION_VOLUME_COLUMNS: [&str; 6] = [
    "section_index",
    "section_volume",
    "min_segment_volume",
    "mean_segment_volume",
    "max_segment_volume",
    "segment_volume_ratio",
];

const VOLUME: Quantity = Quantity {
    group: "volume",
    noun: "volume",
    stem: "volume",
    unit: UNIT_VOLUME,
    segment_columns: &SEGMENT_VOLUME_COLUMNS,
    section_columns: &SECTION_VOLUME_COLUMNS,
    formula: frustum_volume,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeAnalysis {
    pub segments: DataFrame,
    pub sections: DataFrame,
    pub summary: SegmentQuantitySummary,
}

/// Volume tables and summary; `summary.total` is the morphology volume.
pub fn analyze_volume(
    morphology: &Morphology,
    options: &AnalysisOptions,
    control: &TaskControl,
) -> MorphologyResult<VolumeAnalysis> {
    let tables = analyze_quantity(morphology, options, control, &VOLUME)?;
    Ok(VolumeAnalysis {
        segments: tables.segments,
        sections: tables.sections,
        summary: tables.summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::MeanDenominator;
    use crate::test_support::single_section;
    use std::f64::consts::PI;

    #[test]
    fn test_cone_and_cylinder() {
        let morphology = single_section(&[
            (0.0, 0.0, 0.0, 1.0),
            (2.0, 0.0, 0.0, 1.0),
            (5.0, 0.0, 0.0, 0.0),
        ]);
        let options = AnalysisOptions {
            mean_denominator: MeanDenominator::PerSegment,
            ..AnalysisOptions::default()
        };
        let analysis = analyze_volume(&morphology, &options, &TaskControl::none()).unwrap();
        let volumes = analysis.segments.column("segment_volume").unwrap();
        // Cylinder of length 2, then a cone of length 3.
        assert!((volumes[0] - 2.0 * PI).abs() < 1e-12);
        assert!((volumes[1] - PI).abs() < 1e-12);
        assert!((analysis.summary.total - 3.0 * PI).abs() < 1e-12);
        let mean = analysis.sections.column("mean_segment_volume").unwrap()[0];
        assert!((mean - 1.5 * PI).abs() < 1e-12);
        assert!((analysis.summary.segment_factor - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample_section_is_zero() {
        let morphology = single_section(&[(0.0, 0.0, 0.0, 1.0)]);
        let analysis =
            analyze_volume(&morphology, &AnalysisOptions::default(), &TaskControl::none()).unwrap();
        assert_eq!(analysis.summary.total, 0.0);
        assert!(analysis.segments.is_empty());
        let row: Vec<f64> = analysis.sections.rows()[0].iter().map(|c| c.as_f64()).collect();
        assert_eq!(row, vec![0.0; 6]);
    }
}
