// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Segment surface areas: frustum lateral area plus both caps.

use crate::frame::DataFrame;
use crate::frustum::{analyze_quantity, Quantity, SegmentQuantitySummary};
use crate::options::AnalysisOptions;
use crate::summary::UNIT_AREA;
use serde::Serialize;
use vessmorph_structures::geometry::math::frustum_surface_area;
use vessmorph_structures::{Morphology, MorphologyResult, TaskControl};

pub const SEGMENT_SURFACE_AREA_COLUMNS: [&str; 4] =
    ["x_center", "y_center", "z_center", "segment_surface_area"];

pub const SECTION_SURFACE_AREA_COLUMNS: [&str; 6] = [
    "section_index",
    "section_surface_area",
    "min_segment_surface_area",
    "mean_segment_surface_area",
    "max_segment_surface_area",
    "segment_surface_area_ratio",
];

const SURFACE_AREA: Quantity = Quantity {
    group: "surface_area",
    noun: "surface area",
    stem: "surface_area",
    unit: UNIT_AREA,
    segment_columns: &SEGMENT_SURFACE_AREA_COLUMNS,
    section_columns: &SECTION_SURFACE_AREA_COLUMNS,
    formula: frustum_surface_area,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceAreaAnalysis {
    pub segments: DataFrame,
    pub sections: DataFrame,
    pub summary: SegmentQuantitySummary,
}

/// Surface area tables and summary.
///
/// # Errors
/// [`MorphologyError::Numeric`](vessmorph_structures::MorphologyError::Numeric)
/// when a radius or position is not finite.
pub fn analyze_surface_area(
    morphology: &Morphology,
    options: &AnalysisOptions,
    control: &TaskControl,
) -> MorphologyResult<SurfaceAreaAnalysis> {
    let tables = analyze_quantity(morphology, options, control, &SURFACE_AREA)?;
    Ok(SurfaceAreaAnalysis {
        segments: tables.segments,
        sections: tables.sections,
        summary: tables.summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{line_morphology, single_section, y_branch};
    use std::f64::consts::PI;

    #[test]
    fn test_cylinder_segment() {
        // Unit radius, unit length: lateral 2π plus two caps of π.
        let morphology = single_section(&[(0.0, 0.0, 0.0, 1.0), (1.0, 0.0, 0.0, 1.0)]);
        let analysis =
            analyze_surface_area(&morphology, &AnalysisOptions::default(), &TaskControl::none())
                .unwrap();
        let area = analysis.segments.column("segment_surface_area").unwrap()[0];
        assert!((area - 4.0 * PI).abs() < 1e-12);
        assert_eq!(analysis.summary.total, area);
        assert_eq!(analysis.sections.column("segment_surface_area_ratio"), Some(vec![1.0]));
        // Per-sample mean: one segment over two samples.
        assert_eq!(
            analysis.sections.column("mean_segment_surface_area"),
            Some(vec![area / 2.0])
        );
    }

    #[test]
    fn test_summary_sums_sections() {
        let analysis =
            analyze_surface_area(&y_branch(), &AnalysisOptions::default(), &TaskControl::none())
                .unwrap();
        let sections: f64 = analysis.sections.column("section_surface_area").unwrap().iter().sum();
        assert!((analysis.summary.total - sections).abs() < 1e-9);
        assert_eq!(analysis.segments.number_rows(), 4);
        assert_eq!(analysis.summary.segment_ratio, 1.0);
        let keys: Vec<String> = analysis.summary.summary_items().into_iter().map(|i| i.key).collect();
        assert!(keys.contains(&"total_surface_area".to_string()));
        assert!(keys.contains(&"zero_surface_area_segments".to_string()));
    }

    #[test]
    fn test_nan_radius() {
        let err = analyze_surface_area(
            &line_morphology(&[1.0, f32::NAN]),
            &AnalysisOptions::default(),
            &TaskControl::none(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "numeric");
    }
}
