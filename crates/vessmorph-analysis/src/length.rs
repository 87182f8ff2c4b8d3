// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Segment and section lengths.

use crate::frame::{Cell, DataFrame};
use crate::options::AnalysisOptions;
use crate::stats::{RunningStats, SmallestAbove};
use crate::summary::{SummaryItem, UNIT_LENGTH, UNIT_NONE};
use serde::Serialize;
use tracing::{debug, warn};
use vessmorph_structures::{Morphology, MorphologyError, MorphologyResult, Section, TaskControl};

pub const SECTION_LENGTH_COLUMNS: [&str; 11] = [
    "section_index",
    "x",
    "y",
    "z",
    "section_length",
    "seg_min_len",
    "seg_mean_len",
    "seg_max_len",
    "seg_length_ratio",
    "terminals_thickness_to_length_ratio",
    "sampling_density",
];

pub const SEGMENT_LENGTH_COLUMNS: [&str; 6] = [
    "section_index",
    "segment_index",
    "segment_length",
    "x_center",
    "y_center",
    "z_center",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthSummary {
    pub total_length: f64,
    pub min_segment_length: f64,
    pub max_segment_length: f64,
    pub mean_segment_length: f64,
    pub smallest_non_zero_segment_length: f64,
    pub zero_length_segments: usize,
    pub zero_length_sections: usize,
    pub min_section_length: f64,
    pub max_section_length: f64,
    pub mean_section_length: f64,
    /// Smallest non-zero segment length over the longest segment
    pub segment_length_ratio: f64,
    pub segment_length_factor: f64,
    pub short_sections: usize,
}

impl LengthSummary {
    pub fn summary_items(&self) -> Vec<SummaryItem> {
        const GROUP: &str = "length";
        vec![
            SummaryItem::new(GROUP, "total_length", "Total length", self.total_length, UNIT_LENGTH),
            SummaryItem::new(
                GROUP,
                "min_segment_length",
                "Minimum segment length",
                self.min_segment_length,
                UNIT_LENGTH,
            ),
            SummaryItem::new(
                GROUP,
                "max_segment_length",
                "Maximum segment length",
                self.max_segment_length,
                UNIT_LENGTH,
            ),
            SummaryItem::new(
                GROUP,
                "mean_segment_length",
                "Mean segment length",
                self.mean_segment_length,
                UNIT_LENGTH,
            ),
            SummaryItem::new(
                GROUP,
                "smallest_non_zero_segment_length",
                "Smallest non-zero segment length",
                self.smallest_non_zero_segment_length,
                UNIT_LENGTH,
            ),
            SummaryItem::count(
                GROUP,
                "zero_length_segments",
                "Zero-length segments",
                self.zero_length_segments,
            ),
            SummaryItem::count(
                GROUP,
                "zero_length_sections",
                "Zero-length sections",
                self.zero_length_sections,
            ),
            SummaryItem::new(
                GROUP,
                "min_section_length",
                "Minimum section length",
                self.min_section_length,
                UNIT_LENGTH,
            ),
            SummaryItem::new(
                GROUP,
                "max_section_length",
                "Maximum section length",
                self.max_section_length,
                UNIT_LENGTH,
            ),
            SummaryItem::new(
                GROUP,
                "mean_section_length",
                "Mean section length",
                self.mean_section_length,
                UNIT_LENGTH,
            ),
            SummaryItem::new(
                GROUP,
                "segment_length_ratio",
                "Segment length ratio",
                self.segment_length_ratio,
                UNIT_NONE,
            ),
            SummaryItem::new(
                GROUP,
                "segment_length_factor",
                "Segment length factor",
                self.segment_length_factor,
                UNIT_NONE,
            ),
            SummaryItem::count(GROUP, "short_sections", "Short sections", self.short_sections),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthAnalysis {
    pub sections: DataFrame,
    pub segments: DataFrame,
    pub summary: LengthSummary,
}

/// Segment lengths of `section`, failing on non-finite coordinates.
pub(crate) fn checked_segment_lengths(section: &Section) -> MorphologyResult<Vec<f64>> {
    let lengths = section.segment_lengths();
    if let Some(position) = lengths.iter().position(|l| !l.is_finite()) {
        return Err(MorphologyError::numeric(format!(
            "segment {} of section {} has a non-finite length",
            position, section.index
        )));
    }
    Ok(lengths)
}

/// Per-section and per-segment length tables and summary.
///
/// # Errors
/// [`MorphologyError::Numeric`] when a sample position is not finite.
pub fn analyze_lengths(
    morphology: &Morphology,
    options: &AnalysisOptions,
    control: &TaskControl,
) -> MorphologyResult<LengthAnalysis> {
    let mut sections = DataFrame::new("length_sections", &SECTION_LENGTH_COLUMNS);
    let mut segments = DataFrame::new("length_segments", &SEGMENT_LENGTH_COLUMNS);
    let mut all_segments = RunningStats::default();
    let mut all_sections = RunningStats::default();
    let mut smallest = SmallestAbove::new(options.zero_length_threshold);
    let mut zero_length_segments = 0;
    let mut zero_length_sections = 0;
    let mut short_sections = 0;

    for section in morphology.sections() {
        control.checkpoint()?;
        let lengths = checked_segment_lengths(section)?;
        let mut stats = RunningStats::default();
        for (segment, ((a, b), &length)) in section.segments().zip(&lengths).enumerate() {
            let center = a.point.midpoint(&b.point);
            segments.push_row(vec![
                Cell::from(section.index),
                Cell::from(segment),
                Cell::from(length),
                Cell::from(center.x),
                Cell::from(center.y),
                Cell::from(center.z),
            ])?;
            stats.push(length);
            all_segments.push(length);
            if smallest.push(length) {
                zero_length_segments += 1;
            }
        }

        let section_length = stats.sum();
        if options.is_zero_length(section_length) {
            zero_length_sections += 1;
        }
        if section.is_short() {
            short_sections += 1;
        }
        if section.number_samples() < 2 {
            warn!(
                target: "vessmorph-analysis",
                "Section {} has {} samples; its lengths are reported as zero",
                section.index,
                section.number_samples()
            );
        }
        all_sections.push(section_length);

        let center = section.center();
        let seg_ratio = if stats.max() > 0.0 {
            options.ratio(stats.min(), stats.max())
        } else {
            0.0
        };
        let (thickness_ratio, density) = if section_length > 0.0 {
            (
                section.terminal_radii_sum() / section_length,
                section.number_samples() as f64 / section_length,
            )
        } else {
            (0.0, 0.0)
        };
        sections.push_row(vec![
            Cell::from(section.index),
            Cell::from(center.x),
            Cell::from(center.y),
            Cell::from(center.z),
            Cell::from(section_length),
            Cell::from(stats.min()),
            Cell::from(options.segment_mean(section_length, section)),
            Cell::from(stats.max()),
            Cell::from(seg_ratio),
            Cell::from(thickness_ratio),
            Cell::from(density),
        ])?;
    }

    let summary = LengthSummary {
        total_length: all_sections.sum(),
        min_segment_length: all_segments.min(),
        max_segment_length: all_segments.max(),
        mean_segment_length: all_segments.mean(),
        smallest_non_zero_segment_length: smallest.get(),
        zero_length_segments,
        zero_length_sections,
        min_section_length: all_sections.min(),
        max_section_length: all_sections.max(),
        mean_section_length: all_sections.mean(),
        segment_length_ratio: options.ratio(smallest.get(), all_segments.max()),
        segment_length_factor: options.ratio(all_segments.max(), smallest.get()),
        short_sections,
    };
    debug!(
        target: "vessmorph-analysis",
        "Lengths of '{}': total {:.3}, {} zero-length segments",
        morphology.name(),
        summary.total_length,
        zero_length_segments
    );
    Ok(LengthAnalysis {
        sections,
        segments,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::MeanDenominator;
    use crate::test_support::{single_section, y_branch};

    #[test]
    fn test_y_branch_lengths() {
        let analysis =
            analyze_lengths(&y_branch(), &AnalysisOptions::default(), &TaskControl::none()).unwrap();
        assert_eq!(analysis.sections.column("section_length"), Some(vec![2.0, 1.0, 1.0]));
        assert_eq!(analysis.summary.total_length, 4.0);
        assert_eq!(analysis.summary.mean_section_length, 4.0 / 3.0);
        assert_eq!(analysis.summary.mean_segment_length, 1.0);
        assert_eq!(analysis.summary.segment_length_ratio, 1.0);
        assert_eq!(analysis.summary.short_sections, 3);
        assert_eq!(analysis.segments.number_rows(), 4);
        assert_eq!(analysis.segments.column("x_center"), Some(vec![0.5, 1.5, 2.0, 2.0]));

        // Root section: 3 samples over length 2, terminal radii 1 + 1.
        let root = &analysis.sections;
        assert_eq!(root.value(0, "sampling_density").map(|c| c.as_f64()), Some(1.5));
        assert_eq!(
            root.value(0, "terminals_thickness_to_length_ratio").map(|c| c.as_f64()),
            Some(1.0)
        );
        assert_eq!(root.value(0, "seg_mean_len").map(|c| c.as_f64()), Some(2.0 / 3.0));
    }

    #[test]
    fn test_mean_per_segment() {
        let options = AnalysisOptions {
            mean_denominator: MeanDenominator::PerSegment,
            ..AnalysisOptions::default()
        };
        let analysis = analyze_lengths(&y_branch(), &options, &TaskControl::none()).unwrap();
        assert_eq!(analysis.sections.value(0, "seg_mean_len").map(|c| c.as_f64()), Some(1.0));
    }

    #[test]
    fn test_uneven_segments() {
        let morphology = single_section(&[(0.0, 0.0, 0.0, 1.0), (1.0, 0.0, 0.0, 1.0), (1.0, 3.0, 0.0, 1.0)]);
        let analysis =
            analyze_lengths(&morphology, &AnalysisOptions::default(), &TaskControl::none()).unwrap();
        let sections = &analysis.sections;
        assert_eq!(sections.value(0, "seg_min_len").map(|c| c.as_f64()), Some(1.0));
        assert_eq!(sections.value(0, "seg_max_len").map(|c| c.as_f64()), Some(3.0));
        assert!((sections.value(0, "seg_length_ratio").unwrap().as_f64() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(analysis.summary.segment_length_factor, 3.0);
    }

    #[test]
    fn test_degenerate_sections() {
        let point = single_section(&[(1.0, 1.0, 1.0, 1.0)]);
        let analysis =
            analyze_lengths(&point, &AnalysisOptions::default(), &TaskControl::none()).unwrap();
        let row: Vec<f64> = analysis.sections.rows()[0].iter().skip(4).map(|c| c.as_f64()).collect();
        assert!(row.iter().all(|&v| v == 0.0));
        assert_eq!(analysis.summary.zero_length_sections, 1);
        assert!(analysis.segments.is_empty());

        let collapsed = single_section(&[(1.0, 1.0, 1.0, 1.0), (1.0, 1.0, 1.0, 1.0)]);
        let analysis =
            analyze_lengths(&collapsed, &AnalysisOptions::default(), &TaskControl::none()).unwrap();
        assert_eq!(analysis.summary.zero_length_segments, 1);
        assert_eq!(analysis.summary.smallest_non_zero_segment_length, 0.0);
        assert_eq!(analysis.summary.segment_length_ratio, 0.0);
    }

    #[test]
    fn test_non_finite_position() {
        let morphology = single_section(&[(0.0, 0.0, 0.0, 1.0), (f32::INFINITY, 0.0, 0.0, 1.0)]);
        let err = analyze_lengths(&morphology, &AnalysisOptions::default(), &TaskControl::none())
            .unwrap_err();
        assert_eq!(err.kind(), "numeric");
    }
}
