// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
Shared driver of the surface-area and volume kernels.

Both kernels evaluate one frustum quantity per segment and aggregate it the
same way per section and over the morphology; only the formula and the
names differ.
*/

use crate::frame::{Cell, DataFrame};
use crate::length::checked_segment_lengths;
use crate::options::AnalysisOptions;
use crate::stats::{RunningStats, SmallestAbove};
use crate::summary::{SummaryItem, UNIT_NONE};
use serde::Serialize;
use tracing::debug;
use vessmorph_structures::{Morphology, MorphologyError, MorphologyResult, TaskControl};

/// Names and formula of one frustum quantity.
pub(crate) struct Quantity {
    pub group: &'static str,
    /// Singular noun used in labels, e.g. "surface area"
    pub noun: &'static str,
    /// Snake-case stem of keys and columns, e.g. "surface_area"
    pub stem: &'static str,
    pub unit: &'static str,
    pub segment_columns: &'static [&'static str],
    pub section_columns: &'static [&'static str],
    pub formula: fn(f64, f64, f64) -> Option<f64>,
}

/// Morphology-wide aggregate of a per-segment quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentQuantitySummary {
    #[serde(skip)]
    group: &'static str,
    #[serde(skip)]
    noun: &'static str,
    #[serde(skip)]
    stem: &'static str,
    #[serde(skip)]
    unit: &'static str,
    pub total: f64,
    pub min_segment: f64,
    pub max_segment: f64,
    pub mean_segment: f64,
    pub smallest_non_zero_segment: f64,
    pub zero_segments: usize,
    pub min_section: f64,
    pub max_section: f64,
    pub mean_section: f64,
    /// Smallest non-zero segment value over the largest one
    pub segment_ratio: f64,
    pub segment_factor: f64,
}

impl SegmentQuantitySummary {
    pub fn summary_items(&self) -> Vec<SummaryItem> {
        let item = |key: &str, label: &str, value: f64, unit: &str| {
            SummaryItem::new(
                self.group,
                &key.replace("{}", self.stem),
                &label.replace("{}", self.noun),
                value,
                unit,
            )
        };
        vec![
            item("total_{}", "Total {}", self.total, self.unit),
            item("min_segment_{}", "Minimum segment {}", self.min_segment, self.unit),
            item("max_segment_{}", "Maximum segment {}", self.max_segment, self.unit),
            item("mean_segment_{}", "Mean segment {}", self.mean_segment, self.unit),
            item(
                "smallest_non_zero_segment_{}",
                "Smallest non-zero segment {}",
                self.smallest_non_zero_segment,
                self.unit,
            ),
            SummaryItem::count(
                self.group,
                &format!("zero_{}_segments", self.stem),
                &format!("Segments with zero {}", self.noun),
                self.zero_segments,
            ),
            item("min_section_{}", "Minimum section {}", self.min_section, self.unit),
            item("max_section_{}", "Maximum section {}", self.max_section, self.unit),
            item("mean_section_{}", "Mean section {}", self.mean_section, self.unit),
            item("segment_{}_ratio", "Segment {} ratio", self.segment_ratio, UNIT_NONE),
            item("segment_{}_factor", "Segment {} factor", self.segment_factor, UNIT_NONE),
        ]
    }
}

pub(crate) struct QuantityTables {
    pub segments: DataFrame,
    pub sections: DataFrame,
    pub summary: SegmentQuantitySummary,
}

pub(crate) fn analyze_quantity(
    morphology: &Morphology,
    options: &AnalysisOptions,
    control: &TaskControl,
    quantity: &Quantity,
) -> MorphologyResult<QuantityTables> {
    let mut segments = DataFrame::new(format!("{}_segments", quantity.stem), quantity.segment_columns);
    let mut sections = DataFrame::new(format!("{}_sections", quantity.stem), quantity.section_columns);
    let mut all_segments = RunningStats::default();
    let mut all_sections = RunningStats::default();
    let mut smallest = SmallestAbove::new(f64::MIN_POSITIVE);
    let mut zero_segments = 0;

    for section in morphology.sections() {
        control.checkpoint()?;
        let lengths = checked_segment_lengths(section)?;
        let mut stats = RunningStats::default();
        for ((a, b), &length) in section.segments().zip(&lengths) {
            let value = (quantity.formula)(a.radius as f64, b.radius as f64, length).ok_or_else(|| {
                MorphologyError::numeric(format!(
                    "segment {} -> {} of section {} has no finite {} (radii {}, {})",
                    a.index, b.index, section.index, quantity.noun, a.radius, b.radius
                ))
            })?;
            let center = a.point.midpoint(&b.point);
            segments.push_row(vec![
                Cell::from(center.x),
                Cell::from(center.y),
                Cell::from(center.z),
                Cell::from(value),
            ])?;
            stats.push(value);
            all_segments.push(value);
            if smallest.push(value) {
                zero_segments += 1;
            }
        }

        let ratio = if stats.max() > 0.0 {
            options.ratio(stats.min(), stats.max())
        } else {
            0.0
        };
        sections.push_row(vec![
            Cell::from(section.index),
            Cell::from(stats.sum()),
            Cell::from(stats.min()),
            Cell::from(options.segment_mean(stats.sum(), section)),
            Cell::from(stats.max()),
            Cell::from(ratio),
        ])?;
        all_sections.push(stats.sum());
    }

    let summary = SegmentQuantitySummary {
        group: quantity.group,
        noun: quantity.noun,
        stem: quantity.stem,
        unit: quantity.unit,
        total: all_sections.sum(),
        min_segment: all_segments.min(),
        max_segment: all_segments.max(),
        mean_segment: all_segments.mean(),
        smallest_non_zero_segment: smallest.get(),
        zero_segments,
        min_section: all_sections.min(),
        max_section: all_sections.max(),
        mean_section: all_sections.mean(),
        segment_ratio: options.ratio(smallest.get(), all_segments.max()),
        segment_factor: options.ratio(all_segments.max(), smallest.get()),
    };
    debug!(
        target: "vessmorph-analysis",
        "Total {} of '{}': {:.3} over {} segments",
        quantity.noun,
        morphology.name(),
        summary.total,
        all_segments.count()
    );
    Ok(QuantityTables {
        segments,
        sections,
        summary,
    })
}
