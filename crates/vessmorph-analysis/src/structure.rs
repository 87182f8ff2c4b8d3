// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Sample, segment and section counts.

use crate::frame::{Cell, DataFrame};
use crate::stats::RunningStats;
use crate::summary::SummaryItem;
use serde::Serialize;
use tracing::debug;
use vessmorph_structures::{Morphology, MorphologyResult, TaskControl};

pub const STRUCTURE_COLUMNS: [&str; 6] = [
    "section_index",
    "number_samples",
    "number_segments",
    "center_x",
    "center_y",
    "center_z",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureSummary {
    pub total_unique_samples: usize,
    /// Samples counted once per section, branching points included
    pub total_samples: usize,
    pub total_segments: usize,
    pub total_sections: usize,
    pub sections_with_one_segment: usize,
    pub min_samples_per_section: usize,
    pub max_samples_per_section: usize,
    pub mean_samples_per_section: f64,
    pub short_sections: usize,
    pub loop_sections: usize,
    pub root_sections: usize,
    pub leaf_sections: usize,
}

impl StructureSummary {
    pub fn summary_items(&self) -> Vec<SummaryItem> {
        const GROUP: &str = "structure";
        vec![
            SummaryItem::count(GROUP, "total_unique_samples", "Total unique samples", self.total_unique_samples),
            SummaryItem::count(GROUP, "total_samples", "Total samples", self.total_samples),
            SummaryItem::count(GROUP, "total_segments", "Total segments", self.total_segments),
            SummaryItem::count(GROUP, "total_sections", "Total sections", self.total_sections),
            SummaryItem::count(
                GROUP,
                "sections_with_one_segment",
                "Sections with one segment",
                self.sections_with_one_segment,
            ),
            SummaryItem::count(
                GROUP,
                "min_samples_per_section",
                "Minimum samples per section",
                self.min_samples_per_section,
            ),
            SummaryItem::count(
                GROUP,
                "max_samples_per_section",
                "Maximum samples per section",
                self.max_samples_per_section,
            ),
            SummaryItem::new(
                GROUP,
                "mean_samples_per_section",
                "Mean samples per section",
                self.mean_samples_per_section,
                crate::summary::UNIT_NONE,
            ),
            SummaryItem::count(GROUP, "short_sections", "Short sections", self.short_sections),
            SummaryItem::count(GROUP, "loop_sections", "Loop sections", self.loop_sections),
            SummaryItem::count(GROUP, "root_sections", "Root sections", self.root_sections),
            SummaryItem::count(GROUP, "leaf_sections", "Leaf sections", self.leaf_sections),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureAnalysis {
    pub sections: DataFrame,
    pub summary: StructureSummary,
}

/// Per-section counts and centers.
pub fn analyze_structure(morphology: &Morphology, control: &TaskControl) -> MorphologyResult<StructureAnalysis> {
    let mut frame = DataFrame::new("structure_sections", &STRUCTURE_COLUMNS);
    let mut samples_per_section = RunningStats::default();
    let mut sections_with_one_segment = 0;
    let mut short_sections = 0;
    let mut loop_sections = 0;

    for section in morphology.sections() {
        control.checkpoint()?;
        let center = section.center();
        frame.push_row(vec![
            Cell::from(section.index),
            Cell::from(section.number_samples()),
            Cell::from(section.number_segments()),
            Cell::from(center.x),
            Cell::from(center.y),
            Cell::from(center.z),
        ])?;
        samples_per_section.push(section.number_samples() as f64);
        if section.number_segments() == 1 {
            sections_with_one_segment += 1;
        }
        if section.is_short() {
            short_sections += 1;
        }
        if section.is_loop {
            loop_sections += 1;
        }
    }

    let summary = StructureSummary {
        total_unique_samples: morphology.number_unique_samples(),
        total_samples: morphology.number_samples(),
        total_segments: morphology.number_segments(),
        total_sections: morphology.number_sections(),
        sections_with_one_segment,
        min_samples_per_section: samples_per_section.min() as usize,
        max_samples_per_section: samples_per_section.max() as usize,
        mean_samples_per_section: samples_per_section.mean(),
        short_sections,
        loop_sections,
        root_sections: morphology.roots().len(),
        leaf_sections: morphology.leaves().len(),
    };
    debug!(
        target: "vessmorph-analysis",
        "Structure of '{}': {} sections, {} short, {} loops",
        morphology.name(),
        summary.total_sections,
        short_sections,
        loop_sections
    );
    Ok(StructureAnalysis {
        sections: frame,
        summary,
    })
}
