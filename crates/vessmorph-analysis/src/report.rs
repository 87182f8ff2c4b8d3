// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! All kernels over one morphology, with a flat list of summary items.

use crate::frame::DataFrame;
use crate::length::{analyze_lengths, LengthAnalysis};
use crate::options::AnalysisOptions;
use crate::radius::{analyze_radii, RadiusAnalysis};
use crate::structure::{analyze_structure, StructureAnalysis};
use crate::summary::SummaryItem;
use crate::surface_area::{analyze_surface_area, SurfaceAreaAnalysis};
use crate::volume::{analyze_volume, VolumeAnalysis};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use vessmorph_config::TableFormat;
use vessmorph_structures::{Morphology, MorphologyError, MorphologyResult, TaskControl};

const KERNELS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MorphologyReport {
    pub name: String,
    pub structure: StructureAnalysis,
    pub radius: RadiusAnalysis,
    pub length: LengthAnalysis,
    pub surface_area: SurfaceAreaAnalysis,
    pub volume: VolumeAnalysis,
}

impl MorphologyReport {
    /// Runs every kernel; progress is reported once per kernel.
    pub fn compute(
        morphology: &Morphology,
        options: &AnalysisOptions,
        control: &TaskControl,
    ) -> MorphologyResult<Self> {
        let structure = analyze_structure(morphology, control)?;
        control.report(1, KERNELS);
        let radius = analyze_radii(morphology, options, control)?;
        control.report(2, KERNELS);
        let length = analyze_lengths(morphology, options, control)?;
        control.report(3, KERNELS);
        let surface_area = analyze_surface_area(morphology, options, control)?;
        control.report(4, KERNELS);
        let volume = analyze_volume(morphology, options, control)?;
        control.report(5, KERNELS);

        info!(
            target: "vessmorph-analysis",
            "Analyzed '{}': length {:.3}, surface area {:.3}, volume {:.3}",
            morphology.name(),
            length.summary.total_length,
            surface_area.summary.total,
            volume.summary.total
        );
        Ok(MorphologyReport {
            name: morphology.name().to_string(),
            structure,
            radius,
            length,
            surface_area,
            volume,
        })
    }

    pub fn summary_items(&self) -> Vec<SummaryItem> {
        let mut items = self.structure.summary.summary_items();
        items.extend(self.radius.summary.summary_items());
        items.extend(self.length.summary.summary_items());
        items.extend(self.surface_area.summary.summary_items());
        items.extend(self.volume.summary.summary_items());
        items
    }

    pub fn summary_item(&self, key: &str) -> Option<SummaryItem> {
        self.summary_items().into_iter().find(|item| item.key == key)
    }

    pub fn frames(&self) -> Vec<&DataFrame> {
        vec![
            &self.structure.sections,
            &self.radius.samples,
            &self.radius.sections,
            &self.length.sections,
            &self.length.segments,
            &self.surface_area.segments,
            &self.surface_area.sections,
            &self.volume.segments,
            &self.volume.sections,
        ]
    }

    /// Writes every table into `dir` (created if missing) plus `summary.json`.
    pub fn write_tables(&self, dir: &Path, format: TableFormat) -> MorphologyResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).map_err(|e| MorphologyError::io(dir, e))?;
        let mut written = Vec::new();
        for frame in self.frames() {
            written.push(frame.write_to_dir(dir, format)?);
        }
        let summary_path = dir.join("summary.json");
        let summary = serde_json::to_string_pretty(&self.summary_items())
            .map_err(|e| MorphologyError::io(&summary_path, e.into()))?;
        std::fs::write(&summary_path, summary).map_err(|e| MorphologyError::io(&summary_path, e))?;
        written.push(summary_path);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::y_branch;
    use std::sync::atomic::AtomicBool;
    use std::sync::Mutex;

    #[test]
    fn test_report_covers_every_kernel() {
        let report =
            MorphologyReport::compute(&y_branch(), &AnalysisOptions::default(), &TaskControl::none())
                .unwrap();
        let groups: Vec<String> = report.summary_items().into_iter().map(|i| i.group).collect();
        for group in ["structure", "radius", "length", "surface_area", "volume"] {
            assert!(groups.iter().any(|g| g == group), "missing {}", group);
        }
        assert_eq!(report.summary_item("total_length").map(|i| i.value), Some(4.0));
        assert_eq!(report.frames().len(), 9);
    }

    #[test]
    fn test_progress_and_cancellation() {
        let seen = Mutex::new(Vec::new());
        let progress = |done: u64, total: u64| seen.lock().unwrap().push((done, total));
        let control = TaskControl::none().with_progress(&progress);
        MorphologyReport::compute(&y_branch(), &AnalysisOptions::default(), &control).unwrap();
        assert_eq!(seen.lock().unwrap().last(), Some(&(5, 5)));

        let abort = AtomicBool::new(true);
        let control = TaskControl::none().with_abort_flag(&abort);
        let err = MorphologyReport::compute(&y_branch(), &AnalysisOptions::default(), &control)
            .unwrap_err();
        assert!(matches!(err, MorphologyError::Cancelled));
    }

    #[test]
    fn test_write_tables() {
        let report =
            MorphologyReport::compute(&y_branch(), &AnalysisOptions::default(), &TaskControl::none())
                .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("tables");
        let written = report.write_tables(&out, TableFormat::Csv).unwrap();
        assert_eq!(written.len(), 10);
        assert!(out.join("length_sections.csv").exists());
        let summary = std::fs::read_to_string(out.join("summary.json")).unwrap();
        assert!(summary.contains("\"total_sections\""));
    }
}
