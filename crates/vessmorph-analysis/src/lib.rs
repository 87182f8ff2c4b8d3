// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Geometric and topological analysis of vessmorph morphologies.
//!
//! Every kernel is a pure function of a `&Morphology` returning tables
//! ([`DataFrame`]) plus a typed summary. Kernels never modify the morphology.
//! Per-section anomalies become zero-valued rows; only non-finite arithmetic
//! fails, with `MorphologyError::Numeric`.
//!
//! | kernel | tables |
//! |---|---|
//! | [`analyze_structure`] | per section counts and centers |
//! | [`analyze_radii`] | per sample, per section |
//! | [`analyze_lengths`] | per section, per segment |
//! | [`analyze_surface_area`] | per segment, per section |
//! | [`analyze_volume`] | per segment, per section |
//!
//! [`MorphologyReport`] runs all of them and flattens their summaries into
//! [`SummaryItem`]s.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod binning;
pub mod colormap;
mod frame;
mod frustum;
pub mod length;
mod options;
pub mod radius;
mod report;
mod stats;
pub mod structure;
mod summary;
pub mod surface_area;
pub mod volume;

pub use binning::Histogram;
pub use colormap::{colormap_index, map_to_colormap_indices};
pub use frame::{Cell, DataFrame};
pub use frustum::SegmentQuantitySummary;
pub use length::{analyze_lengths, LengthAnalysis, LengthSummary};
pub use options::{AnalysisOptions, MeanDenominator};
pub use radius::{analyze_radii, RadiusAnalysis, RadiusSummary};
pub use report::MorphologyReport;
pub use structure::{analyze_structure, StructureAnalysis, StructureSummary};
pub use summary::{SummaryItem, UNIT_AREA, UNIT_LENGTH, UNIT_NONE, UNIT_VOLUME};
pub use surface_area::{analyze_surface_area, SurfaceAreaAnalysis};
pub use volume::{analyze_volume, VolumeAnalysis};

#[cfg(test)]
pub(crate) mod test_support {
    use vessmorph_structures::{Morphology, Sample, Section, Vec3};

    /// One section from `(x, y, z, radius)` rows.
    pub fn single_section(rows: &[(f32, f32, f32, f32)]) -> Morphology {
        let samples = rows
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z, r))| Sample::new(Vec3::new(x, y, z), r, i as i64))
            .collect();
        Morphology::assemble("single", vec![Section::new(0, samples)]).unwrap()
    }

    /// One straight section along x with unit spacing and the given radii.
    pub fn line_morphology(radii: &[f32]) -> Morphology {
        let rows: Vec<(f32, f32, f32, f32)> = radii
            .iter()
            .enumerate()
            .map(|(i, &r)| (i as f32, 0.0, 0.0, r))
            .collect();
        single_section(&rows)
    }

    /// Root (0,0,0) → (2,0,0) forking to (2,±1,0), unit radii.
    pub fn y_branch() -> Morphology {
        let sample = |index: i64, x: f32, y: f32| Sample::new(Vec3::new(x, y, 0.0), 1.0, index);
        let mut sections = vec![
            Section::new(0, vec![sample(1, 0.0, 0.0), sample(2, 1.0, 0.0), sample(3, 2.0, 0.0)]),
            Section::new(1, vec![sample(3, 2.0, 0.0), sample(4, 2.0, 1.0)]),
            Section::new(2, vec![sample(3, 2.0, 0.0), sample(5, 2.0, -1.0)]),
        ];
        sections[0].children = vec![1, 2];
        sections[1].parents = vec![0];
        sections[2].parents = vec![0];
        Morphology::assemble("y_branch", sections).unwrap()
    }
}
