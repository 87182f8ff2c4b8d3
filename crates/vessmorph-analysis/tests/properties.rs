// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Kernel invariants over random polylines.

use proptest::prelude::*;
use vessmorph_analysis::{
    analyze_lengths, analyze_surface_area, analyze_volume, AnalysisOptions, MorphologyReport,
};
use vessmorph_structures::{Morphology, Sample, Section, TaskControl, Vec3};

fn polyline() -> impl Strategy<Value = Vec<(f32, f32, f32, f32)>> {
    prop::collection::vec(
        (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0, 0.0f32..5.0),
        1..30,
    )
}

/// A root polyline with a second polyline branching off its last sample.
fn forked(root: &[(f32, f32, f32, f32)], branch: &[(f32, f32, f32, f32)]) -> Morphology {
    let to_samples = |rows: &[(f32, f32, f32, f32)], offset: i64| -> Vec<Sample> {
        rows.iter()
            .enumerate()
            .map(|(i, &(x, y, z, r))| Sample::new(Vec3::new(x, y, z), r, offset + i as i64))
            .collect()
    };
    let root_samples = to_samples(root, 0);
    let mut branch_samples = to_samples(branch, root.len() as i64);
    if let Some(&joint) = root_samples.last() {
        branch_samples.insert(0, joint);
    }
    let mut sections = vec![Section::new(0, root_samples), Section::new(1, branch_samples)];
    sections[0].children = vec![1];
    sections[1].parents = vec![0];
    Morphology::assemble("forked", sections).unwrap()
}

proptest! {
    #[test]
    fn section_length_is_sum_of_segments(root in polyline(), branch in polyline()) {
        let morphology = forked(&root, &branch);
        let analysis = analyze_lengths(&morphology, &AnalysisOptions::default(), &TaskControl::none()).unwrap();
        let lengths = analysis.sections.column("section_length").unwrap();
        for (section, length) in morphology.sections().iter().zip(lengths) {
            let segments: f64 = section.segment_lengths().iter().sum();
            prop_assert!((length - segments).abs() <= 1e-6 * segments.max(1.0));
        }
        let total: f64 = analysis.segments.column("segment_length").unwrap().iter().sum();
        prop_assert!((analysis.summary.total_length - total).abs() <= 1e-6 * total.max(1.0));
    }

    #[test]
    fn areas_and_volumes_are_non_negative(root in polyline(), branch in polyline()) {
        let morphology = forked(&root, &branch);
        let options = AnalysisOptions::default();
        let area = analyze_surface_area(&morphology, &options, &TaskControl::none()).unwrap();
        let volume = analyze_volume(&morphology, &options, &TaskControl::none()).unwrap();
        prop_assert!(area.sections.column("section_surface_area").unwrap().iter().all(|&v| v >= 0.0));
        prop_assert!(volume.sections.column("section_volume").unwrap().iter().all(|&v| v >= 0.0));
        prop_assert!(area.summary.total >= 0.0);
        prop_assert!(volume.summary.total >= 0.0);
    }

    #[test]
    fn ratios_stay_in_unit_interval(root in polyline(), branch in polyline()) {
        let morphology = forked(&root, &branch);
        let report = MorphologyReport::compute(&morphology, &AnalysisOptions::default(), &TaskControl::none()).unwrap();
        for ratio in report.radius.sections.column("radius_ratio").unwrap() {
            prop_assert!((0.0..=1.0).contains(&ratio));
        }
        for ratio in report.length.sections.column("seg_length_ratio").unwrap() {
            prop_assert!((0.0..=1.0).contains(&ratio));
        }
        prop_assert!((0.0..=1.0).contains(&report.radius.summary.radius_ratio));
    }
}
