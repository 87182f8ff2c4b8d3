// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Random parent-pointer trees through the SWC loader and the VMV writer/reader.

use proptest::prelude::*;
use vessmorph_io::{SwcLoader, VmvReader, VmvWriter};
use vessmorph_structures::{Morphology, TaskControl};

/// SWC text of a random tree: record `k` (1-based) hangs off an earlier record.
fn random_tree() -> impl Strategy<Value = String> {
    prop::collection::vec((0.0f64..1.0, -20.0f32..20.0, -20.0f32..20.0, 0.1f32..3.0), 2..40)
        .prop_map(|rows| {
            let mut text = String::new();
            for (i, (pick, y, z, radius)) in rows.into_iter().enumerate() {
                let index = i + 1;
                let parent = if index == 1 {
                    -1
                } else {
                    1 + ((pick * (index - 1) as f64) as i64).min(index as i64 - 2)
                };
                text.push_str(&format!("{} 3 {} {} {} {} {}\n", index, index, y, z, radius, parent));
            }
            text
        })
}

fn load(text: &str) -> Morphology {
    SwcLoader::default()
        .parse_str("tree", text, &TaskControl::none())
        .unwrap()
}

proptest! {
    #[test]
    fn every_record_lands_in_a_linked_section(text in random_tree()) {
        let morphology = load(&text);
        let records = text.lines().count();
        prop_assert_eq!(morphology.number_unique_samples(), records);
        for &root in morphology.roots() {
            let first = morphology.sections()[root as usize].first_sample().map(|s| s.index);
            prop_assert_eq!(first, Some(1));
        }
        prop_assert!(morphology.validate().is_ok());
        for section in morphology.sections() {
            prop_assert!(section.number_samples() >= 2);
            for &child in &section.children {
                let child = &morphology.sections()[child as usize];
                prop_assert_eq!(
                    section.last_sample().map(|s| s.index),
                    child.first_sample().map(|s| s.index)
                );
            }
        }
        prop_assert_eq!(morphology.depth_first_order().len(), morphology.number_sections());
    }

    #[test]
    fn vmv_round_trip_keeps_topology_and_samples(text in random_tree()) {
        let original = load(&text);
        let written = VmvWriter::default().to_string(&original);
        let read = VmvReader::default()
            .parse_str("tree", &written, &TaskControl::none())
            .unwrap();
        prop_assert_eq!(read.number_sections(), original.number_sections());
        prop_assert_eq!(read.roots(), original.roots());
        for (a, b) in original.sections().iter().zip(read.sections()) {
            prop_assert_eq!(&a.parents, &b.parents);
            prop_assert_eq!(&a.children, &b.children);
            prop_assert_eq!(a.number_samples(), b.number_samples());
            for (x, y) in a.samples.iter().zip(&b.samples) {
                prop_assert!(x.point.distance(&y.point) < 0.01);
                prop_assert!((x.radius - y.radius).abs() <= 0.0051);
            }
        }
    }
}
