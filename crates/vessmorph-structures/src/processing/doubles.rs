// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

use crate::skeleton::{Morphology, Sample};
use tracing::debug;

impl Morphology {
    /// Drops consecutive samples closer than `tolerance` to the sample kept before them.
    ///
    /// Section terminals are never dropped: when the last sample duplicates
    /// an interior predecessor, the interior sample goes instead. Returns the
    /// number of dropped samples.
    pub fn remove_doubles(&mut self, tolerance: f32) -> usize {
        let tolerance = tolerance as f64;
        let mut removed = 0;
        for section in self.sections_mut().iter_mut() {
            let before = section.samples.len();
            section.samples = without_doubles(&section.samples, tolerance);
            removed += before - section.samples.len();
        }
        if removed > 0 {
            debug!(target: "vessmorph-structures", "Removed {} duplicated samples", removed);
        }
        removed
    }
}

fn without_doubles(samples: &[Sample], tolerance: f64) -> Vec<Sample> {
    let Some((&last, interior)) = samples.split_last() else {
        return Vec::new();
    };
    if interior.is_empty() {
        return vec![last];
    }
    let mut kept: Vec<Sample> = Vec::with_capacity(samples.len());
    kept.push(interior[0]);
    for sample in &interior[1..] {
        if let Some(previous) = kept.last() {
            if previous.distance(sample) < tolerance {
                continue;
            }
        }
        kept.push(*sample);
    }
    // The first sample stays even when the last one duplicates it.
    if kept.len() > 1 {
        if let Some(previous) = kept.last() {
            if previous.distance(&last) < tolerance {
                kept.pop();
            }
        }
    }
    kept.push(last);
    kept
}
