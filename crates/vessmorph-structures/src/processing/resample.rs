// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
Resampling passes.

Both passes keep the first and last sample of every section, so the section
graph and its shared terminals are untouched.
*/

use crate::error::{MorphologyError, MorphologyResult};
use crate::skeleton::{Morphology, Sample};
use crate::TaskControl;
use tracing::debug;

/// Sections with fewer samples are left alone by the adaptive pass.
const ADAPTIVE_MIN_SAMPLES: usize = 4;

impl Morphology {
    /// Removes samples that sit inside the radius reach of their predecessor.
    ///
    /// Scanning consecutive samples `a, b`, `b` is removed while
    /// `||b − a|| < r_a + r_b`; otherwise the scan advances. The first and last
    /// samples are never removed and sections with fewer than four samples
    /// are skipped. Returns the number of removed samples.
    pub fn resample_adaptively(&mut self, control: &TaskControl) -> MorphologyResult<usize> {
        let total = self.number_sections() as u64;
        let mut removed = 0;
        let mut thinned = Vec::with_capacity(self.number_sections());
        for (done, section) in self.sections().iter().enumerate() {
            control.checkpoint()?;
            let samples = adaptive_pass(&section.samples);
            removed += section.samples.len() - samples.len();
            thinned.push(samples);
            control.report(done as u64 + 1, total);
        }
        control.checkpoint()?;
        self.commit_samples(thinned);
        debug!(target: "vessmorph-structures", "Adaptive resampling removed {} samples", removed);
        Ok(removed)
    }

    /// Inserts auxiliary samples so that no segment is longer than `step`.
    ///
    /// Inserted samples are linearly interpolated in position and radius and
    /// carry [`AUXILIARY_SAMPLE_INDEX`](crate::skeleton::AUXILIARY_SAMPLE_INDEX)
    /// until [`Morphology::renumber_auxiliary_samples`] runs. Returns the
    /// number of inserted samples.
    ///
    /// # Errors
    /// [`MorphologyError::Numeric`] if `step` is not a positive finite number.
    pub fn resample_fixed_step(&mut self, step: f32, control: &TaskControl) -> MorphologyResult<usize> {
        if !step.is_finite() || step <= 0.0 {
            return Err(MorphologyError::numeric(format!(
                "resampling step must be positive and finite, got {}",
                step
            )));
        }
        let total = self.number_sections() as u64;
        let mut inserted = 0;
        let mut refined = Vec::with_capacity(self.number_sections());
        for (done, section) in self.sections().iter().enumerate() {
            control.checkpoint()?;
            let mut resampled = Vec::with_capacity(section.samples.len());
            for pair in section.samples.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                resampled.push(a);
                let distance = a.distance(&b);
                let pieces = (distance / step as f64).ceil() as usize;
                for k in 1..pieces.max(1) {
                    let t = k as f64 / pieces as f64;
                    let radius = a.radius as f64 + (b.radius as f64 - a.radius as f64) * t;
                    resampled.push(Sample::auxiliary(a.point.lerp(&b.point, t), radius as f32));
                    inserted += 1;
                }
            }
            if let Some(last) = section.samples.last() {
                resampled.push(*last);
            }
            refined.push(resampled);
            control.report(done as u64 + 1, total);
        }
        control.checkpoint()?;
        self.commit_samples(refined);
        debug!(target: "vessmorph-structures", "Fixed-step resampling inserted {} samples", inserted);
        Ok(inserted)
    }

    /// Replaces every section's samples; `samples` is in section order.
    fn commit_samples(&mut self, samples: Vec<Vec<Sample>>) {
        for (section, samples) in self.sections_mut().iter_mut().zip(samples) {
            section.samples = samples;
        }
    }

    /// Gives every auxiliary sample a fresh index above the current maximum.
    ///
    /// Returns the number of renumbered samples.
    pub fn renumber_auxiliary_samples(&mut self) -> usize {
        let mut next = self
            .sections()
            .iter()
            .flat_map(|s| s.samples.iter())
            .map(|s| s.index)
            .max()
            .map(|max| max.max(-1) + 1)
            .unwrap_or(0);
        let mut renumbered = 0;
        for section in self.sections_mut().iter_mut() {
            for sample in section.samples.iter_mut().filter(|s| s.is_auxiliary()) {
                sample.index = next;
                next += 1;
                renumbered += 1;
            }
        }
        renumbered
    }
}

fn adaptive_pass(samples: &[Sample]) -> Vec<Sample> {
    let mut kept = samples.to_vec();
    if kept.len() < ADAPTIVE_MIN_SAMPLES {
        return kept;
    }
    let mut i = 0;
    // `b` = kept[i + 1] must never be the last sample.
    while i + 2 < kept.len() {
        let a = kept[i];
        let b = kept[i + 1];
        if a.distance(&b) < a.radius as f64 + b.radius as f64 {
            kept.remove(i + 1);
        } else {
            i += 1;
        }
    }
    kept
}
