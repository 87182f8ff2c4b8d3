// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

use super::Sample;
use crate::geometry::{BoundingBox, Vec3};
use serde::{Deserialize, Serialize};

/// Dense 0-based section label, equal to the section's position in the morphology.
pub type SectionId = u32;

/// A maximal simple path of samples between graph terminals.
///
/// `samples[0]` and the last sample are the section's terminals. A section
/// with a single sample is degenerate but kept; every length-derived quantity
/// of such a section is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub index: SectionId,
    pub samples: Vec<Sample>,
    pub parents: Vec<SectionId>,
    pub children: Vec<SectionId>,
    /// First and last sample coincide in the graph
    pub is_loop: bool,
}

impl Section {
    pub fn new(index: SectionId, samples: Vec<Sample>) -> Self {
        let mut section = Section {
            index,
            samples,
            parents: Vec::new(),
            children: Vec::new(),
            is_loop: false,
        };
        section.is_loop = section.endpoints_coincide();
        section
    }

    pub fn first_sample(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last_sample(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn number_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn number_segments(&self) -> usize {
        self.samples.len().saturating_sub(1)
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Neither parents nor children: a root and a leaf at once.
    pub fn is_orphan(&self) -> bool {
        self.is_root() && self.is_leaf()
    }

    /// Whether the first and last sample are the same graph vertex.
    ///
    /// Samples with a stable index are compared by index, auxiliary samples by position.
    pub fn endpoints_coincide(&self) -> bool {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) if self.samples.len() >= 2 => {
                if !first.is_auxiliary() && !last.is_auxiliary() {
                    first.index == last.index
                } else {
                    first.point == last.point
                }
            }
            _ => false,
        }
    }

    /// Consecutive sample pairs, one per segment.
    pub fn segments(&self) -> impl Iterator<Item = (&Sample, &Sample)> {
        self.samples.windows(2).map(|pair| (&pair[0], &pair[1]))
    }

    pub fn segment_lengths(&self) -> Vec<f64> {
        self.segments().map(|(a, b)| a.distance(b)).collect()
    }

    /// Sum of the segment lengths; zero for fewer than two samples.
    pub fn length(&self) -> f64 {
        self.segments().map(|(a, b)| a.distance(b)).sum()
    }

    /// Sum of the two terminal radii (`0.0` for an empty section).
    pub fn terminal_radii_sum(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => first.radius as f64 + last.radius as f64,
            _ => 0.0,
        }
    }

    /// A section is short when it is shorter than the sum of its terminal diameters.
    pub fn is_short(&self) -> bool {
        self.length() < 2.0 * self.terminal_radii_sum()
    }

    /// Position of the sample at the path-length midpoint.
    ///
    /// Walks the section accumulating segment lengths and returns the first
    /// sample at which half the section length has been reached. Sections
    /// with at most two samples return the midpoint of their terminals.
    pub fn center(&self) -> Vec3 {
        match self.samples.len() {
            0 => Vec3::ZERO,
            1 | 2 => {
                let first = self.samples[0].point;
                let last = self.samples[self.samples.len() - 1].point;
                first.midpoint(&last)
            }
            _ => {
                let half = self.length() / 2.0;
                let mut accumulated = 0.0;
                if half <= 0.0 {
                    return self.samples[0].point;
                }
                for (a, b) in self.segments() {
                    accumulated += a.distance(b);
                    if accumulated >= half {
                        return b.point;
                    }
                }
                self.samples[self.samples.len() - 1].point
            }
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.samples.iter().map(|s| &s.point))
    }
}
