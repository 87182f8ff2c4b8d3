// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

use crate::geometry::Vec3;
use crate::skeleton::Morphology;
use tracing::debug;

impl Morphology {
    /// Moves every sample by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        for section in self.sections_mut().iter_mut() {
            for sample in section.samples.iter_mut() {
                sample.point += offset;
            }
        }
    }

    /// Moves the morphology so its origin lands on `(0, 0, 0)`.
    ///
    /// The origin is the one recorded by the loader, or the bounding-box
    /// center when none was recorded. Returns the applied offset.
    pub fn center_at_origin(&mut self) -> Vec3 {
        let origin = self.origin().unwrap_or_else(|| self.bounding_box().center());
        let offset = -origin;
        self.translate(offset);
        debug!(target: "vessmorph-structures", "Centered '{}' with offset {}", self.name(), offset);
        offset
    }
}
