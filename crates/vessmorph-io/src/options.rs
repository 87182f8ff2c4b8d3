// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

use vessmorph_config::LoadingConfig;
use vessmorph_structures::Morphology;

/// Post-load passes every loader applies before handing out a morphology.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadOptions {
    /// Move the recorded origin (or the bounding-box center) to (0, 0, 0)
    pub center_at_origin: bool,
    /// Merge consecutive samples closer than this distance
    pub remove_doubles: Option<f32>,
}

impl LoadOptions {
    pub fn from_config(config: &LoadingConfig) -> Self {
        LoadOptions {
            center_at_origin: config.center_at_origin,
            remove_doubles: config
                .remove_doubles
                .then_some(config.doubles_tolerance),
        }
    }

    pub(crate) fn apply(&self, morphology: &mut Morphology) {
        if let Some(tolerance) = self.remove_doubles {
            morphology.remove_doubles(tolerance);
        }
        if self.center_at_origin {
            morphology.center_at_origin();
        }
    }
}
