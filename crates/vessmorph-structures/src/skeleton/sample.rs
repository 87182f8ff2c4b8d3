// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

use crate::geometry::Vec3;
use serde::{Deserialize, Serialize};

/// Index carried by samples inserted during resampling until they are renumbered.
pub const AUXILIARY_SAMPLE_INDEX: i64 = -1;

/// A point on the vessel centerline with its radius.
///
/// Radius `0.0` is legal and is preserved as-is; statistics tell zero apart
/// from the smallest non-zero radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Position in micrometers
    pub point: Vec3,
    /// Radius in micrometers
    pub radius: f32,
    /// Stable identifier within the morphology, [`AUXILIARY_SAMPLE_INDEX`] for inserted samples
    pub index: i64,
    /// Row of this sample in the morphology's simulation series
    pub series_index: Option<usize>,
}

impl Sample {
    pub fn new(point: Vec3, radius: f32, index: i64) -> Self {
        Sample {
            point,
            radius,
            index,
            series_index: None,
        }
    }

    /// A sample inserted by a processing pass, without a stable identity yet.
    pub fn auxiliary(point: Vec3, radius: f32) -> Self {
        Sample::new(point, radius, AUXILIARY_SAMPLE_INDEX)
    }

    pub fn with_series_index(mut self, series_index: usize) -> Self {
        self.series_index = Some(series_index);
        self
    }

    pub fn is_auxiliary(&self) -> bool {
        self.index == AUXILIARY_SAMPLE_INDEX
    }

    pub fn diameter(&self) -> f32 {
        self.radius * 2.0
    }

    pub fn distance(&self, other: &Sample) -> f64 {
        self.point.distance(&other.point)
    }
}
