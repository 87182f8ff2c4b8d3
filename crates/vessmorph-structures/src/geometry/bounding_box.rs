// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Axis-aligned bounding box.

use super::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box over sample positions.
///
/// An empty box (no point added yet) has `p_min > p_max` on every axis and
/// contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub p_min: Vec3,
    pub p_max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    pub fn empty() -> Self {
        BoundingBox {
            p_min: Vec3::splat(f32::INFINITY),
            p_max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec3>,
    {
        let mut bbox = BoundingBox::empty();
        for point in points {
            bbox.extend(point);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.p_min.x > self.p_max.x || self.p_min.y > self.p_max.y || self.p_min.z > self.p_max.z
    }

    pub fn extend(&mut self, point: &Vec3) {
        self.p_min = self.p_min.min(point);
        self.p_max = self.p_max.max(point);
    }

    pub fn merge(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.extend(&other.p_min);
        self.extend(&other.p_max);
    }

    pub fn contains(&self, point: &Vec3) -> bool {
        point.x >= self.p_min.x
            && point.x <= self.p_max.x
            && point.y >= self.p_min.y
            && point.y <= self.p_max.y
            && point.z >= self.p_min.z
            && point.z <= self.p_max.z
    }

    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        self.p_min.midpoint(&self.p_max)
    }

    /// Extent along each axis, zero for an empty box.
    pub fn bounds(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        self.p_max - self.p_min
    }

    pub fn diagonal(&self) -> f64 {
        self.bounds().length()
    }
}
