// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Geometry primitives: vectors, bounding boxes and scalar helpers.

mod bounding_box;
pub mod math;
mod vector;

pub use bounding_box::BoundingBox;
pub use vector::Vec3;
