// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! In-place post-load passes over a [`Morphology`](crate::skeleton::Morphology).
//!
//! Every pass keeps section terminals in place, so connectivity and loop
//! flags survive unchanged. Passes that move or drop samples invalidate the
//! cached bounding box.

mod doubles;
mod radii;
mod resample;
mod transform;

pub use radii::RadiusRewrite;
