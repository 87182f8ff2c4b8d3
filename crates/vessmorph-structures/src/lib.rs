// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! The core crate of vessmorph. Defines the vascular skeleton model, its geometry
//! primitives and simulation series, and the passes that tidy a morphology after
//! loading.
//!
//! The crate emits `tracing` events under the `vessmorph-structures` target but
//! never installs a subscriber.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod error;
pub mod geometry;
pub mod processing;
mod progress;
pub mod simulation;
pub mod skeleton;

pub use error::{MorphologyError, MorphologyResult};
pub use geometry::{BoundingBox, Vec3};
pub use processing::RadiusRewrite;
pub use progress::{ProgressFn, TaskControl};
pub use simulation::{SeriesKind, SimulationData, SimulationSeries};
pub use skeleton::{Morphology, Sample, Section, SectionId, AUXILIARY_SAMPLE_INDEX};
