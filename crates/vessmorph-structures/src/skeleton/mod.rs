// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! The skeleton model: samples, sections and the morphology graph.

mod morphology;
mod sample;
mod section;
mod traversal;

pub use morphology::Morphology;
pub use sample::{Sample, AUXILIARY_SAMPLE_INDEX};
pub use section::{Section, SectionId};
