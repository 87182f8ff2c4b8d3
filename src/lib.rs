// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! # vessmorph - vascular morphology skeletons
//!
//! vessmorph loads vascular skeletons from several on-disk encodings into one
//! canonical section graph, measures them, and writes them back out as VMV
//! files for visualization.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! vessmorph = "0.3"
//! ```
//!
//! ```rust,no_run
//! use std::path::Path;
//! use vessmorph::prelude::*;
//!
//! let control = TaskControl::none();
//! let morphology = load_morphology(Path::new("vessels.swc"), LoadOptions::default(), &control)?;
//!
//! let report = MorphologyReport::compute(&morphology, &AnalysisOptions::default(), &control)?;
//! for item in report.summary_items() {
//!     println!("{}", item);
//! }
//!
//! VmvWriter::default().write_to_path(&morphology, Path::new("vessels.vmv"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`hdf5`**: container backend for `.h5` and MATLAB v7.3 `.mat` inputs
//!   (needs the native libhdf5). Without it, those extensions fail with a
//!   format error; the same loaders still run on in-memory array stores.
//!
//! ## Usage Examples
//!
//! ### Text input without touching the filesystem
//!
//! ```rust
//! use vessmorph::prelude::*;
//!
//! let text = "1 1 0 0 0 1 -1\n2 1 1 0 0 1 1\n3 1 2 0 0 1 2\n";
//! let morphology = SwcLoader::default().parse_str("line", text, &TaskControl::none())?;
//! assert_eq!(morphology.number_sections(), 1);
//!
//! let vmv = VmvWriter::new(3).to_string(&morphology);
//! assert!(vmv.starts_with("$PARAM_BEGIN"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Post-load processing
//!
//! ```rust,no_run
//! use std::path::Path;
//! use vessmorph::prelude::*;
//!
//! let control = TaskControl::none();
//! let mut morphology = load_morphology(Path::new("vessels.vmv"), LoadOptions::default(), &control)?;
//! morphology.resample_fixed_step(2.0, &control)?;
//! morphology.renumber_auxiliary_samples();
//! morphology.rewrite_radii(RadiusRewrite::Minimum(0.5))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: vessmorph-config, vessmorph-observability  │
//! │  (TOML + overrides, tracing subscriber setup)           │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Model: vessmorph-structures                            │
//! │  (Sample, Section, Morphology, processing, errors)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  I/O: vessmorph-io                                      │
//! │  (SWC / H5 / MAT / VMV loaders, VMV writer)             │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: vessmorph-analysis                         │
//! │  (structure, radius, length, surface area, volume)      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use vessmorph_config as config;
pub use vessmorph_observability as observability;

// Re-export model
pub use vessmorph_structures as structures;

// Re-export I/O layer
pub use vessmorph_io as io;

// Re-export algorithms
pub use vessmorph_analysis as analysis;

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::structures::{
        BoundingBox, Morphology, MorphologyError, MorphologyResult, RadiusRewrite, Sample, Section,
        SectionId, SimulationSeries, TaskControl, Vec3,
    };

    pub use crate::io::{
        load_morphology, loader_for, LoadOptions, MorphologyLoader, SwcLoader, VmvReader, VmvWriter,
    };

    pub use crate::analysis::{AnalysisOptions, DataFrame, MorphologyReport, SummaryItem};

    pub use crate::config::{load_config, validate_config, VessmorphConfig};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let control = TaskControl::none();
        let morphology = SwcLoader::default()
            .parse_str("facade", "1 1 0 0 0 1 -1\n2 1 3 0 0 1 1\n", &control)
            .unwrap();
        let report =
            MorphologyReport::compute(&morphology, &AnalysisOptions::default(), &control).unwrap();
        assert_eq!(report.length.summary.total_length, 3.0);
        assert_eq!(crate::io::VERSION, crate::analysis::VERSION);
    }
}
