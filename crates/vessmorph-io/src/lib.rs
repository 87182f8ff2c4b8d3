// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Loaders and writers for vessmorph.
//!
//! Four input families decode into the same [`Morphology`](vessmorph_structures::Morphology):
//!
//! | extension | loader | layout |
//! |---|---|---|
//! | `.swc` | [`SwcLoader`] | one parent-pointer record per line |
//! | `.h5` | [`H5Loader`] | `points` + `structure` arrays |
//! | `.mat` | [`MatLoader`] | `V` vertex matrix + sparse adjacency `A` |
//! | `.vmv` | [`VmvReader`] | vertex list + strands |
//!
//! [`load_morphology`] picks the loader from the extension. Level-5 `.mat`
//! files (`-v6`, `-v7`) are read by a built-in decoder; `.h5` and `-v7.3`
//! `.mat` files are HDF5 containers and need the `hdf5` feature. The
//! `load_from_store` entry points work on any [`ArrayStore`].

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod builder;
mod factory;
mod h5;
#[cfg(feature = "hdf5")]
mod hdf5_store;
mod mat;
mod mat5;
mod options;
mod store;
mod swc;
pub mod vmv;

pub use builder::{split_at_terminals, terminal_indices, SectionBuilder};
pub use factory::{load_morphology, loader_for, MorphologyLoader};
pub use h5::{H5Loader, CONNECTIVITY_DATASET, POINTS_DATASET, STRUCTURE_DATASET};
#[cfg(feature = "hdf5")]
pub use hdf5_store::Hdf5Store;
pub use mat::{MatLoader, ADJACENCY_ARRAY, VERTICES_ARRAY};
pub use mat5::{is_level5, read_level5};
pub use options::LoadOptions;
pub use store::{ArrayStore, MemoryStore, SparseMatrix};
pub use swc::{parse_records, SwcLoader, SwcRecord};
pub use vmv::{VmvReader, VmvWriter};
