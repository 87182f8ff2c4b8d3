// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Loader interface and dispatch by file extension.

use crate::h5::H5Loader;
use crate::mat::MatLoader;
use crate::options::LoadOptions;
use crate::swc::SwcLoader;
use crate::vmv::VmvReader;
use std::path::Path;
use tracing::info;
use vessmorph_structures::{Morphology, MorphologyError, MorphologyResult, TaskControl};

/// A decoder from one external encoding into a [`Morphology`].
pub trait MorphologyLoader {
    /// Short lowercase name of the format
    fn format_name(&self) -> &'static str;

    fn load(&self, path: &Path, control: &TaskControl) -> MorphologyResult<Morphology>;
}

/// Picks the loader for `path` from its extension (case-insensitive).
///
/// # Errors
/// [`MorphologyError::Format`] for a missing or unknown extension.
pub fn loader_for(path: &Path, options: LoadOptions) -> MorphologyResult<Box<dyn MorphologyLoader>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "swc" => Ok(Box::new(SwcLoader::new(options))),
        "h5" | "hdf5" => Ok(Box::new(H5Loader::new(options))),
        "mat" => Ok(Box::new(MatLoader::new(options))),
        "vmv" => Ok(Box::new(VmvReader::new(options))),
        _ => Err(MorphologyError::format(format!(
            "{}: unsupported morphology extension '{}'",
            path.display(),
            extension
        ))),
    }
}

/// Loads `path` with the loader matching its extension.
pub fn load_morphology(
    path: &Path,
    options: LoadOptions,
    control: &TaskControl,
) -> MorphologyResult<Morphology> {
    let loader = loader_for(path, options)?;
    let morphology = loader.load(path, control)?;
    info!(
        target: "vessmorph-io",
        "Loaded {} morphology '{}': {} sections, {} samples",
        loader.format_name(),
        morphology.name(),
        morphology.number_sections(),
        morphology.number_samples()
    );
    Ok(morphology)
}

/// Morphology name taken from the file stem.
pub(crate) fn morphology_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "morphology".to_string())
}

pub(crate) fn read_text(path: &Path) -> MorphologyResult<String> {
    std::fs::read_to_string(path).map_err(|e| MorphologyError::io(path, e))
}
