// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! [`ArrayStore`] over an HDF5 file, including MATLAB v7.3 `.mat` files.
//!
//! MATLAB stores a sparse matrix as a group carrying a `MATLAB_sparse`
//! attribute (the row count) and the CSC arrays `data`, `ir` and `jc`.

use crate::store::{ArrayStore, SparseMatrix};
use ndarray::Array2;
use std::path::{Path, PathBuf};
use tracing::debug;
use vessmorph_structures::{MorphologyError, MorphologyResult};

const SPARSE_ROWS_ATTRIBUTE: &str = "MATLAB_sparse";

pub struct Hdf5Store {
    path: PathBuf,
    file: hdf5::File,
}

impl Hdf5Store {
    /// Opens `path` read-only.
    ///
    /// # Errors
    /// [`MorphologyError::Io`] if the file does not exist,
    /// [`MorphologyError::Format`] if it is not an HDF5 file.
    pub fn open(path: &Path) -> MorphologyResult<Self> {
        if !path.exists() {
            return Err(MorphologyError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            ));
        }
        let file = hdf5::File::open(path).map_err(|e| container_error(path, "open", e))?;
        debug!(target: "vessmorph-io", "Opened HDF5 container {}", path.display());
        Ok(Hdf5Store {
            path: path.to_path_buf(),
            file,
        })
    }

    fn read_vector<T: hdf5::H5Type>(&self, group: &hdf5::Group, name: &str) -> MorphologyResult<Vec<T>> {
        group
            .dataset(name)
            .and_then(|dataset| dataset.read_raw::<T>())
            .map_err(|e| container_error(&self.path, name, e))
    }
}

fn container_error(path: &Path, what: &str, error: hdf5::Error) -> MorphologyError {
    MorphologyError::format(format!("{} ({}): {}", path.display(), what, error))
}

fn to_indices(values: Vec<u64>) -> Vec<usize> {
    values.into_iter().map(|v| v as usize).collect()
}

impl ArrayStore for Hdf5Store {
    fn contains(&self, name: &str) -> bool {
        self.file.link_exists(name)
    }

    fn dense(&self, name: &str) -> MorphologyResult<Array2<f64>> {
        let dataset = self
            .file
            .dataset(name)
            .map_err(|e| container_error(&self.path, name, e))?;
        let shape = dataset.shape();
        let values = dataset
            .read_raw::<f64>()
            .map_err(|e| container_error(&self.path, name, e))?;
        let (rows, cols) = match shape.as_slice() {
            [n] => (*n, 1),
            [rows, cols] => (*rows, *cols),
            other => {
                return Err(MorphologyError::format(format!(
                    "dataset '{}' has {} dimensions, expected 1 or 2",
                    name,
                    other.len()
                )))
            }
        };
        Array2::from_shape_vec((rows, cols), values)
            .map_err(|e| MorphologyError::format(format!("dataset '{}': {}", name, e)))
    }

    fn sparse(&self, name: &str) -> MorphologyResult<SparseMatrix> {
        let group = self
            .file
            .group(name)
            .map_err(|e| container_error(&self.path, name, e))?;
        let rows = group
            .attr(SPARSE_ROWS_ATTRIBUTE)
            .and_then(|attr| attr.read_scalar::<u64>())
            .map_err(|e| container_error(&self.path, SPARSE_ROWS_ATTRIBUTE, e))?
            as usize;
        let col_ptr = to_indices(self.read_vector::<u64>(&group, "jc")?);
        let row_idx = to_indices(self.read_vector::<u64>(&group, "ir")?);
        // Logical sparse matrices may omit `data`; every stored entry is then an edge.
        let values = if group.link_exists("data") {
            self.read_vector::<f64>(&group, "data")?
        } else {
            vec![1.0; row_idx.len()]
        };
        let cols = col_ptr.len().saturating_sub(1);
        SparseMatrix::from_csc(rows, cols, col_ptr, row_idx, values)
    }
}
