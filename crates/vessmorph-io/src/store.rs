// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
Named numeric arrays, the common ground of the container-based loaders.

The HDF-style and matrix loaders read their inputs through [`ArrayStore`], so
they run the same way against an HDF5 file (`Hdf5Store`, behind the `hdf5`
feature) and against arrays assembled in memory ([`MemoryStore`]).
*/

use ahash::AHashMap;
use ndarray::Array2;
use std::path::Path;
use vessmorph_structures::{MorphologyError, MorphologyResult};

/// Read access to the named arrays of a container.
pub trait ArrayStore {
    fn contains(&self, name: &str) -> bool;

    /// Dense 2-D array. One-dimensional datasets come back as a single column.
    fn dense(&self, name: &str) -> MorphologyResult<Array2<f64>>;

    fn sparse(&self, name: &str) -> MorphologyResult<SparseMatrix>;
}

/// Compressed sparse column matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<f64>,
}

impl SparseMatrix {
    /// Builds a matrix from raw CSC arrays.
    ///
    /// # Errors
    /// [`MorphologyError::Format`] if the arrays are inconsistent.
    pub fn from_csc(
        rows: usize,
        cols: usize,
        col_ptr: Vec<usize>,
        row_idx: Vec<usize>,
        values: Vec<f64>,
    ) -> MorphologyResult<Self> {
        if col_ptr.len() != cols + 1 {
            return Err(MorphologyError::format(format!(
                "sparse matrix with {} columns needs {} column pointers, found {}",
                cols,
                cols + 1,
                col_ptr.len()
            )));
        }
        if row_idx.len() != values.len() {
            return Err(MorphologyError::format(format!(
                "sparse matrix has {} row indices but {} values",
                row_idx.len(),
                values.len()
            )));
        }
        if col_ptr.first() != Some(&0)
            || col_ptr.windows(2).any(|w| w[0] > w[1])
            || col_ptr.last() != Some(&row_idx.len())
        {
            return Err(MorphologyError::format(
                "sparse matrix column pointers are not a monotone cover of the entries",
            ));
        }
        if let Some(&row) = row_idx.iter().find(|&&r| r >= rows) {
            return Err(MorphologyError::format(format!(
                "sparse matrix row index {} out of range ({} rows)",
                row, rows
            )));
        }
        Ok(SparseMatrix {
            rows,
            cols,
            col_ptr,
            row_idx,
            values,
        })
    }

    /// Builds a matrix from `(row, col, value)` entries; repeated positions are summed.
    ///
    /// # Errors
    /// [`MorphologyError::Format`] if an entry lies outside `rows × cols`.
    pub fn from_triplets(
        rows: usize,
        cols: usize,
        triplets: &[(usize, usize, f64)],
    ) -> MorphologyResult<Self> {
        let mut entries = triplets.to_vec();
        if let Some(&(r, c, _)) = entries.iter().find(|(r, c, _)| *r >= rows || *c >= cols) {
            return Err(MorphologyError::format(format!(
                "entry ({}, {}) outside a {}x{} matrix",
                r, c, rows, cols
            )));
        }
        entries.sort_by_key(|&(r, c, _)| (c, r));

        let mut col_ptr = vec![0usize; cols + 1];
        let mut row_idx: Vec<usize> = Vec::with_capacity(entries.len());
        let mut values: Vec<f64> = Vec::with_capacity(entries.len());
        let mut last: Option<(usize, usize)> = None;
        for (r, c, v) in entries {
            if last == Some((r, c)) {
                if let Some(value) = values.last_mut() {
                    *value += v;
                }
                continue;
            }
            last = Some((r, c));
            row_idx.push(r);
            values.push(v);
            col_ptr[c + 1] += 1;
        }
        for c in 0..cols {
            col_ptr[c + 1] += col_ptr[c];
        }
        Ok(SparseMatrix {
            rows,
            cols,
            col_ptr,
            row_idx,
            values,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored entries, explicit zeros included.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        if col >= self.cols {
            return 0.0;
        }
        (self.col_ptr[col]..self.col_ptr[col + 1])
            .filter(|&k| self.row_idx[k] == row)
            .map(|k| self.values[k])
            .sum()
    }

    /// Every stored `(row, col, value)` in column order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.cols).flat_map(move |c| {
            (self.col_ptr[c]..self.col_ptr[c + 1]).map(move |k| (self.row_idx[k], c, self.values[k]))
        })
    }

    /// Graph edges `(row, col)`: non-zero entries off the diagonal.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries()
            .filter(|&(r, c, v)| r != c && v != 0.0)
            .map(|(r, c, _)| (r, c))
    }
}

/// Arrays held in memory, for tests and for hosts that decode containers themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    dense: AHashMap<String, Array2<f64>>,
    sparse: AHashMap<String, SparseMatrix>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_dense(mut self, name: impl Into<String>, array: Array2<f64>) -> Self {
        self.insert_dense(name, array);
        self
    }

    pub fn with_sparse(mut self, name: impl Into<String>, matrix: SparseMatrix) -> Self {
        self.insert_sparse(name, matrix);
        self
    }

    pub fn insert_dense(&mut self, name: impl Into<String>, array: Array2<f64>) {
        self.dense.insert(name.into(), array);
    }

    pub fn insert_sparse(&mut self, name: impl Into<String>, matrix: SparseMatrix) {
        self.sparse.insert(name.into(), matrix);
    }
}

impl ArrayStore for MemoryStore {
    fn contains(&self, name: &str) -> bool {
        self.dense.contains_key(name) || self.sparse.contains_key(name)
    }

    fn dense(&self, name: &str) -> MorphologyResult<Array2<f64>> {
        self.dense
            .get(name)
            .cloned()
            .ok_or_else(|| MorphologyError::format(format!("dense array '{}' is missing", name)))
    }

    fn sparse(&self, name: &str) -> MorphologyResult<SparseMatrix> {
        self.sparse
            .get(name)
            .cloned()
            .ok_or_else(|| MorphologyError::format(format!("sparse array '{}' is missing", name)))
    }
}

/// Opens an HDF5 container (`.h5`, MATLAB v7.3 `.mat`).
#[cfg(feature = "hdf5")]
pub(crate) fn open_container(path: &Path) -> MorphologyResult<crate::hdf5_store::Hdf5Store> {
    crate::hdf5_store::Hdf5Store::open(path)
}

/// Without the `hdf5` feature, containers cannot be opened.
#[cfg(not(feature = "hdf5"))]
pub(crate) fn open_container(path: &Path) -> MorphologyResult<MemoryStore> {
    if !path.exists() {
        return Err(MorphologyError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        ));
    }
    Err(MorphologyError::format(format!(
        "{}: reading HDF5 containers needs the 'hdf5' feature",
        path.display()
    )))
}
