// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
Rectangular tables produced by the kernels.

A [`DataFrame`] has a fixed list of column names and rows of [`Cell`]s.
Tables serialize to CSV (header row first) or to JSON as an array of
records keyed by column name.
*/

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use vessmorph_config::TableFormat;
use vessmorph_structures::{MorphologyError, MorphologyResult};

/// One table value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Float(f64),
}

impl Cell {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Cell::Int(v) => v as f64,
            Cell::Float(v) => v,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Int(value as i64)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Int(value as i64)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<f32> for Cell {
    fn from(value: f32) -> Self {
        Cell::Float(value as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    name: String,
    columns: Vec<&'static str>,
    rows: Vec<Vec<Cell>>,
}

impl DataFrame {
    pub fn new(name: impl Into<String>, columns: &[&'static str]) -> Self {
        DataFrame {
            name: name.into(),
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn number_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row.
    ///
    /// # Errors
    /// [`MorphologyError::InvariantViolation`] if the row width differs from the column count.
    pub fn push_row(&mut self, row: Vec<Cell>) -> MorphologyResult<()> {
        if row.len() != self.columns.len() {
            return Err(MorphologyError::invariant(format!(
                "table '{}' has {} columns, row has {} values",
                self.name,
                self.columns.len(),
                row.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == name)
    }

    /// Values of the named column as `f64`.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[index].as_f64()).collect())
    }

    pub fn value(&self, row: usize, column: &str) -> Option<Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| r[index])
    }

    /// Writes the table as CSV with a header row.
    pub fn write_csv<W: Write>(&self, out: W) -> MorphologyResult<()> {
        self.write_csv_inner(out)
            .map_err(|e| MorphologyError::io("-", e.into()))
    }

    fn write_csv_inner<W: Write>(&self, out: W) -> Result<(), csv::Error> {
        let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(out);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Records orientation: one JSON object per row.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.rows
                .iter()
                .map(|row| {
                    let record = self
                        .columns
                        .iter()
                        .zip(row)
                        .map(|(column, cell)| (column.to_string(), cell_to_json(cell)))
                        .collect();
                    serde_json::Value::Object(record)
                })
                .collect(),
        )
    }

    /// Writes `{name}.csv` or `{name}.json` into `dir`, returning the path written.
    pub fn write_to_dir(&self, dir: &Path, format: TableFormat) -> MorphologyResult<PathBuf> {
        let path = dir.join(format!("{}.{}", self.name, format.extension()));
        let file = File::create(&path).map_err(|e| MorphologyError::io(&path, e))?;
        let mut out = BufWriter::new(file);
        match format {
            TableFormat::Json => {
                serde_json::to_writer_pretty(&mut out, &self.to_json())
                    .map_err(|e| MorphologyError::io(&path, e.into()))?;
                out.flush().map_err(|e| MorphologyError::io(&path, e))?;
            }
            TableFormat::Csv => {
                self.write_csv_inner(out)
                    .map_err(|e| MorphologyError::io(&path, e.into()))?;
            }
        }
        Ok(path)
    }
}

fn cell_to_json(cell: &Cell) -> serde_json::Value {
    match *cell {
        Cell::Int(v) => serde_json::Value::from(v),
        // Non-finite floats have no JSON form.
        Cell::Float(v) => serde_json::Number::from_f64(v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
    }
}

impl Serialize for DataFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("columns", &self.columns)?;
        map.serialize_entry("rows", &self.rows)?;
        map.end()
    }
}
