// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
Columnar parent-pointer loader (SWC family).

One record per line: `index type x y z radius parent_index`. Any line holding
a `#` is a comment and is skipped whole, as are blank lines.

Paths are maximal runs of consecutive indices where each record names its
predecessor as parent, scanned from the entry after the lowest index. Every
path is then stitched to the parent of its first record, and paths are split
into sections at the union of all path endpoints.
*/

use crate::builder::{split_at_terminals, terminal_indices, SectionBuilder};
use crate::factory::{morphology_name, read_text, MorphologyLoader};
use crate::options::LoadOptions;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};
use vessmorph_config::LoadingConfig;
use vessmorph_structures::{Morphology, MorphologyError, MorphologyResult, Sample, TaskControl, Vec3};

const TOKENS_PER_RECORD: usize = 7;
const SOMA_TYPE: i64 = 1;
const NO_PARENT: i64 = -1;

/// One parsed SWC line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwcRecord {
    pub index: i64,
    pub sample_type: i64,
    pub point: Vec3,
    pub radius: f32,
    pub parent: i64,
    /// Position of the record in the file, used as its simulation row
    pub order: usize,
}

/// Loader for `.swc` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwcLoader {
    options: LoadOptions,
}

impl SwcLoader {
    pub fn new(options: LoadOptions) -> Self {
        SwcLoader { options }
    }

    pub fn from_config(config: &LoadingConfig) -> Self {
        SwcLoader::new(LoadOptions::from_config(config))
    }

    /// Loads a morphology from SWC text.
    ///
    /// # Errors
    /// [`MorphologyError::Parse`] for a malformed line, a non-numeric token,
    /// a duplicate or negative index, or a parent below `-1`.
    pub fn parse_str(&self, name: &str, text: &str, control: &TaskControl) -> MorphologyResult<Morphology> {
        let records = parse_records(text)?;
        let record_count = records.len();
        let origin = translation_origin(&records);

        let table: BTreeMap<i64, SwcRecord> = records.into_iter().map(|r| (r.index, r)).collect();
        let paths = reconstruct_paths(&table);
        let terminals = terminal_indices(&paths);

        let mut builder = SectionBuilder::new(name);
        for path in &paths {
            control.checkpoint()?;
            for run in split_at_terminals(path, &terminals) {
                let samples = run
                    .iter()
                    .filter_map(|index| table.get(index))
                    .map(|r| Sample::new(r.point, r.radius, r.index).with_series_index(r.order))
                    .collect();
                builder.push_section(samples);
            }
        }
        let section_count = builder.number_sections();
        debug!(
            target: "vessmorph-io",
            "SWC '{}': {} records, {} paths, {} terminals, {} sections",
            name,
            record_count,
            paths.len(),
            terminals.len(),
            section_count
        );

        let mut morphology = builder.link_by_shared_terminals(control)?;
        morphology.set_loaded_counts(record_count, section_count);
        morphology.set_origin(origin);
        self.options.apply(&mut morphology);
        Ok(morphology)
    }
}

impl MorphologyLoader for SwcLoader {
    fn format_name(&self) -> &'static str {
        "swc"
    }

    fn load(&self, path: &Path, control: &TaskControl) -> MorphologyResult<Morphology> {
        let text = read_text(path)?;
        self.parse_str(&morphology_name(path), &text, control)
    }
}

/// Parses every record of an SWC text in file order.
///
/// # Errors
/// [`MorphologyError::Parse`] with the 1-based line (and column for token errors).
pub fn parse_records(text: &str) -> MorphologyResult<Vec<SwcRecord>> {
    let mut records = Vec::new();
    let mut seen = ahash::AHashSet::new();
    for (number, line) in text.lines().enumerate() {
        let line_number = number + 1;
        if line.contains('#') || line.trim().is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != TOKENS_PER_RECORD {
            return Err(MorphologyError::parse(
                line_number,
                format!("expected {} tokens, found {}", TOKENS_PER_RECORD, tokens.len()),
            ));
        }

        let integer = |column: usize| -> MorphologyResult<i64> {
            tokens[column].parse::<i64>().map_err(|_| {
                MorphologyError::parse_at(
                    line_number,
                    column + 1,
                    format!("'{}' is not an integer", tokens[column]),
                )
            })
        };
        let float = |column: usize| -> MorphologyResult<f32> {
            tokens[column].parse::<f32>().map_err(|_| {
                MorphologyError::parse_at(
                    line_number,
                    column + 1,
                    format!("'{}' is not a number", tokens[column]),
                )
            })
        };

        let index = integer(0)?;
        let sample_type = integer(1)?;
        let point = Vec3::new(float(2)?, float(3)?, float(4)?);
        let radius = float(5)?;
        let parent = integer(6)?;

        if index < 0 {
            return Err(MorphologyError::parse_at(
                line_number,
                1,
                format!("negative sample index {}", index),
            ));
        }
        if parent < NO_PARENT {
            return Err(MorphologyError::parse_at(
                line_number,
                7,
                format!("parent index {} is below {}", parent, NO_PARENT),
            ));
        }
        if !seen.insert(index) {
            return Err(MorphologyError::parse_at(
                line_number,
                1,
                format!("duplicate sample index {}", index),
            ));
        }
        records.push(SwcRecord {
            index,
            sample_type,
            point,
            radius,
            parent,
            order: records.len(),
        });
    }
    Ok(records)
}

/// Position of the first non-soma record when it starts a tree.
fn translation_origin(records: &[SwcRecord]) -> Option<Vec3> {
    records
        .iter()
        .find(|r| r.sample_type != SOMA_TYPE)
        .filter(|r| r.parent == NO_PARENT)
        .map(|r| r.point)
}

/// Chains of consecutive indices, each stitched to its first record's parent.
fn reconstruct_paths(table: &BTreeMap<i64, SwcRecord>) -> Vec<Vec<i64>> {
    let mut paths: Vec<Vec<i64>> = Vec::new();
    let mut current: Vec<i64> = Vec::new();
    // The lowest entry is the soma or tree start; it is reached through stitching.
    for (&index, record) in table.iter().skip(1) {
        let continues = current
            .last()
            .map(|&previous| previous + 1 == index && record.parent == previous)
            .unwrap_or(false);
        if !continues && !current.is_empty() {
            paths.push(std::mem::take(&mut current));
        }
        current.push(index);
    }
    if !current.is_empty() {
        paths.push(current);
    }

    for path in paths.iter_mut() {
        let Some(first) = path.first().and_then(|index| table.get(index)) else {
            continue;
        };
        if first.parent == NO_PARENT {
            continue;
        }
        if table.contains_key(&first.parent) {
            path.insert(0, first.parent);
        } else {
            warn!(
                target: "vessmorph-io",
                "Sample {} names missing parent {}; its path starts a new tree",
                first.index,
                first.parent
            );
        }
    }

    // A lowest record nothing stitches to (single-record file, or a root
    // followed by an unrelated tree) becomes a one-sample section.
    if let Some(&lowest) = table.keys().next() {
        if !paths.iter().any(|path| path.contains(&lowest)) {
            paths.insert(0, vec![lowest]);
        }
    }
    paths
}
