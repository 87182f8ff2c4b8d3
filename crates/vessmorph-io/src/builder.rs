// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
The path/section builder shared by the loaders.

Loaders hand over sections as plain sample runs. The builder assigns dense
section indices, wires parent/child links, derives the roots and computes
the bounding box once.

Two linking rules are available:
- [`SectionBuilder::link_by_shared_terminals`]: a section is a child of every
  other section whose last sample has the index of its first sample.
- [`SectionBuilder::link_with_edges`]: explicit `(parent, child)` pairs.
*/

use ahash::{AHashMap, AHashSet};
use tracing::{debug, trace};
use vessmorph_structures::{
    Morphology, MorphologyError, MorphologyResult, Sample, Section, SectionId, TaskControl,
};

/// Collects sample runs and turns them into a linked [`Morphology`].
#[derive(Debug, Default)]
pub struct SectionBuilder {
    name: String,
    runs: Vec<Vec<Sample>>,
}

impl SectionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        SectionBuilder {
            name: name.into(),
            runs: Vec::new(),
        }
    }

    /// Adds one section and returns the index it will carry.
    pub fn push_section(&mut self, samples: Vec<Sample>) -> SectionId {
        self.runs.push(samples);
        (self.runs.len() - 1) as SectionId
    }

    pub fn number_sections(&self) -> usize {
        self.runs.len()
    }

    /// Links sections whose first sample index equals another section's last sample index.
    ///
    /// A section is never its own parent, so loop sections only link to
    /// their neighbors. Auxiliary samples never match.
    ///
    /// # Errors
    /// [`MorphologyError::InvariantViolation`] if the linked sections break
    /// an invariant; [`MorphologyError::Cancelled`] if `control` is aborted.
    pub fn link_by_shared_terminals(self, control: &TaskControl) -> MorphologyResult<Morphology> {
        let mut ends_at: AHashMap<i64, Vec<SectionId>> = AHashMap::new();
        for (id, run) in self.runs.iter().enumerate() {
            if let Some(last) = run.last().filter(|s| !s.is_auxiliary()) {
                ends_at.entry(last.index).or_default().push(id as SectionId);
            }
        }

        let mut edges = Vec::new();
        for (id, run) in self.runs.iter().enumerate() {
            control.checkpoint()?;
            let Some(first) = run.first().filter(|s| !s.is_auxiliary()) else {
                continue;
            };
            if let Some(parents) = ends_at.get(&first.index) {
                for &parent in parents.iter().filter(|&&p| p as usize != id) {
                    edges.push((parent, id as SectionId));
                }
            }
        }
        self.finish(edges, control)
    }

    /// Links sections with explicit `(parent, child)` pairs.
    ///
    /// Repeated pairs are linked once.
    ///
    /// # Errors
    /// [`MorphologyError::InvariantViolation`] if a pair names a missing
    /// section or the result breaks an invariant.
    pub fn link_with_edges(
        self,
        edges: &[(SectionId, SectionId)],
        control: &TaskControl,
    ) -> MorphologyResult<Morphology> {
        let count = self.runs.len();
        if let Some(&(parent, child)) = edges
            .iter()
            .find(|(p, c)| *p as usize >= count || *c as usize >= count)
        {
            return Err(MorphologyError::invariant(format!(
                "link {} -> {} names a missing section ({} sections)",
                parent, child, count
            )));
        }
        self.finish(edges.to_vec(), control)
    }

    fn finish(
        self,
        edges: Vec<(SectionId, SectionId)>,
        control: &TaskControl,
    ) -> MorphologyResult<Morphology> {
        let total = self.runs.len() as u64;
        let mut sections: Vec<Section> = self
            .runs
            .into_iter()
            .enumerate()
            .map(|(id, samples)| Section::new(id as SectionId, samples))
            .collect();

        let mut seen = AHashSet::new();
        for (parent, child) in edges {
            if !seen.insert((parent, child)) {
                continue;
            }
            trace!(target: "vessmorph-io", "Linking section {} -> {}", parent, child);
            sections[parent as usize].children.push(child);
            sections[child as usize].parents.push(parent);
        }
        control.report(total, total);

        let mut morphology = Morphology::assemble(self.name, sections)?;
        morphology.recompute_bounding_box();
        debug!(
            target: "vessmorph-io",
            "Built '{}' with {} sections ({} loops)",
            morphology.name(),
            morphology.number_sections(),
            morphology.sections().iter().filter(|s| s.is_loop).count()
        );
        Ok(morphology)
    }
}

/// Sorted, deduplicated first and last entries of every path.
pub fn terminal_indices(paths: &[Vec<i64>]) -> Vec<i64> {
    let mut terminals: Vec<i64> = paths
        .iter()
        .flat_map(|path| path.first().into_iter().chain(path.last()))
        .copied()
        .collect();
    terminals.sort_unstable();
    terminals.dedup();
    terminals
}

/// Splits `path` at every interior occurrence of a terminal.
///
/// Each split point ends one run and starts the next, so consecutive runs
/// share their terminal. A path without interior terminals is returned whole.
pub fn split_at_terminals(path: &[i64], terminals: &[i64]) -> Vec<Vec<i64>> {
    if path.len() < 2 {
        return vec![path.to_vec()];
    }
    let mut runs = Vec::new();
    let mut start = 0;
    for position in 1..path.len() - 1 {
        if terminals.binary_search(&path[position]).is_ok() {
            runs.push(path[start..=position].to_vec());
            start = position;
        }
    }
    runs.push(path[start..].to_vec());
    runs
}
