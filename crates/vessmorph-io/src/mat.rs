// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
Matrix + adjacency loader (MATLAB family).

`V` holds one `(x, y, z, radius)` row per sample and the sparse `A` is read as
an undirected graph over the samples. Samples whose degree is not 2 are
terminals; every chain of degree-2 samples between two terminals becomes one
section. Degree-2 cycles without any terminal become loop sections, and two
sections joining the same pair of terminals are fused into a single loop.

Sections are oriented by a breadth-first sweep that starts from every
degree-1 terminal at once, so attachments become roots and flow inwards.
Components without a degree-1 terminal start from their lowest terminal.
*/

use crate::builder::SectionBuilder;
use crate::factory::{morphology_name, MorphologyLoader};
use crate::mat5;
use crate::options::LoadOptions;
use crate::store::{open_container, ArrayStore};
use ahash::{AHashMap, AHashSet};
use ndarray::Array2;
use roaring::RoaringBitmap;
use std::collections::VecDeque;
use std::path::Path;
use tracing::{debug, warn};
use vessmorph_structures::{
    Morphology, MorphologyError, MorphologyResult, Sample, TaskControl, Vec3,
};

pub const VERTICES_ARRAY: &str = "V";
pub const ADJACENCY_ARRAY: &str = "A";

/// Loader for `.mat` files holding `V` and `A`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatLoader {
    options: LoadOptions,
}

impl MatLoader {
    pub fn new(options: LoadOptions) -> Self {
        MatLoader { options }
    }

    /// Loads a morphology from the `V` and `A` arrays of `store`.
    ///
    /// `V` stored transposed (4 × N, as MATLAB writes column-major data) is
    /// turned back into N × 4.
    ///
    /// # Errors
    /// [`MorphologyError::Format`] if `V` is not N × 4 or `A` is not N × N.
    pub fn load_from_store(
        &self,
        name: &str,
        store: &dyn ArrayStore,
        control: &TaskControl,
    ) -> MorphologyResult<Morphology> {
        let vertices = oriented_vertices(store.dense(VERTICES_ARRAY)?)?;
        let adjacency = store.sparse(ADJACENCY_ARRAY)?;
        let count = vertices.nrows();
        if adjacency.rows() != count || adjacency.cols() != count {
            return Err(MorphologyError::format(format!(
                "'{}' is {}x{} but '{}' has {} samples",
                ADJACENCY_ARRAY,
                adjacency.rows(),
                adjacency.cols(),
                VERTICES_ARRAY,
                count
            )));
        }

        let graph = SampleGraph::from_edges(count, adjacency.edges());
        let paths = graph.extract_paths(control)?;
        let sections = orient_and_fuse(&graph, paths);
        debug!(
            target: "vessmorph-io",
            "MAT '{}': {} samples, {} terminals, {} sections",
            name,
            count,
            graph.terminals().count(),
            sections.len()
        );

        let sample_at = |row: usize| {
            let point = Vec3::from_f64(vertices[[row, 0]], vertices[[row, 1]], vertices[[row, 2]]);
            Sample::new(point, vertices[[row, 3]] as f32, row as i64).with_series_index(row)
        };
        let mut builder = SectionBuilder::new(name);
        for path in &sections {
            builder.push_section(path.iter().map(|&row| sample_at(row)).collect());
        }
        let section_count = builder.number_sections();
        let mut morphology = builder.link_by_shared_terminals(control)?;
        morphology.set_loaded_counts(count, section_count);
        self.options.apply(&mut morphology);
        Ok(morphology)
    }
}

impl MorphologyLoader for MatLoader {
    fn format_name(&self) -> &'static str {
        "mat"
    }

    /// Level-5 files (`-v6`, `-v7`) are decoded directly; anything else is
    /// opened as an HDF5 container (`-v7.3`).
    fn load(&self, path: &Path, control: &TaskControl) -> MorphologyResult<Morphology> {
        let name = morphology_name(path);
        if mat5::has_level5_header(path)? {
            let store = mat5::open_level5(path)?;
            return self.load_from_store(&name, &store, control);
        }
        let store = open_container(path)?;
        self.load_from_store(&name, &store, control)
    }
}

fn oriented_vertices(vertices: Array2<f64>) -> MorphologyResult<Array2<f64>> {
    if vertices.ncols() == 4 {
        return Ok(vertices);
    }
    if vertices.nrows() == 4 {
        return Ok(vertices.t().to_owned());
    }
    Err(MorphologyError::format(format!(
        "'{}' must be N x 4 (x, y, z, radius), found {}x{}",
        VERTICES_ARRAY,
        vertices.nrows(),
        vertices.ncols()
    )))
}

/// Undirected sample graph with sorted, deduplicated neighbor lists.
struct SampleGraph {
    neighbors: Vec<Vec<usize>>,
}

impl SampleGraph {
    fn from_edges(count: usize, edges: impl Iterator<Item = (usize, usize)>) -> Self {
        let mut neighbors = vec![Vec::new(); count];
        for (a, b) in edges {
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
        for list in neighbors.iter_mut() {
            list.sort_unstable();
            list.dedup();
        }
        SampleGraph { neighbors }
    }

    fn degree(&self, sample: usize) -> usize {
        self.neighbors[sample].len()
    }

    fn is_terminal(&self, sample: usize) -> bool {
        self.degree(sample) != 2
    }

    fn terminals(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.neighbors.len()).filter(|&s| self.is_terminal(s))
    }

    /// The neighbor of a degree-2 sample that is not `previous`.
    fn step(&self, previous: usize, current: usize) -> Option<usize> {
        self.neighbors[current].iter().copied().find(|&n| n != previous)
    }

    /// Every terminal-to-terminal chain once, then every terminal-free cycle.
    fn extract_paths(&self, control: &TaskControl) -> MorphologyResult<Vec<Vec<usize>>> {
        let count = self.neighbors.len();
        let mut paths = Vec::new();
        let mut seen: AHashSet<Vec<usize>> = AHashSet::new();
        let mut covered = RoaringBitmap::new();

        for terminal in self.terminals() {
            control.checkpoint()?;
            covered.insert(terminal as u32);
            if self.degree(terminal) == 0 {
                paths.push(vec![terminal]);
                continue;
            }
            for &first in &self.neighbors[terminal] {
                let mut path = vec![terminal, first];
                let (mut previous, mut current) = (terminal, first);
                while !self.is_terminal(current) {
                    covered.insert(current as u32);
                    let Some(next) = self.step(previous, current) else {
                        break;
                    };
                    path.push(next);
                    previous = current;
                    current = next;
                }
                if seen.insert(canonical(&path)) {
                    paths.push(path);
                }
            }
            control.report(terminal as u64 + 1, count as u64);
        }

        for start in 0..count {
            if covered.contains(start as u32) || self.is_terminal(start) {
                continue;
            }
            let mut path = vec![start];
            covered.insert(start as u32);
            let (mut previous, mut current) = (start, self.neighbors[start][0]);
            while current != start {
                covered.insert(current as u32);
                path.push(current);
                let Some(next) = self.step(previous, current) else {
                    break;
                };
                previous = current;
                current = next;
            }
            path.push(start);
            paths.push(path);
        }
        control.report(count as u64, count as u64);
        Ok(paths)
    }
}

/// Direction-independent key of a path.
fn canonical(path: &[usize]) -> Vec<usize> {
    let reversed: Vec<usize> = path.iter().rev().copied().collect();
    if reversed.as_slice() < path {
        reversed
    } else {
        path.to_vec()
    }
}

/// Orients every chain away from the degree-1 terminals and fuses parallel chains into loops.
fn orient_and_fuse(graph: &SampleGraph, mut paths: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    let mut incident: AHashMap<usize, Vec<usize>> = AHashMap::new();
    for (id, path) in paths.iter().enumerate() {
        let (Some(&a), Some(&b)) = (path.first(), path.last()) else {
            continue;
        };
        if path.len() < 2 || a == b {
            continue;
        }
        incident.entry(a).or_default().push(id);
        incident.entry(b).or_default().push(id);
    }

    let mut oriented = vec![false; paths.len()];
    let mut reached = RoaringBitmap::new();
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut seeds: Vec<usize> = graph.terminals().filter(|&t| graph.degree(t) == 1).collect();
    let mut remaining: Vec<usize> = graph.terminals().filter(|&t| graph.degree(t) > 1).collect();
    seeds.reverse();
    remaining.reverse();

    loop {
        if queue.is_empty() {
            // All degree-1 terminals seed the first sweep together.
            while let Some(seed) = seeds.pop() {
                if reached.insert(seed as u32) {
                    queue.push_back(seed);
                }
            }
            if queue.is_empty() {
                match remaining.pop() {
                    Some(t) if reached.insert(t as u32) => queue.push_back(t),
                    Some(_) => continue,
                    None => break,
                }
            }
        }
        let Some(terminal) = queue.pop_front() else {
            break;
        };
        for &id in incident.get(&terminal).map(|v| v.as_slice()).unwrap_or(&[]) {
            if oriented[id] {
                continue;
            }
            oriented[id] = true;
            if paths[id].first() != Some(&terminal) {
                paths[id].reverse();
            }
            if let Some(&other) = paths[id].last() {
                if reached.insert(other as u32) {
                    queue.push_back(other);
                }
            }
        }
    }

    fuse_parallel(paths)
}

/// Replaces each pair of sections joining the same two terminals by one loop section.
///
/// Both members of a pair are oriented from the same terminal, which anchors the loop.
fn fuse_parallel(paths: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    let mut partner: AHashMap<(usize, usize), usize> = AHashMap::new();
    let mut fused_into: AHashMap<usize, usize> = AHashMap::new();
    for (id, path) in paths.iter().enumerate() {
        let (Some(&a), Some(&b)) = (path.first(), path.last()) else {
            continue;
        };
        if path.len() < 2 || a == b {
            continue;
        }
        let key = (a.min(b), a.max(b));
        match partner.remove(&key) {
            Some(first) => {
                fused_into.insert(id, first);
            }
            None => {
                partner.insert(key, id);
            }
        }
    }

    let mut second_of: AHashMap<usize, usize> = AHashMap::new();
    for (&second, &first) in &fused_into {
        second_of.insert(first, second);
    }

    let mut sections = Vec::with_capacity(paths.len() - fused_into.len());
    for (id, path) in paths.iter().enumerate() {
        if fused_into.contains_key(&id) {
            continue;
        }
        match second_of.get(&id) {
            Some(&second) => {
                let mut fused = path.clone();
                let mut back = paths[second].clone();
                if back.first() != path.first() {
                    warn!(
                        target: "vessmorph-io",
                        "Parallel sections {} and {} are oriented apart; fusing anyway", id, second
                    );
                    back.reverse();
                }
                fused.extend(back.iter().rev().skip(1));
                sections.push(fused);
            }
            None => sections.push(path.clone()),
        }
    }
    sections
}
