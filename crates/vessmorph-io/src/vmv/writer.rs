// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

use super::*;
use ahash::AHashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;
use vessmorph_config::OutputConfig;
use vessmorph_structures::{Morphology, MorphologyError, MorphologyResult, Sample};

pub const DEFAULT_PRECISION: usize = 2;

/// Serializes a [`Morphology`] as VMV text.
///
/// Samples that are the same point of the graph share one vertex: samples
/// with equal indices, and the last sample of a parent with the first sample
/// of each child (H5 files repeat the branching point under a new index).
/// Vertices are numbered in section order of first encounter. Auxiliary
/// samples get a vertex of their own unless they sit on a parent/child joint.
#[derive(Debug, Clone, Copy)]
pub struct VmvWriter {
    precision: usize,
}

impl Default for VmvWriter {
    fn default() -> Self {
        VmvWriter {
            precision: DEFAULT_PRECISION,
        }
    }
}

/// Disjoint sets over sample slots.
struct Joints {
    parent: Vec<usize>,
}

impl Joints {
    fn new(count: usize) -> Self {
        Joints {
            parent: (0..count).collect(),
        }
    }

    fn find(&mut self, mut slot: usize) -> usize {
        while self.parent[slot] != slot {
            self.parent[slot] = self.parent[self.parent[slot]];
            slot = self.parent[slot];
        }
        slot
    }

    fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        // The earlier slot stays the representative.
        if a < b {
            self.parent[b] = a;
        } else if b < a {
            self.parent[a] = b;
        }
    }
}

/// Vertex table and strands of one morphology.
struct Layout<'a> {
    vertices: Vec<&'a Sample>,
    strands: Vec<Vec<usize>>,
}

impl<'a> Layout<'a> {
    fn of(morphology: &'a Morphology) -> Self {
        let sections = morphology.sections();
        let mut offsets = Vec::with_capacity(sections.len());
        let mut slots: Vec<&Sample> = Vec::new();
        for section in sections {
            offsets.push(slots.len());
            slots.extend(section.samples.iter());
        }

        let mut joints = Joints::new(slots.len());
        let mut first_slot_of: AHashMap<i64, usize> = AHashMap::new();
        for (slot, sample) in slots.iter().enumerate() {
            if sample.is_auxiliary() {
                continue;
            }
            let first = *first_slot_of.entry(sample.index).or_insert(slot);
            joints.union(first, slot);
        }
        for (id, section) in sections.iter().enumerate() {
            let Some(last) = section.samples.len().checked_sub(1) else {
                continue;
            };
            for &child in &section.children {
                let child = child as usize;
                if sections.get(child).map_or(true, |c| c.samples.is_empty()) {
                    continue;
                }
                joints.union(offsets[id] + last, offsets[child]);
            }
        }

        let mut vertex_of: AHashMap<usize, usize> = AHashMap::new();
        let mut vertices: Vec<&Sample> = Vec::new();
        let mut strands = Vec::with_capacity(sections.len());
        for (id, section) in sections.iter().enumerate() {
            let strand = (0..section.samples.len())
                .map(|position| {
                    let slot = offsets[id] + position;
                    let representative = joints.find(slot);
                    *vertex_of.entry(representative).or_insert_with(|| {
                        vertices.push(slots[representative]);
                        vertices.len()
                    })
                })
                .collect();
            strands.push(strand);
        }
        Layout { vertices, strands }
    }
}

impl VmvWriter {
    pub fn new(precision: usize) -> Self {
        VmvWriter { precision }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        VmvWriter::new(config.vmv_precision)
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Writes `morphology` to `out`.
    ///
    /// # Errors
    /// [`MorphologyError::Io`] if the sink fails.
    pub fn write<W: Write>(&self, morphology: &Morphology, out: W) -> MorphologyResult<()> {
        self.write_layout(morphology, out)
            .map_err(|e| MorphologyError::io("-", e))
    }

    /// Writes `morphology` to a new file at `path`.
    pub fn write_to_path(&self, morphology: &Morphology, path: &Path) -> MorphologyResult<()> {
        let file = File::create(path).map_err(|e| MorphologyError::io(path, e))?;
        self.write_layout(morphology, BufWriter::new(file))
            .map_err(|e| MorphologyError::io(path, e))?;
        debug!(target: "vessmorph-io", "Wrote VMV '{}' to {}", morphology.name(), path.display());
        Ok(())
    }

    /// VMV text of `morphology`.
    pub fn to_string(&self, morphology: &Morphology) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_layout(morphology, &mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn write_layout<W: Write>(&self, morphology: &Morphology, mut out: W) -> std::io::Result<()> {
        let layout = Layout::of(morphology);
        let p = self.precision;

        writeln!(out, "{}", PARAM_BEGIN)?;
        writeln!(out, "{}   {}", NUM_VERTS, layout.vertices.len())?;
        writeln!(out, "{} {}", NUM_STRANDS, layout.strands.len())?;
        writeln!(out, "{} 4", NUM_ATTRIB_PER_VERT)?;
        writeln!(out, "{}", PARAM_END)?;
        writeln!(out)?;

        writeln!(out, "{}", VERT_LIST_BEGIN)?;
        for (i, sample) in layout.vertices.iter().enumerate() {
            let point = sample.point;
            writeln!(
                out,
                "{}\t{:.p$}\t{:.p$}\t{:.p$}\t{:.p$}",
                i + 1,
                point.x,
                point.y,
                point.z,
                sample.radius,
                p = p
            )?;
        }
        writeln!(out, "{}", VERT_LIST_END)?;
        writeln!(out)?;

        writeln!(out, "{}", STRANDS_LIST_BEGIN)?;
        for (section, strand) in layout.strands.iter().enumerate() {
            write!(out, "{}", section)?;
            for vertex in strand {
                write!(out, " {}", vertex)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "{}", STRANDS_LIST_END)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vmv::VmvReader;
    use vessmorph_structures::{Section, TaskControl, Vec3};

    fn sample(x: f32, y: f32, radius: f32, index: i64) -> Sample {
        Sample::new(Vec3::new(x, y, 0.0), radius, index)
    }

    fn fork() -> Morphology {
        let root = Section::new(0, vec![sample(0.0, 0.0, 1.0, 0), sample(1.0, 0.0, 1.0, 1)]);
        let left = Section::new(1, vec![sample(1.0, 0.0, 1.0, 1), sample(2.0, 1.0, 0.5, 2)]);
        let right = Section::new(2, vec![sample(1.0, 0.0, 1.0, 1), sample(2.0, -1.0, 0.5, 3)]);
        let mut sections = vec![root, left, right];
        sections[0].children = vec![1, 2];
        sections[1].parents = vec![0];
        sections[2].parents = vec![0];
        Morphology::assemble("fork", sections).unwrap()
    }

    #[test]
    fn test_exact_text() {
        let text = VmvWriter::default().to_string(&fork());
        let expected = "$PARAM_BEGIN
NUM_VERTS   4
NUM_STRANDS 3
NUM_ATTRIB_PER_VERT 4
$PARAM_END

$VERT_LIST_BEGIN
1\t0.00\t0.00\t0.00\t1.00
2\t1.00\t0.00\t0.00\t1.00
3\t2.00\t1.00\t0.00\t0.50
4\t2.00\t-1.00\t0.00\t0.50
$VERT_LIST_END

$STRANDS_LIST_BEGIN
0 1 2
1 2 3
2 2 4
$STRANDS_LIST_END
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_precision() {
        let text = VmvWriter::new(4).to_string(&fork());
        assert!(text.contains("3\t2.0000\t1.0000\t0.0000\t0.5000\n"));
    }

    #[test]
    fn test_auxiliary_samples_get_own_vertices() {
        let section = Section::new(
            0,
            vec![
                sample(0.0, 0.0, 1.0, 0),
                Sample::auxiliary(Vec3::new(0.5, 0.0, 0.0), 1.0),
                Sample::auxiliary(Vec3::new(0.7, 0.0, 0.0), 1.0),
                sample(1.0, 0.0, 1.0, 1),
            ],
        );
        let morphology = Morphology::assemble("aux", vec![section]).unwrap();
        let text = VmvWriter::default().to_string(&morphology);
        assert!(text.contains("NUM_VERTS   4\n"));
        assert!(text.contains("\n0 1 2 3 4\n"));
    }

    #[test]
    fn test_reads_back() {
        let original = fork();
        let text = VmvWriter::default().to_string(&original);
        let read = VmvReader::default()
            .parse_str("fork", &text, &TaskControl::none())
            .unwrap();
        assert_eq!(read.number_sections(), 3);
        assert_eq!(read.roots(), original.roots());
        for (a, b) in original.sections().iter().zip(read.sections()) {
            assert_eq!(a.children, b.children);
            assert_eq!(a.parents, b.parents);
            for (x, y) in a.samples.iter().zip(&b.samples) {
                assert!(x.point.distance(&y.point) < 0.01);
                assert!((x.radius - y.radius).abs() < 0.01);
            }
        }
    }

    #[test]
    fn test_duplicated_branch_rows_share_a_vertex() {
        use crate::h5::{H5Loader, POINTS_DATASET, STRUCTURE_DATASET};
        use crate::store::MemoryStore;
        use ndarray::array;

        // Each child repeats the branching point (2, 0, 0) as its own row.
        let store = MemoryStore::new()
            .with_dense(
                POINTS_DATASET,
                array![
                    [0.0, 0.0, 0.0, 2.0],
                    [1.0, 0.0, 0.0, 2.0],
                    [2.0, 0.0, 0.0, 2.0],
                    [2.0, 0.0, 0.0, 2.0],
                    [3.0, 1.0, 0.0, 1.0],
                    [2.0, 0.0, 0.0, 2.0],
                    [3.0, -1.0, 0.0, 1.0],
                ],
            )
            .with_dense(
                STRUCTURE_DATASET,
                array![[0.0, 3.0, -1.0], [3.0, 3.0, 0.0], [5.0, 3.0, 0.0]],
            );
        let control = TaskControl::none();
        let original = H5Loader::default()
            .load_from_store("branch", &store, &control)
            .unwrap();
        assert_eq!(original.sections()[0].children, vec![1, 2]);

        let text = VmvWriter::default().to_string(&original);
        assert!(text.contains("NUM_VERTS   5\n"));
        assert!(text.contains("\n1 3 4\n"));
        assert!(text.contains("\n2 3 5\n"));

        let read = VmvReader::default().parse_str("branch", &text, &control).unwrap();
        assert_eq!(read.roots(), original.roots());
        for (a, b) in original.sections().iter().zip(read.sections()) {
            assert_eq!(a.children, b.children);
            assert_eq!(a.parents, b.parents);
            assert_eq!(a.number_samples(), b.number_samples());
        }
    }

    #[test]
    fn test_write_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fork.vmv");
        VmvWriter::default().write_to_path(&fork(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("$STRANDS_LIST_END\n"));

        let missing = dir.path().join("no/such/dir.vmv");
        let err = VmvWriter::default().write_to_path(&fork(), &missing).unwrap_err();
        assert_eq!(err.kind(), "io");
    }
}
