// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
Hierarchical points+structure loader (HDF family).

- `points`: rows of `(x, y, z, diameter)`
- `structure`: rows of `(first_point_index, section_type, parent_section_index)`,
  a section owning the points up to the next section's first point
- `connectivity` (optional): `(parent, child)` section pairs that replace the
  structure parents
- `radius_series`, `flow_series`, `pressure_series` (optional): one row per point

A child whose first point is not its parent's last point gets a copy of that
last sample prepended, so linked sections always touch.
*/

use crate::builder::SectionBuilder;
use crate::factory::{morphology_name, MorphologyLoader};
use crate::options::LoadOptions;
use crate::store::{open_container, ArrayStore};
use std::path::Path;
use tracing::debug;
use vessmorph_structures::{
    Morphology, MorphologyError, MorphologyResult, Sample, SectionId, SeriesKind, SimulationSeries,
    TaskControl, Vec3,
};

pub const POINTS_DATASET: &str = "points";
pub const STRUCTURE_DATASET: &str = "structure";
pub const CONNECTIVITY_DATASET: &str = "connectivity";

/// Loader for `.h5` points+structure files.
#[derive(Debug, Clone, Copy, Default)]
pub struct H5Loader {
    options: LoadOptions,
}

/// Integral value of a stored number, or a format error naming where it came from.
pub(crate) fn integral(value: f64, what: &str, row: usize) -> MorphologyResult<i64> {
    if value.is_finite() && value.fract() == 0.0 {
        Ok(value as i64)
    } else {
        Err(MorphologyError::format(format!(
            "{} in row {} is not an integer: {}",
            what, row, value
        )))
    }
}

impl H5Loader {
    pub fn new(options: LoadOptions) -> Self {
        H5Loader { options }
    }

    /// Loads a morphology from the arrays of `store`.
    ///
    /// # Errors
    /// [`MorphologyError::Format`] for missing datasets, non-monotone or
    /// out-of-range first points, empty sections, dangling parents, a child
    /// whose parents end at different points or series whose row count
    /// differs from the point count.
    pub fn load_from_store(
        &self,
        name: &str,
        store: &dyn ArrayStore,
        control: &TaskControl,
    ) -> MorphologyResult<Morphology> {
        let points = store.dense(POINTS_DATASET)?;
        let structure = store.dense(STRUCTURE_DATASET)?;
        if points.ncols() < 4 {
            return Err(MorphologyError::format(format!(
                "'{}' needs 4 columns (x, y, z, diameter), found {}",
                POINTS_DATASET,
                points.ncols()
            )));
        }
        if structure.ncols() < 3 {
            return Err(MorphologyError::format(format!(
                "'{}' needs 3 columns (first point, type, parent), found {}",
                STRUCTURE_DATASET,
                structure.ncols()
            )));
        }
        let number_points = points.nrows();
        let number_sections = structure.nrows();

        let mut firsts: Vec<usize> = Vec::with_capacity(number_sections);
        for row in 0..number_sections {
            let first = integral(structure[[row, 0]], "first point index", row)?;
            if first < 0 || first as usize >= number_points {
                return Err(MorphologyError::format(format!(
                    "section {} starts at point {} outside 0..{}",
                    row, first, number_points
                )));
            }
            let first = first as usize;
            if let Some(&previous) = firsts.last() {
                if first < previous {
                    return Err(MorphologyError::format(format!(
                        "first point indices decrease at section {} ({} after {})",
                        row, first, previous
                    )));
                }
                if first == previous {
                    return Err(MorphologyError::format(format!(
                        "section {} has no points",
                        row - 1
                    )));
                }
            }
            firsts.push(first);
        }

        let edges = if store.contains(CONNECTIVITY_DATASET) {
            connectivity_edges(store, number_sections)?
        } else {
            structure_edges(&structure, number_sections)?
        };

        let sample_at = |row: usize| {
            let point = Vec3::from_f64(points[[row, 0]], points[[row, 1]], points[[row, 2]]);
            Sample::new(point, (points[[row, 3]] / 2.0) as f32, row as i64).with_series_index(row)
        };
        let mut runs: Vec<Vec<Sample>> = firsts
            .iter()
            .enumerate()
            .map(|(section, &start)| {
                let end = firsts.get(section + 1).copied().unwrap_or(number_points);
                (start..end).map(sample_at).collect()
            })
            .collect();

        let mut stitched = vec![false; number_sections];
        for (row, &(parent, child)) in edges.iter().enumerate() {
            control.checkpoint()?;
            let (parent, child) = (parent as usize, child as usize);
            let Some(&joint) = runs[parent].last() else {
                continue;
            };
            let starts_at_joint = runs[child].first().map(|s| s.point) == Some(joint.point);
            if stitched[child] {
                // Further parents must end where the child already starts.
                if !starts_at_joint {
                    return Err(MorphologyError::format(format!(
                        "connectivity row {} makes section {} a child of {}, which ends at {:?} \
                         while the child starts at a different point",
                        row, child, parent, joint.point
                    )));
                }
                continue;
            }
            stitched[child] = true;
            if !starts_at_joint {
                runs[child].insert(0, joint);
            }
        }

        let mut builder = SectionBuilder::new(name);
        for run in runs {
            builder.push_section(run);
        }
        let mut morphology = builder.link_with_edges(&edges, control)?;
        morphology.set_loaded_counts(number_points, number_sections);

        for kind in SeriesKind::ALL {
            if !store.contains(kind.dataset_name()) {
                continue;
            }
            let values = store.dense(kind.dataset_name())?;
            if values.nrows() != number_points {
                return Err(MorphologyError::format(format!(
                    "'{}' has {} rows for {} points",
                    kind.dataset_name(),
                    values.nrows(),
                    number_points
                )));
            }
            morphology.attach_series(SimulationSeries::new(kind, values.mapv(|v| v as f32)))?;
        }

        debug!(
            target: "vessmorph-io",
            "H5 '{}': {} points, {} sections, {} links, {} simulation frames",
            name,
            number_points,
            number_sections,
            edges.len(),
            morphology.simulation().number_frames()
        );
        self.options.apply(&mut morphology);
        Ok(morphology)
    }
}

fn structure_edges(
    structure: &ndarray::Array2<f64>,
    number_sections: usize,
) -> MorphologyResult<Vec<(SectionId, SectionId)>> {
    let mut edges = Vec::new();
    for row in 0..number_sections {
        let parent = integral(structure[[row, 2]], "parent section index", row)?;
        if parent == -1 {
            continue;
        }
        if parent < 0 || parent as usize >= number_sections || parent as usize == row {
            return Err(MorphologyError::format(format!(
                "section {} names dangling parent {}",
                row, parent
            )));
        }
        edges.push((parent as SectionId, row as SectionId));
    }
    Ok(edges)
}

fn connectivity_edges(
    store: &dyn ArrayStore,
    number_sections: usize,
) -> MorphologyResult<Vec<(SectionId, SectionId)>> {
    let connectivity = store.dense(CONNECTIVITY_DATASET)?;
    if connectivity.ncols() < 2 {
        return Err(MorphologyError::format(format!(
            "'{}' needs (parent, child) columns, found {}",
            CONNECTIVITY_DATASET,
            connectivity.ncols()
        )));
    }
    let mut edges = Vec::with_capacity(connectivity.nrows());
    for row in 0..connectivity.nrows() {
        let parent = integral(connectivity[[row, 0]], "connectivity parent", row)?;
        let child = integral(connectivity[[row, 1]], "connectivity child", row)?;
        let in_range = |id: i64| id >= 0 && (id as usize) < number_sections;
        if !in_range(parent) || !in_range(child) || parent == child {
            return Err(MorphologyError::format(format!(
                "connectivity row {} links {} -> {} ({} sections)",
                row, parent, child, number_sections
            )));
        }
        edges.push((parent as SectionId, child as SectionId));
    }
    Ok(edges)
}

impl MorphologyLoader for H5Loader {
    fn format_name(&self) -> &'static str {
        "h5"
    }

    fn load(&self, path: &Path, control: &TaskControl) -> MorphologyResult<Morphology> {
        let store = open_container(path)?;
        self.load_from_store(&morphology_name(path), &store, control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use ndarray::array;

    /// Root section of three points, two children of two points each.
    fn forked_store() -> MemoryStore {
        MemoryStore::new()
            .with_dense(
                POINTS_DATASET,
                array![
                    [0.0, 0.0, 0.0, 2.0],
                    [1.0, 0.0, 0.0, 2.0],
                    [2.0, 0.0, 0.0, 2.0],
                    [3.0, 1.0, 0.0, 1.0],
                    [4.0, 2.0, 0.0, 1.0],
                    [3.0, -1.0, 0.0, 1.0],
                    [4.0, -2.0, 0.0, 1.0],
                ],
            )
            .with_dense(
                STRUCTURE_DATASET,
                array![[0.0, 3.0, -1.0], [3.0, 3.0, 0.0], [5.0, 3.0, 0.0]],
            )
    }

    fn load(store: &MemoryStore) -> MorphologyResult<Morphology> {
        H5Loader::default().load_from_store("h5", store, &TaskControl::none())
    }

    #[test]
    fn test_forked_structure() {
        let morphology = load(&forked_store()).unwrap();
        assert_eq!(morphology.number_sections(), 3);
        assert_eq!(morphology.roots(), &[0]);
        assert_eq!(morphology.sections()[0].children, vec![1, 2]);
        // Children start with a copy of the branching point.
        let child = &morphology.sections()[1];
        assert_eq!(child.number_samples(), 3);
        assert_eq!(child.samples[0].index, 2);
        assert_eq!(child.samples[0].radius, 1.0);
        assert_eq!(child.samples[1].radius, 0.5);
        assert_eq!(morphology.number_samples_as_loaded(), 7);
        assert_eq!(morphology.number_unique_samples(), 7);
    }

    #[test]
    fn test_connectivity_overrides_structure_parents() {
        let store = forked_store()
            .with_dense(CONNECTIVITY_DATASET, array![[0.0, 1.0], [1.0, 2.0]]);
        let morphology = load(&store).unwrap();
        assert_eq!(morphology.sections()[0].children, vec![1]);
        assert_eq!(morphology.sections()[1].children, vec![2]);
        assert_eq!(morphology.sections()[2].samples[0].index, 4);
    }

    #[test]
    fn test_child_with_two_parents() {
        // Sections 0 and 1 end at different points; section 2 cannot touch both.
        let diverging = forked_store()
            .with_dense(CONNECTIVITY_DATASET, array![[0.0, 2.0], [1.0, 2.0]]);
        let err = load(&diverging).unwrap_err();
        assert!(matches!(err, MorphologyError::Format { .. }));
        assert!(err.to_string().contains("connectivity row 1"));

        // Two parents meeting at one point merge into the child.
        let merging = MemoryStore::new()
            .with_dense(
                POINTS_DATASET,
                array![
                    [0.0, 1.0, 0.0, 1.0],
                    [1.0, 0.0, 0.0, 1.0],
                    [0.0, -1.0, 0.0, 1.0],
                    [1.0, 0.0, 0.0, 1.0],
                    [1.0, 0.0, 0.0, 1.0],
                    [2.0, 0.0, 0.0, 1.0],
                ],
            )
            .with_dense(
                STRUCTURE_DATASET,
                array![[0.0, 3.0, -1.0], [2.0, 3.0, -1.0], [4.0, 3.0, -1.0]],
            )
            .with_dense(CONNECTIVITY_DATASET, array![[0.0, 2.0], [1.0, 2.0]]);
        let morphology = load(&merging).unwrap();
        assert_eq!(morphology.sections()[2].parents, vec![0, 1]);
        assert_eq!(morphology.roots(), &[0, 1]);
        assert_eq!(morphology.sections()[2].number_samples(), 2);
    }

    #[test]
    fn test_format_errors() {
        let dangling = forked_store().with_dense(
            STRUCTURE_DATASET,
            array![[0.0, 3.0, -1.0], [3.0, 3.0, 7.0], [5.0, 3.0, 0.0]],
        );
        assert!(matches!(load(&dangling), Err(MorphologyError::Format { .. })));

        let decreasing = forked_store().with_dense(
            STRUCTURE_DATASET,
            array![[0.0, 3.0, -1.0], [5.0, 3.0, 0.0], [3.0, 3.0, 0.0]],
        );
        assert!(matches!(load(&decreasing), Err(MorphologyError::Format { .. })));

        let empty = forked_store().with_dense(
            STRUCTURE_DATASET,
            array![[0.0, 3.0, -1.0], [3.0, 3.0, 0.0], [3.0, 3.0, 0.0]],
        );
        assert!(load(&empty).is_err());

        let out_of_range = forked_store().with_dense(STRUCTURE_DATASET, array![[9.0, 3.0, -1.0]]);
        assert!(load(&out_of_range).is_err());

        assert!(load(&MemoryStore::new()).is_err());
    }

    #[test]
    fn test_simulation_series() {
        let flow = ndarray::Array2::from_shape_fn((7, 3), |(row, frame)| (row * 10 + frame) as f64);
        let store = forked_store().with_dense(SeriesKind::Flow.dataset_name(), flow);
        let morphology = load(&store).unwrap();
        assert_eq!(morphology.simulation().number_frames(), 3);
        let sample = morphology.sections()[2].samples[2];
        assert_eq!(
            morphology.simulation_value(SeriesKind::Flow, &sample, 2).unwrap(),
            62.0
        );

        let short = forked_store().with_dense(
            SeriesKind::Pressure.dataset_name(),
            ndarray::Array2::zeros((3, 2)),
        );
        assert!(matches!(load(&short), Err(MorphologyError::Format { .. })));
    }
}
