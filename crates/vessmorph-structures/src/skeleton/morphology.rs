// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
The canonical in-memory vascular morphology.

Sections reference each other by [`SectionId`] into `Morphology::sections`,
never by pointer, so cyclic vessel graphs stay plain owned values. Loaders
create morphologies through [`Morphology::assemble`], which checks every
structural invariant before handing the value out.
*/

use super::{Sample, Section, SectionId};
use crate::error::{MorphologyError, MorphologyResult};
use crate::geometry::{BoundingBox, Vec3};
use crate::simulation::{SeriesKind, SimulationData, SimulationSeries};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

/// A vascular skeleton: sections, their connectivity and optional simulation series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Morphology {
    name: String,
    sections: Vec<Section>,
    roots: Vec<SectionId>,
    #[serde(skip)]
    bounding_box: OnceLock<BoundingBox>,
    simulation: SimulationData,
    origin: Option<Vec3>,
    number_samples_as_loaded: usize,
    number_sections_as_loaded: usize,
}

impl Morphology {
    /// Builds a morphology from fully linked sections and checks its invariants.
    ///
    /// Roots are derived from the sections without parents. The loaded
    /// counts default to the current sample and section counts.
    ///
    /// # Errors
    /// [`MorphologyError::InvariantViolation`] if the sections break any
    /// structural invariant (see [`Morphology::validate`]).
    pub fn assemble(name: impl Into<String>, sections: Vec<Section>) -> MorphologyResult<Self> {
        let number_sections = sections.len();
        let number_samples = sections.iter().map(|s| s.samples.len()).sum();
        let mut morphology = Morphology {
            name: name.into(),
            sections,
            roots: Vec::new(),
            bounding_box: OnceLock::new(),
            simulation: SimulationData::default(),
            origin: None,
            number_samples_as_loaded: number_samples,
            number_sections_as_loaded: number_sections,
        };
        morphology.refresh_roots();
        morphology.validate()?;
        debug!(
            target: "vessmorph-structures",
            "Assembled morphology '{}': {} sections, {} roots, {} samples",
            morphology.name,
            morphology.sections.len(),
            morphology.roots.len(),
            number_samples
        );
        Ok(morphology)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Section by id.
    ///
    /// # Errors
    /// [`MorphologyError::InvariantViolation`] for a dangling id.
    pub fn section(&self, id: SectionId) -> MorphologyResult<&Section> {
        self.sections.get(id as usize).ok_or_else(|| {
            MorphologyError::invariant(format!(
                "section {} does not exist ({} sections)",
                id,
                self.sections.len()
            ))
        })
    }

    pub fn roots(&self) -> &[SectionId] {
        &self.roots
    }

    pub fn leaves(&self) -> Vec<SectionId> {
        self.sections
            .iter()
            .filter(|s| s.is_leaf())
            .map(|s| s.index)
            .collect()
    }

    pub fn number_sections(&self) -> usize {
        self.sections.len()
    }

    /// Samples over every section, counting branching-point duplicates once per section.
    pub fn number_samples(&self) -> usize {
        self.sections.iter().map(|s| s.samples.len()).sum()
    }

    pub fn number_segments(&self) -> usize {
        self.sections.iter().map(|s| s.number_segments()).sum()
    }

    /// Samples with distinct identity.
    ///
    /// Samples sharing an index are one sample duplicated at a branching point;
    /// auxiliary samples are each distinct.
    pub fn unique_samples(&self) -> Vec<&Sample> {
        let mut seen: AHashSet<i64> = AHashSet::new();
        let mut unique = Vec::new();
        for sample in self.sections.iter().flat_map(|s| s.samples.iter()) {
            if sample.is_auxiliary() || seen.insert(sample.index) {
                unique.push(sample);
            }
        }
        unique
    }

    pub fn number_unique_samples(&self) -> usize {
        self.unique_samples().len()
    }

    pub fn number_samples_as_loaded(&self) -> usize {
        self.number_samples_as_loaded
    }

    pub fn number_sections_as_loaded(&self) -> usize {
        self.number_sections_as_loaded
    }

    /// Records the counts reported by the source, before any processing.
    pub fn set_loaded_counts(&mut self, samples: usize, sections: usize) {
        self.number_samples_as_loaded = samples;
        self.number_sections_as_loaded = sections;
    }

    /// Translation origin recorded by the loader, if any.
    pub fn origin(&self) -> Option<Vec3> {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Option<Vec3>) {
        self.origin = origin;
    }

    /// Bounding box of every sample, computed on first use and cached.
    pub fn bounding_box(&self) -> BoundingBox {
        *self.bounding_box.get_or_init(|| self.compute_bounding_box())
    }

    /// Discards the cached bounding box and computes it again.
    pub fn recompute_bounding_box(&mut self) -> BoundingBox {
        let bbox = self.compute_bounding_box();
        self.bounding_box = OnceLock::new();
        let _ = self.bounding_box.set(bbox);
        bbox
    }

    fn compute_bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(
            self.sections
                .iter()
                .flat_map(|s| s.samples.iter())
                .map(|sample| &sample.point),
        )
    }

    pub fn simulation(&self) -> &SimulationData {
        &self.simulation
    }

    /// Binds a simulation series.
    ///
    /// # Errors
    /// [`MorphologyError::Format`] if the series has fewer rows than the
    /// highest series index used by a sample, or disagrees in shape with an
    /// already bound series.
    pub fn attach_series(&mut self, series: SimulationSeries) -> MorphologyResult<()> {
        let required_rows = self
            .sections
            .iter()
            .flat_map(|s| s.samples.iter())
            .filter_map(|s| s.series_index)
            .max()
            .map(|max| max + 1)
            .unwrap_or(0);
        if series.number_samples() < required_rows {
            return Err(MorphologyError::format(format!(
                "{} has {} rows but samples reference {} rows",
                series.kind().dataset_name(),
                series.number_samples(),
                required_rows
            )));
        }
        debug!(
            target: "vessmorph-structures",
            "Attached {} ({} samples x {} frames)",
            series.kind().dataset_name(),
            series.number_samples(),
            series.number_frames()
        );
        self.simulation.insert(series)?;
        Ok(())
    }

    /// Simulated value of `sample` at `frame`.
    pub fn simulation_value(
        &self,
        kind: SeriesKind,
        sample: &Sample,
        frame: usize,
    ) -> MorphologyResult<f32> {
        let row = sample.series_index.ok_or_else(|| {
            MorphologyError::format(format!(
                "sample {} is not bound to any simulation row",
                sample.index
            ))
        })?;
        self.simulation.value_at(kind, row, frame)
    }

    /// Mutable access for the processing passes; invalidates the bounding box.
    pub(crate) fn sections_mut(&mut self) -> &mut Vec<Section> {
        self.bounding_box = OnceLock::new();
        &mut self.sections
    }

    fn refresh_roots(&mut self) {
        self.roots = self
            .sections
            .iter()
            .filter(|s| s.parents.is_empty())
            .map(|s| s.index)
            .collect();
    }

    /// Checks every structural invariant.
    ///
    /// - `section.index` equals its position
    /// - parent and child lists are mutual and reference existing sections
    /// - a parent's last sample sits on its child's first sample
    /// - `roots` lists exactly the sections without parents
    /// - samples sharing an index share a position
    /// - a computed bounding box encloses every sample
    pub fn validate(&self) -> MorphologyResult<()> {
        let count = self.sections.len();
        for (position, section) in self.sections.iter().enumerate() {
            if section.index as usize != position {
                return Err(MorphologyError::invariant(format!(
                    "section at position {} carries index {}",
                    position, section.index
                )));
            }
            for &child in &section.children {
                let child_section = self.sections.get(child as usize).ok_or_else(|| {
                    MorphologyError::invariant(format!(
                        "section {} lists missing child {} ({} sections)",
                        section.index, child, count
                    ))
                })?;
                if !child_section.parents.contains(&section.index) {
                    return Err(MorphologyError::invariant(format!(
                        "section {} lists child {} which does not list it as parent",
                        section.index, child
                    )));
                }
                match (section.last_sample(), child_section.first_sample()) {
                    (Some(last), Some(first)) if last.point == first.point => {}
                    _ => {
                        return Err(MorphologyError::invariant(format!(
                            "section {} does not end where its child {} starts",
                            section.index, child
                        )))
                    }
                }
            }
            for &parent in &section.parents {
                let parent_section = self.sections.get(parent as usize).ok_or_else(|| {
                    MorphologyError::invariant(format!(
                        "section {} lists missing parent {} ({} sections)",
                        section.index, parent, count
                    ))
                })?;
                if !parent_section.children.contains(&section.index) {
                    return Err(MorphologyError::invariant(format!(
                        "section {} lists parent {} which does not list it as child",
                        section.index, parent
                    )));
                }
            }
        }

        let expected_roots: Vec<SectionId> = self
            .sections
            .iter()
            .filter(|s| s.parents.is_empty())
            .map(|s| s.index)
            .collect();
        if expected_roots != self.roots {
            return Err(MorphologyError::invariant(format!(
                "roots {:?} differ from parentless sections {:?}",
                self.roots, expected_roots
            )));
        }

        let mut positions: AHashMap<i64, Vec3> = AHashMap::new();
        for sample in self.sections.iter().flat_map(|s| s.samples.iter()) {
            if sample.is_auxiliary() {
                continue;
            }
            if let Some(previous) = positions.insert(sample.index, sample.point) {
                if previous != sample.point {
                    return Err(MorphologyError::invariant(format!(
                        "sample index {} is used at {} and {}",
                        sample.index, previous, sample.point
                    )));
                }
            }
        }

        if let Some(bbox) = self.bounding_box.get() {
            let outside = self
                .sections
                .iter()
                .flat_map(|s| s.samples.iter())
                .find(|sample| !bbox.contains(&sample.point));
            if let Some(sample) = outside {
                return Err(MorphologyError::invariant(format!(
                    "sample {} at {} lies outside the cached bounding box",
                    sample.index, sample.point
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample(index: i64, x: f32, y: f32) -> Sample {
        Sample::new(Vec3::new(x, y, 0.0), 1.0, index)
    }

    /// Root 0 -> 1 -> 2 splitting into 2 -> 3 and 2 -> 4.
    fn y_branch() -> Morphology {
        let mut root = Section::new(0, vec![sample(0, 0.0, 0.0), sample(1, 1.0, 0.0), sample(2, 2.0, 0.0)]);
        let mut up = Section::new(1, vec![sample(2, 2.0, 0.0), sample(3, 2.0, 1.0)]);
        let mut down = Section::new(2, vec![sample(2, 2.0, 0.0), sample(4, 2.0, -1.0)]);
        root.children = vec![1, 2];
        up.parents = vec![0];
        down.parents = vec![0];
        Morphology::assemble("y", vec![root, up, down]).unwrap()
    }

    #[test]
    fn test_assemble_derives_roots_and_counts() {
        let morphology = y_branch();
        assert_eq!(morphology.roots(), &[0]);
        assert_eq!(morphology.leaves(), vec![1, 2]);
        assert_eq!(morphology.number_samples(), 7);
        assert_eq!(morphology.number_unique_samples(), 5);
        assert_eq!(morphology.number_segments(), 4);
        assert_eq!(morphology.number_samples_as_loaded(), 7);
        assert_eq!(morphology.number_sections_as_loaded(), 3);
    }

    #[test]
    fn test_bounding_box_is_cached_and_recomputable() {
        let mut morphology = y_branch();
        let bbox = morphology.bounding_box();
        assert_eq!(bbox.p_min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(bbox.p_max, Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(morphology.recompute_bounding_box(), bbox);
        assert_eq!(morphology.recompute_bounding_box(), bbox);
        assert!(morphology.validate().is_ok());
    }

    #[test]
    fn test_rejects_one_sided_link() {
        let mut root = Section::new(0, vec![sample(0, 0.0, 0.0), sample(1, 1.0, 0.0)]);
        let child = Section::new(1, vec![sample(1, 1.0, 0.0), sample(2, 2.0, 0.0)]);
        root.children = vec![1];
        let result = Morphology::assemble("broken", vec![root, child]);
        assert!(matches!(result, Err(MorphologyError::InvariantViolation { .. })));
    }

    #[test]
    fn test_rejects_disconnected_link() {
        let mut root = Section::new(0, vec![sample(0, 0.0, 0.0), sample(1, 1.0, 0.0)]);
        let mut child = Section::new(1, vec![sample(5, 3.0, 0.0), sample(2, 2.0, 0.0)]);
        root.children = vec![1];
        child.parents = vec![0];
        let result = Morphology::assemble("gap", vec![root, child]);
        assert!(matches!(result, Err(MorphologyError::InvariantViolation { .. })));
    }

    #[test]
    fn test_rejects_misplaced_index() {
        let section = Section::new(4, vec![sample(0, 0.0, 0.0)]);
        assert!(Morphology::assemble("bad", vec![section]).is_err());
    }

    #[test]
    fn test_dangling_section_lookup() {
        let morphology = y_branch();
        assert!(morphology.section(2).is_ok());
        assert!(matches!(
            morphology.section(3),
            Err(MorphologyError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_simulation_lookup_through_sample() {
        let section = Section::new(
            0,
            vec![
                sample(0, 0.0, 0.0).with_series_index(0),
                sample(1, 1.0, 0.0).with_series_index(1),
            ],
        );
        let mut morphology = Morphology::assemble("sim", vec![section]).unwrap();
        morphology
            .attach_series(SimulationSeries::new(
                SeriesKind::Pressure,
                array![[10.0, 11.0], [20.0, 21.0]],
            ))
            .unwrap();
        let second = morphology.sections()[0].samples[1];
        assert_eq!(
            morphology
                .simulation_value(SeriesKind::Pressure, &second, 1)
                .unwrap(),
            21.0
        );
        assert!(morphology
            .attach_series(SimulationSeries::new(SeriesKind::Flow, array![[1.0, 2.0]]))
            .is_err());
    }
}
