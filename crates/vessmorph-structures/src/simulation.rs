// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
Per-frame simulation series attached to samples.

Each series is a dense `(global_sample_index, frame)` array. A morphology holds
at most one series of each [`SeriesKind`]. Series are read-only once loaded and
the core never interpolates between frames.
*/

use crate::error::{MorphologyError, MorphologyResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// The three simulated quantities a morphology can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesKind {
    Radius,
    Flow,
    Pressure,
}

impl SeriesKind {
    pub const ALL: [SeriesKind; 3] = [SeriesKind::Radius, SeriesKind::Flow, SeriesKind::Pressure];

    /// Dataset name used by container formats.
    pub fn dataset_name(&self) -> &'static str {
        match self {
            SeriesKind::Radius => "radius_series",
            SeriesKind::Flow => "flow_series",
            SeriesKind::Pressure => "pressure_series",
        }
    }
}

/// One simulated quantity over every sample and frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSeries {
    kind: SeriesKind,
    values: Array2<f32>,
}

impl SimulationSeries {
    pub fn new(kind: SeriesKind, values: Array2<f32>) -> Self {
        SimulationSeries { kind, values }
    }

    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    pub fn number_samples(&self) -> usize {
        self.values.nrows()
    }

    pub fn number_frames(&self) -> usize {
        self.values.ncols()
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    /// Value of `sample` (global index) at `frame`, `None` when out of range.
    pub fn value_at(&self, sample: usize, frame: usize) -> Option<f32> {
        self.values.get((sample, frame)).copied()
    }

    /// Full time course of one sample.
    pub fn sample_series(&self, sample: usize) -> Option<Vec<f32>> {
        (sample < self.number_samples()).then(|| self.values.row(sample).to_vec())
    }
}

/// Container for the optional series of a morphology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationData {
    radius: Option<SimulationSeries>,
    flow: Option<SimulationSeries>,
    pressure: Option<SimulationSeries>,
}

impl SimulationData {
    pub fn is_empty(&self) -> bool {
        self.radius.is_none() && self.flow.is_none() && self.pressure.is_none()
    }

    pub fn get(&self, kind: SeriesKind) -> Option<&SimulationSeries> {
        match kind {
            SeriesKind::Radius => self.radius.as_ref(),
            SeriesKind::Flow => self.flow.as_ref(),
            SeriesKind::Pressure => self.pressure.as_ref(),
        }
    }

    /// Binds a series, replacing any previous series of the same kind.
    ///
    /// Every bound series must agree on the sample and frame counts.
    pub fn insert(&mut self, series: SimulationSeries) -> MorphologyResult<Option<SimulationSeries>> {
        for existing in self.iter().filter(|s| s.kind() != series.kind()) {
            if existing.values().dim() != series.values().dim() {
                return Err(MorphologyError::format(format!(
                    "{} has shape {:?} but {} has shape {:?}",
                    series.kind().dataset_name(),
                    series.values().dim(),
                    existing.kind().dataset_name(),
                    existing.values().dim()
                )));
            }
        }
        let slot = match series.kind() {
            SeriesKind::Radius => &mut self.radius,
            SeriesKind::Flow => &mut self.flow,
            SeriesKind::Pressure => &mut self.pressure,
        };
        Ok(slot.replace(series))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimulationSeries> {
        [&self.radius, &self.flow, &self.pressure]
            .into_iter()
            .filter_map(|s| s.as_ref())
    }

    /// Frame count shared by the bound series, `0` when none is bound.
    pub fn number_frames(&self) -> usize {
        self.iter().next().map(|s| s.number_frames()).unwrap_or(0)
    }

    pub fn value_at(&self, kind: SeriesKind, sample: usize, frame: usize) -> MorphologyResult<f32> {
        let series = self.get(kind).ok_or_else(|| {
            MorphologyError::format(format!("no {} attached", kind.dataset_name()))
        })?;
        series.value_at(sample, frame).ok_or_else(|| {
            MorphologyError::format(format!(
                "{} has no value for sample {} at frame {} (shape {:?})",
                kind.dataset_name(),
                sample,
                frame,
                series.values().dim()
            ))
        })
    }
}
