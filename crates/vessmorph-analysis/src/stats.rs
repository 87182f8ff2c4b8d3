// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/// Running minimum, maximum and sum of a stream of values.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RunningStats {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl RunningStats {
    pub(crate) fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn sum(&self) -> f64 {
        self.sum
    }

    pub(crate) fn min(&self) -> f64 {
        self.min.unwrap_or(0.0)
    }

    pub(crate) fn max(&self) -> f64 {
        self.max.unwrap_or(0.0)
    }

    pub(crate) fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Smallest value at or above a threshold, `0.0` when there is none.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SmallestAbove {
    threshold: f64,
    value: Option<f64>,
}

impl SmallestAbove {
    pub(crate) fn new(threshold: f64) -> Self {
        SmallestAbove {
            threshold,
            value: None,
        }
    }

    /// Records `value`; returns whether it fell below the threshold.
    pub(crate) fn push(&mut self, value: f64) -> bool {
        if value < self.threshold {
            return true;
        }
        self.value = Some(self.value.map_or(value, |v| v.min(value)));
        false
    }

    pub(crate) fn get(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}
