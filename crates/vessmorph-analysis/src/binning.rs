// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Equal-width histograms over table columns.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bins the finite `values` into `bins` equal-width bins.
    ///
    /// NaN and infinite values are skipped. When every value is the same (or
    /// there is none) the histogram has a single bin; `bins == 0` is read as 1.
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let (Some(min), Some(max)) = (
            finite.iter().copied().reduce(f64::min),
            finite.iter().copied().reduce(f64::max),
        ) else {
            return Histogram {
                min: 0.0,
                max: 0.0,
                bin_width: 0.0,
                counts: vec![0],
            };
        };
        if max <= min {
            return Histogram {
                min,
                max,
                bin_width: 0.0,
                counts: vec![finite.len()],
            };
        }

        let bins = bins.max(1);
        let bin_width = (max - min) / bins as f64;
        let mut histogram = Histogram {
            min,
            max,
            bin_width,
            counts: vec![0; bins],
        };
        for value in finite {
            if let Some(bin) = histogram.bin_of(value) {
                histogram.counts[bin] += 1;
            }
        }
        histogram
    }

    pub fn number_bins(&self) -> usize {
        self.counts.len()
    }

    /// Bin holding `value`; the maximum falls into the last bin.
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value < self.min || value > self.max {
            return None;
        }
        if self.bin_width <= 0.0 {
            return Some(0);
        }
        let bin = ((value - self.min) / self.bin_width) as usize;
        Some(bin.min(self.counts.len() - 1))
    }

    /// `number_bins() + 1` bin boundaries.
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.counts.len())
            .map(|i| self.min + self.bin_width * i as f64)
            .collect()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}
