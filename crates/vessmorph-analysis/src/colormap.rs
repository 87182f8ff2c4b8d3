// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Mapping of scalar values onto the entries of an `n`-color map.

/// Index of `value` in an `n`-entry colormap spanning `[min, max]`.
///
/// Values outside the range are clamped; NaN, an empty map or a degenerate
/// range give index 0.
pub fn colormap_index(value: f64, min: f64, max: f64, n: usize) -> usize {
    if n == 0 || value.is_nan() || !(max > min) {
        return 0;
    }
    let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
    ((t * n as f64) as usize).min(n - 1)
}

/// Colormap indices of `values` over their own finite range.
pub fn map_to_colormap_indices(values: &[f64], n: usize) -> Vec<usize> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let min = finite.clone().reduce(f64::min).unwrap_or(0.0);
    let max = finite.reduce(f64::max).unwrap_or(0.0);
    values
        .iter()
        .map(|&value| colormap_index(value, min, max, n))
        .collect()
}
