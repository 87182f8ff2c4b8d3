// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
Scalar helpers shared by the processing passes and the analysis kernels.

Every segment of a section is modelled as a truncated cone (frustum) whose
two cap radii are the radii of the segment's samples.
*/

use std::f64::consts::PI;

/// Denominators at or below this magnitude make a ratio evaluate to zero.
pub const RATIO_EPSILON: f64 = 1e-32;

/// Default distance under which two successive samples are duplicates.
pub const DOUBLES_TOLERANCE: f32 = 1e-5;

/// Default radius under which a sample counts as zero-radius.
pub const ZERO_RADIUS_THRESHOLD: f64 = 1e-3;

/// `numerator / denominator`, or `0.0` when the denominator is within
/// [`RATIO_EPSILON`] of zero or either operand is not finite.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    safe_ratio_with(numerator, denominator, RATIO_EPSILON)
}

/// Same as [`safe_ratio`] with an explicit epsilon.
pub fn safe_ratio_with(numerator: f64, denominator: f64, epsilon: f64) -> f64 {
    if !numerator.is_finite() || !denominator.is_finite() || denominator.abs() <= epsilon {
        0.0
    } else {
        numerator / denominator
    }
}

/// Lateral area of a frustum: `π·(r0+r1)·√((r0−r1)² + len²)`.
///
/// Returns `None` when the square-root argument is not a finite non-negative
/// number, which only happens for NaN or infinite inputs.
pub fn frustum_lateral_area(r0: f64, r1: f64, length: f64) -> Option<f64> {
    let dr = r0 - r1;
    let slant_squared = dr * dr + length * length;
    if !slant_squared.is_finite() || slant_squared < 0.0 {
        return None;
    }
    Some(PI * (r0 + r1) * slant_squared.sqrt())
}

/// Lateral area plus both caps: `L + π·(r0² + r1²)`.
pub fn frustum_surface_area(r0: f64, r1: f64, length: f64) -> Option<f64> {
    let lateral = frustum_lateral_area(r0, r1, length)?;
    let area = lateral + PI * (r0 * r0 + r1 * r1);
    area.is_finite().then_some(area)
}

/// Frustum volume: `(π/3)·len·(r0² + r0·r1 + r1²)`.
pub fn frustum_volume(r0: f64, r1: f64, length: f64) -> Option<f64> {
    let volume = PI / 3.0 * length * (r0 * r0 + r0 * r1 + r1 * r1);
    volume.is_finite().then_some(volume)
}

/// Arithmetic mean, `0.0` for an empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Minimum over finite values, `None` when there is none.
pub fn min_value(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.min(v))))
}

/// Maximum over finite values, `None` when there is none.
pub fn max_value(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
}

/// Round to `decimals` decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
