// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

use crate::error::{MorphologyError, MorphologyResult};
use crate::skeleton::Morphology;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::debug;

/// Rewrites applied to every sample radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum RadiusRewrite {
    /// Every radius becomes the given value
    Constant(f32),
    /// Every radius is multiplied by the given factor
    Scale(f32),
    /// Radii below the given value are raised to it
    Minimum(f32),
}

impl RadiusRewrite {
    fn parameter(&self) -> f32 {
        match *self {
            RadiusRewrite::Constant(v) | RadiusRewrite::Scale(v) | RadiusRewrite::Minimum(v) => v,
        }
    }

    pub fn apply(&self, radius: f32) -> f32 {
        match *self {
            RadiusRewrite::Constant(value) => value,
            RadiusRewrite::Scale(factor) => radius * factor,
            RadiusRewrite::Minimum(floor) => radius.max(floor),
        }
    }
}

impl Display for RadiusRewrite {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RadiusRewrite::Constant(v) => write!(f, "constant {}", v),
            RadiusRewrite::Scale(v) => write!(f, "scale by {}", v),
            RadiusRewrite::Minimum(v) => write!(f, "minimum {}", v),
        }
    }
}

impl Morphology {
    /// Rewrites every sample radius.
    ///
    /// # Errors
    /// [`MorphologyError::Numeric`] if the rewrite parameter is negative or not finite.
    pub fn rewrite_radii(&mut self, rewrite: RadiusRewrite) -> MorphologyResult<()> {
        let parameter = rewrite.parameter();
        if !parameter.is_finite() || parameter < 0.0 {
            return Err(MorphologyError::numeric(format!(
                "radius rewrite '{}' needs a finite, non-negative value",
                rewrite
            )));
        }
        for section in self.sections_mut().iter_mut() {
            for sample in section.samples.iter_mut() {
                sample.radius = rewrite.apply(sample.radius);
            }
        }
        debug!(target: "vessmorph-structures", "Rewrote radii: {}", rewrite);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;
    use crate::skeleton::{Sample, Section};

    fn morphology(radii: &[f32]) -> Morphology {
        let samples = radii
            .iter()
            .enumerate()
            .map(|(i, &r)| Sample::new(Vec3::new(i as f32, 0.0, 0.0), r, i as i64))
            .collect();
        Morphology::assemble("r", vec![Section::new(0, samples)]).unwrap()
    }

    fn radii(morphology: &Morphology) -> Vec<f32> {
        morphology.sections()[0].samples.iter().map(|s| s.radius).collect()
    }

    #[test]
    fn test_rewrites() {
        let mut m = morphology(&[0.0, 0.5, 2.0]);
        m.rewrite_radii(RadiusRewrite::Minimum(1.0)).unwrap();
        assert_eq!(radii(&m), vec![1.0, 1.0, 2.0]);
        m.rewrite_radii(RadiusRewrite::Scale(0.5)).unwrap();
        assert_eq!(radii(&m), vec![0.5, 0.5, 1.0]);
        m.rewrite_radii(RadiusRewrite::Constant(3.0)).unwrap();
        assert_eq!(radii(&m), vec![3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let mut m = morphology(&[1.0]);
        assert!(m.rewrite_radii(RadiusRewrite::Scale(-1.0)).is_err());
        assert!(m.rewrite_radii(RadiusRewrite::Constant(f32::INFINITY)).is_err());
        assert_eq!(radii(&m), vec![1.0]);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&RadiusRewrite::Scale(2.0)).unwrap();
        assert_eq!(json, r#"{"mode":"scale","value":2.0}"#);
    }
}
