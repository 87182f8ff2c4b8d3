// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

pub const UNIT_NONE: &str = "";
pub const UNIT_LENGTH: &str = "µm";
pub const UNIT_AREA: &str = "µm²";
pub const UNIT_VOLUME: &str = "µm³";

/// One named scalar of a morphology summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryItem {
    /// Kernel that produced the item (`structure`, `radius`, ...)
    pub group: String,
    /// Stable machine-readable key
    pub key: String,
    pub label: String,
    pub value: f64,
    pub unit: String,
}

impl SummaryItem {
    pub fn new(group: &str, key: &str, label: &str, value: f64, unit: &str) -> Self {
        SummaryItem {
            group: group.to_string(),
            key: key.to_string(),
            label: label.to_string(),
            value,
            unit: unit.to_string(),
        }
    }

    pub fn count(group: &str, key: &str, label: &str, value: usize) -> Self {
        SummaryItem::new(group, key, label, value as f64, UNIT_NONE)
    }
}

impl fmt::Display for SummaryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.fract() == 0.0 && self.value.abs() < 1e15 {
            write!(f, "{}: {}", self.label, self.value as i64)?;
        } else {
            write!(f, "{}: {:.4}", self.label, self.value)?;
        }
        if !self.unit.is_empty() {
            write!(f, " {}", self.unit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let item = SummaryItem::count("structure", "total_sections", "Total sections", 12);
        assert_eq!(item.to_string(), "Total sections: 12");
        let item = SummaryItem::new("length", "total_length", "Total length", 2.41421356, UNIT_LENGTH);
        assert_eq!(item.to_string(), "Total length: 2.4142 µm");
    }
}
