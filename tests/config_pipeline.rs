// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration-driven pipeline: TOML file -> loader -> resampling -> report -> files.

use std::collections::HashMap;
use std::fs;
use vessmorph::config::{ResamplingMode, TableFormat};
use vessmorph::prelude::*;

/// Y-branch whose tree starts at (10, 0, 0).
const SHIFTED_Y_BRANCH: &str =
    "1 0 10 0 0 1 -1\n2 3 11 0 0 1 1\n3 3 12 0 0 1 2\n4 3 12 1 0 1 3\n5 3 12 -1 0 1 3\n";

const CONFIG: &str = r#"
[loading]
center_at_origin = true

[analysis]
mean_denominator = "per_segment"

[resampling]
mode = "fixed_step"
step = 0.5

[output]
vmv_precision = 3
table_format = "json"
"#;

#[test]
fn test_pipeline_follows_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("vessmorph.toml");
    let input = dir.path().join("y.swc");
    fs::write(&config_path, CONFIG).unwrap();
    fs::write(&input, SHIFTED_Y_BRANCH).unwrap();

    let config = load_config(Some(config_path.as_path()), None).unwrap();
    validate_config(&config).unwrap();
    assert_eq!(config.resampling.mode, ResamplingMode::FixedStep);
    assert_eq!(config.output.table_format, TableFormat::Json);

    let control = TaskControl::none();
    let mut morphology =
        load_morphology(&input, LoadOptions::from_config(&config.loading), &control).unwrap();
    let bounds = morphology.bounding_box();
    assert_eq!((bounds.p_min.x, bounds.p_max.x), (0.0, 2.0));

    morphology
        .resample_fixed_step(config.resampling.step, &control)
        .unwrap();
    assert_eq!(morphology.renumber_auxiliary_samples(), 4);

    let report = MorphologyReport::compute(
        &morphology,
        &AnalysisOptions::from_config(&config.analysis),
        &control,
    )
    .unwrap();
    // Per-segment means on an evenly resampled tree equal the step.
    let means = report.length.sections.column("seg_mean_len").unwrap();
    assert!(means.iter().all(|m| (m - 0.5).abs() < 1e-6));

    let vmv_path = dir.path().join("y.vmv");
    VmvWriter::from_config(&config.output)
        .write_to_path(&morphology, &vmv_path)
        .unwrap();
    let vmv = fs::read_to_string(&vmv_path).unwrap();
    assert!(vmv.lines().any(|line| line.starts_with("1\t") && line.contains(".000")));

    let tables = dir.path().join("tables");
    let written = report.write_tables(&tables, config.output.table_format).unwrap();
    assert_eq!(written.len(), 10);
    assert!(written.iter().all(|p| p.extension().and_then(|e| e.to_str()) == Some("json")));
    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tables.join("summary.json")).unwrap()).unwrap();
    assert!(summary
        .as_array()
        .unwrap()
        .iter()
        .any(|item| item["key"] == "total_length"));
}

#[test]
fn test_cli_overrides_win_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("vessmorph.toml");
    fs::write(&config_path, CONFIG).unwrap();

    let overrides = HashMap::from([
        ("resampling_mode".to_string(), "adaptive".to_string()),
        ("vmv_precision".to_string(), "9".to_string()),
    ]);
    let config = load_config(Some(config_path.as_path()), Some(&overrides)).unwrap();
    assert_eq!(config.resampling.mode, ResamplingMode::Adaptive);
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_default_config_is_valid() {
    let config = VessmorphConfig::default();
    validate_config(&config).unwrap();
    assert_eq!(
        LoadOptions::from_config(&config.loading),
        LoadOptions::default()
    );
    assert_eq!(VmvWriter::from_config(&config.output).precision(), 2);
}
