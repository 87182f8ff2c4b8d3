// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
Morphology Report Tool

Loads a vascular morphology, applies the configured post-processing, prints
its summary and optionally exports a VMV file and the per-section tables.

Usage:
  cargo run --bin morphology_report -- <input> [--vmv out.vmv] [--tables dir]
      [--config vessmorph.toml] [--set key=value]... [--json] [--debug-<crate>]

Example:
  cargo run --bin morphology_report -- vessels.swc --vmv vessels.vmv --tables report/ \
      --set resampling_mode=fixed_step --set resampling_step=2.0

Summary lines go to stdout, logs to stderr. Morphology errors are printed as
`[<kind>] <reason>` and exit with a status specific to the kind.
*/

use std::collections::HashMap;
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, FromArgMatches, Parser};
use vessmorph::config::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    validate_config, LogOutputFormat, ResamplingMode, VessmorphConfig, OVERRIDE_KEYS,
};
use vessmorph::observability::{self, parse_debug_flags, LogFormat};
use vessmorph::prelude::*;

const EXIT_USAGE: i32 = 1;
const DEBUG_FLAG_PREFIX: &str = "--debug-";

/// Load a vascular morphology, print its report and export VMV or tables
#[derive(Parser, Debug)]
#[command(name = "morphology_report", version, long_about = None)]
struct Args {
    /// Morphology file (.swc, .h5, .mat or .vmv)
    input: PathBuf,

    /// Write the processed morphology as VMV
    #[arg(long, value_name = "FILE")]
    vmv: Option<PathBuf>,

    /// Write the per-section tables into this directory
    #[arg(long, value_name = "DIR")]
    tables: Option<PathBuf>,

    /// Configuration file (default: discovered vessmorph.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override one configuration key (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_override)]
    overrides: Vec<(String, String)>,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn parse_override(pair: &str) -> Result<(String, String), String> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", pair))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn command() -> clap::Command {
    Args::command().after_help(format!(
        "Override keys: {}\n\n{}",
        OVERRIDE_KEYS.join(", "),
        observability::debug_flags_help()
    ))
}

/// `--debug-<crate>` flags are left to `parse_debug_flags`.
fn parse_arguments<I>(args: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = String>,
{
    let args = args
        .into_iter()
        .filter(|arg| !arg.starts_with(DEBUG_FLAG_PREFIX));
    let matches = command().try_get_matches_from(args)?;
    Args::from_arg_matches(&matches)
}

/// Explicit file, else the discovered `vessmorph.toml`, else defaults.
fn resolve_config(arguments: &Args) -> Result<VessmorphConfig, String> {
    let overrides: HashMap<String, String> = arguments.overrides.iter().cloned().collect();
    let explicit = arguments.config.clone().or_else(|| find_config_file().ok());
    let config = match explicit {
        Some(path) => load_config(Some(path.as_path()), Some(&overrides))
            .map_err(|e| e.to_string())?,
        None => {
            let mut config = VessmorphConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &overrides);
            config
        }
    };
    validate_config(&config).map_err(|e| e.to_string())?;
    Ok(config)
}

fn init_logging(config: &VessmorphConfig) {
    let logging = observability::LoggingConfig {
        level: config.logging.level.clone(),
        format: match config.logging.format {
            LogOutputFormat::Text => LogFormat::Text,
            LogOutputFormat::Json => LogFormat::Json,
        },
        ..observability::LoggingConfig::default()
    };
    if let Err(e) = observability::init_logging(&parse_debug_flags(), &logging) {
        eprintln!("warning: logging disabled: {:#}", e);
    }
}

fn run(arguments: &Args, config: &VessmorphConfig) -> MorphologyResult<()> {
    let control = TaskControl::none();
    let mut morphology = load_morphology(
        &arguments.input,
        LoadOptions::from_config(&config.loading),
        &control,
    )?;

    match config.resampling.mode {
        ResamplingMode::None => {}
        ResamplingMode::Adaptive => {
            morphology.resample_adaptively(&control)?;
        }
        ResamplingMode::FixedStep => {
            morphology.resample_fixed_step(config.resampling.step, &control)?;
            morphology.renumber_auxiliary_samples();
        }
    }

    let report = MorphologyReport::compute(
        &morphology,
        &AnalysisOptions::from_config(&config.analysis),
        &control,
    )?;

    if arguments.json {
        let summary = serde_json::to_string_pretty(&report.summary_items())
            .map_err(|e| MorphologyError::io("-", e.into()))?;
        println!("{}", summary);
    } else {
        println!("Morphology: {}", report.name);
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        let mut group = String::new();
        for item in report.summary_items() {
            if item.group != group {
                println!("[{}]", item.group);
                group = item.group.clone();
            }
            println!("  {}", item);
        }
    }

    if let Some(path) = &arguments.vmv {
        VmvWriter::from_config(&config.output).write_to_path(&morphology, path)?;
        eprintln!("Wrote {}", path.display());
    }
    if let Some(dir) = &arguments.tables {
        let written = report.write_tables(dir, config.output.table_format)?;
        eprintln!("Wrote {} tables to {}", written.len(), dir.display());
    }
    Ok(())
}

fn main() {
    let arguments = match parse_arguments(std::env::args()) {
        Ok(arguments) => arguments,
        Err(err) => {
            let _ = err.print();
            // --help and --version are not failures
            process::exit(if err.use_stderr() { EXIT_USAGE } else { 0 });
        }
    };

    let config = match resolve_config(&arguments) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {}", message);
            process::exit(EXIT_USAGE);
        }
    };
    init_logging(&config);

    if let Err(err) = run(&arguments, &config) {
        eprintln!("{}", err.diagnostic());
        process::exit(err.exit_code());
    }
}
