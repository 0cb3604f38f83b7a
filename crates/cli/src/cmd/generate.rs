//! Implementation of the default `bootstrap` command.
//!
//! Discovers the test sources, assembles the build graph and writes it as a
//! Ninja file, replacing any previous one only once the new one is complete.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use ninja_bootstrap_lib::{BootstrapConfig, generate, to_ninja_string, write_build_file};

use crate::output::{OutputFormat, format_bytes, print_json, print_stat, print_success};

/// What was written, for `--format json`.
#[derive(Debug, Serialize)]
struct GenerateSummary<'a> {
  output: PathBuf,
  source_root: &'a Path,
  sources: usize,
  edges: usize,
  default_target: Option<&'a str>,
  bytes: usize,
}

pub fn cmd_generate(config: &BootstrapConfig, output: &Path, to_stdout: bool, format: OutputFormat) -> Result<()> {
  let graph = generate(config).with_context(|| {
    format!(
      "Failed to generate build graph from {}",
      config.source_root.display()
    )
  })?;

  if to_stdout {
    print!("{}", to_ninja_string(&graph));
    return Ok(());
  }

  let contents =
    write_build_file(output, &graph).with_context(|| format!("Failed to write build file: {}", output.display()))?;

  let summary = GenerateSummary {
    output: output.to_path_buf(),
    source_root: &config.source_root,
    sources: graph.sources().len(),
    edges: graph.edges().len(),
    default_target: graph.default_target(),
    bytes: contents.len(),
  };

  if format.is_json() {
    return print_json(&summary);
  }

  print_success(&format!(
    "Wrote {} ({})",
    summary.output.display(),
    format_bytes(summary.bytes as u64)
  ));
  print_stat("Sources", &summary.sources.to_string());
  print_stat("Edges", &summary.edges.to_string());
  print_stat("Default", summary.default_target.unwrap_or("-"));

  Ok(())
}
