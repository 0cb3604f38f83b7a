mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ninja_bootstrap_lib::BootstrapConfig;
use ninja_bootstrap_lib::consts::{DEFAULT_COMPILER, DEFAULT_INSTALL_PATH, DEFAULT_OUTPUT_FILE, DEFAULT_SOURCE_ROOT};

use crate::cmd::cmd_generate;
use crate::output::{OutputFormat, print_error};

/// Generate a Ninja build file for the project's test suite
#[derive(Parser)]
#[command(name = "bootstrap")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Compiler name
  #[arg(long, default_value = DEFAULT_COMPILER, value_name = "executable")]
  cxx: String,

  /// Install path
  #[arg(long, default_value = DEFAULT_INSTALL_PATH, value_name = "path")]
  install_path: String,

  /// Directory scanned for test sources
  #[arg(long, default_value = DEFAULT_SOURCE_ROOT, value_name = "dir")]
  source_root: PathBuf,

  /// Build file to write
  #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE, value_name = "file")]
  output: PathBuf,

  /// Print the build file to stdout instead of writing it
  #[arg(long)]
  stdout: bool,

  /// Summary format after writing
  #[arg(long, value_enum, default_value_t)]
  format: OutputFormat,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,
}

impl Cli {
  fn config(&self) -> BootstrapConfig {
    BootstrapConfig::default()
      .with_compiler(&self.cxx)
      .with_install_path(&self.install_path)
      .with_source_root(&self.source_root)
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let config = cli.config();
  tracing::debug!(?config, "resolved configuration");

  match cmd_generate(&config, &cli.output, cli.stdout, cli.format) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}
