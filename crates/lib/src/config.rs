//! Generator configuration.
//!
//! A `BootstrapConfig` is built once at the entry point and passed by
//! reference into the assembler. Nothing in the library reads process-wide
//! state, so tests can drive generation with synthetic configurations.

use std::path::PathBuf;

use serde::Serialize;

use crate::consts::{
  BUILD_DIR, DEFAULT_COMPILER, DEFAULT_COMPILER_FLAGS, DEFAULT_INCLUDE_FLAGS, DEFAULT_INSTALL_PATH,
  DEFAULT_LINKER_FLAGS, DEFAULT_SOURCE_PATTERN, DEFAULT_SOURCE_ROOT, HEADERS_DIR, INSTALL_TARGET,
  NINJA_REQUIRED_VERSION, OBJECT_EXTENSION, SOURCE_EXTENSION, TEST_BINARY,
};
use crate::mapper::PathMapper;

/// Everything the assembler needs to produce a build graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapConfig {
  /// Compiler executable written to the `compiler` variable.
  pub compiler: String,
  /// Destination prefix for the install edge.
  pub install_path: String,
  pub include_flags: String,
  pub compiler_flags: String,
  pub linker_flags: String,
  /// Root of the source tree to scan.
  pub source_root: PathBuf,
  /// Glob matched against each file's basename.
  pub source_pattern: String,
  pub source_extension: String,
  pub object_extension: String,
  /// Ninja build directory; object files are placed beneath it.
  pub build_dir: String,
  /// Header directory copied on install.
  pub headers_dir: String,
  /// Output of the link edge and the default target.
  pub binary_name: String,
  pub install_target: String,
  pub required_version: String,
}

impl Default for BootstrapConfig {
  fn default() -> Self {
    Self {
      compiler: DEFAULT_COMPILER.to_string(),
      install_path: DEFAULT_INSTALL_PATH.to_string(),
      include_flags: DEFAULT_INCLUDE_FLAGS.to_string(),
      compiler_flags: DEFAULT_COMPILER_FLAGS.to_string(),
      linker_flags: DEFAULT_LINKER_FLAGS.to_string(),
      source_root: PathBuf::from(DEFAULT_SOURCE_ROOT),
      source_pattern: DEFAULT_SOURCE_PATTERN.to_string(),
      source_extension: SOURCE_EXTENSION.to_string(),
      object_extension: OBJECT_EXTENSION.to_string(),
      build_dir: BUILD_DIR.to_string(),
      headers_dir: HEADERS_DIR.to_string(),
      binary_name: TEST_BINARY.to_string(),
      install_target: INSTALL_TARGET.to_string(),
      required_version: NINJA_REQUIRED_VERSION.to_string(),
    }
  }
}

impl BootstrapConfig {
  pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
    self.compiler = compiler.into();
    self
  }

  pub fn with_install_path(mut self, install_path: impl Into<String>) -> Self {
    self.install_path = install_path.into();
    self
  }

  pub fn with_source_root(mut self, source_root: impl Into<PathBuf>) -> Self {
    self.source_root = source_root.into();
    self
  }

  /// The mapper that places this configuration's objects under `build_dir`.
  pub fn path_mapper(&self) -> PathMapper {
    PathMapper::new(&self.build_dir, &self.source_extension, &self.object_extension)
  }

  /// Shell command for the install rule.
  pub fn install_command(&self) -> String {
    format!("cp -vR ./{0}/ $install_path/{0}", self.headers_dir)
  }
}
