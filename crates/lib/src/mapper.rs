//! Source to object path mapping.
//!
//! An object path is the build directory joined with the source's path below
//! the source root, with the source extension swapped for the object one:
//!
//! ```text
//! test/a.cpp      -> obj/a.o
//! test/sub/b.cpp  -> obj/sub/b.o
//! ```
//!
//! Keeping the subdirectories means two files sharing a basename never map to
//! the same object.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::consts::{BUILD_DIR, OBJECT_EXTENSION, SOURCE_EXTENSION};
use crate::discover::SourceFile;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
  #[error("unsupported extension for {path}: expected a .{expected} file")]
  UnsupportedExtension { path: String, expected: String },
}

/// Path of a build artifact derived from one source file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ArtifactPath(String);

impl ArtifactPath {
  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_string(self) -> String {
    self.0
  }
}

impl fmt::Display for ArtifactPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
  output_dir: String,
  source_extension: String,
  object_extension: String,
}

impl Default for PathMapper {
  fn default() -> Self {
    Self::new(BUILD_DIR, SOURCE_EXTENSION, OBJECT_EXTENSION)
  }
}

impl PathMapper {
  /// Extensions are given without the leading dot.
  pub fn new(output_dir: &str, source_extension: &str, object_extension: &str) -> Self {
    Self {
      output_dir: output_dir.trim_end_matches('/').to_string(),
      source_extension: source_extension.trim_start_matches('.').to_string(),
      object_extension: object_extension.trim_start_matches('.').to_string(),
    }
  }

  /// Map a source file to its object path.
  ///
  /// Fails with [`MapError::UnsupportedExtension`] unless the file ends in the
  /// source extension and has a non-empty stem. A mismatched file is never
  /// passed through unchanged.
  pub fn map(&self, source: &SourceFile) -> Result<ArtifactPath, MapError> {
    let suffix = format!(".{}", self.source_extension);
    let stem = source
      .relative()
      .strip_suffix(&suffix)
      .filter(|stem| !stem.is_empty() && !stem.ends_with('/'))
      .ok_or_else(|| MapError::UnsupportedExtension {
        path: source.path().to_string(),
        expected: self.source_extension.clone(),
      })?;

    let object = format!("{}.{}", stem, self.object_extension);
    if self.output_dir.is_empty() {
      Ok(ArtifactPath(object))
    } else {
      Ok(ArtifactPath(format!("{}/{}", self.output_dir, object)))
    }
  }
}
