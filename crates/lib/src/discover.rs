//! Source file discovery.
//!
//! Walks a directory tree and yields every file whose basename matches
//! a glob pattern. Discovery is split in two phases:
//!
//! - [`discover`]: a lazy iterator in raw traversal order, surfacing errors as
//!   they are hit.
//! - [`collect_sources`]: drains the walk into a sorted `Vec`, which is what the
//!   assembler consumes. Sorting makes the generated file independent of the
//!   filesystem's directory order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Errors that can occur while discovering source files.
#[derive(Debug, Error)]
pub enum DiscoverError {
  #[error("source root not found: {}", path.display())]
  NotFound { path: PathBuf },

  #[error("source root is not a directory: {}", path.display())]
  NotADirectory { path: PathBuf },

  #[error("permission denied: {}", path.display())]
  PermissionDenied { path: PathBuf },

  #[error("invalid glob pattern {pattern:?}: {message}")]
  InvalidPattern { pattern: String, message: String },

  #[error("failed to walk {}: {message}", path.display())]
  Walk { path: PathBuf, message: String },
}

/// A file found under the source root.
///
/// Ordering compares the path relative to the root first, which gives the
/// lexicographic edge order of the generated file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceFile {
  relative: String,
  path: String,
}

impl SourceFile {
  /// Create a source from the root it was found under and its path relative
  /// to that root. Both use `/` as separator.
  pub fn new(root: &str, relative: &str) -> Self {
    let relative = relative.trim_start_matches('/').to_string();
    let root = root.trim_end_matches('/');
    let path = if root.is_empty() || root == "." {
      relative.clone()
    } else {
      format!("{}/{}", root, relative)
    };
    Self { relative, path }
  }

  /// Path as written into the build file, e.g. `test/sub/b.cpp`.
  pub fn path(&self) -> &str {
    &self.path
  }

  /// Path below the source root, e.g. `sub/b.cpp`.
  pub fn relative(&self) -> &str {
    &self.relative
  }
}

/// A glob pattern compiled once into a matcher.
///
/// Matching is against the whole basename, never a substring, and `*` never
/// crosses a `/`.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
  pattern: String,
  glob: globset::GlobMatcher,
}

impl GlobMatcher {
  pub fn new(pattern: &str) -> Result<Self, DiscoverError> {
    let glob = GlobBuilder::new(pattern)
      .literal_separator(true)
      .build()
      .map_err(|e| DiscoverError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.kind().to_string(),
      })?
      .compile_matcher();
    Ok(Self {
      pattern: pattern.to_string(),
      glob,
    })
  }

  pub fn pattern(&self) -> &str {
    &self.pattern
  }

  /// Whether `name`, a single path component, matches the pattern.
  pub fn is_match(&self, name: impl AsRef<Path>) -> bool {
    self.glob.is_match(name)
  }
}

/// Render a path with `/` separators regardless of platform.
fn to_slash(path: &Path) -> String {
  let s = path.to_string_lossy();
  if std::path::MAIN_SEPARATOR == '\\' {
    s.replace('\\', "/")
  } else {
    s.into_owned()
  }
}

fn walk_error(root: &Path, err: walkdir::Error) -> DiscoverError {
  let path = err.path().unwrap_or(root).to_path_buf();
  match err.io_error().map(io::Error::kind) {
    Some(io::ErrorKind::NotFound) => DiscoverError::NotFound { path },
    Some(io::ErrorKind::PermissionDenied) => DiscoverError::PermissionDenied { path },
    _ => DiscoverError::Walk {
      path,
      message: err.to_string(),
    },
  }
}

/// Lazily walk `root` and yield every file whose basename matches `matcher`.
///
/// Order is whatever the filesystem walk produces (directories top-down).
/// Directories are never yielded, even when their name matches. A symlink to a
/// file is yielded under its own name; symlinked directories are not followed.
/// A matching file whose path is not valid UTF-8 is an error, since it cannot
/// be written into the build file.
pub fn discover<'a>(
  root: &'a Path,
  matcher: &'a GlobMatcher,
) -> impl Iterator<Item = Result<SourceFile, DiscoverError>> + 'a {
  let root_display = to_slash(root);

  WalkDir::new(root)
    .follow_links(false)
    .into_iter()
    .filter_map(move |entry| {
      let entry = match entry {
        Ok(entry) => entry,
        Err(err) => return Some(Err(walk_error(root, err))),
      };

      // A symlink counts when it resolves to a file; linked directories are
      // not descended into.
      let is_file = entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file());
      if !is_file || !matcher.is_match(entry.file_name()) {
        return None;
      }

      let relative = entry.path().strip_prefix(root).ok()?;
      let Some(relative) = relative.to_str() else {
        return Some(Err(DiscoverError::Walk {
          path: entry.path().to_path_buf(),
          message: "file name is not valid UTF-8".to_string(),
        }));
      };
      let source = SourceFile::new(&root_display, &to_slash(Path::new(relative)));
      debug!(path = source.path(), "matched source file");
      Some(Ok(source))
    })
}

/// Collect every file under `root` matching `pattern`, sorted by path.
///
/// The first error aborts collection; no partial listing is returned.
pub fn collect_sources(root: &Path, pattern: &str) -> Result<Vec<SourceFile>, DiscoverError> {
  let matcher = GlobMatcher::new(pattern)?;

  let metadata = fs::metadata(root).map_err(|e| match e.kind() {
    io::ErrorKind::NotFound => DiscoverError::NotFound {
      path: root.to_path_buf(),
    },
    io::ErrorKind::PermissionDenied => DiscoverError::PermissionDenied {
      path: root.to_path_buf(),
    },
    _ => DiscoverError::Walk {
      path: root.to_path_buf(),
      message: e.to_string(),
    },
  })?;
  if !metadata.is_dir() {
    return Err(DiscoverError::NotADirectory {
      path: root.to_path_buf(),
    });
  }

  let mut sources = discover(root, &matcher).collect::<Result<Vec<_>, _>>()?;
  sources.sort();

  info!(
    root = %root.display(),
    pattern = matcher.pattern(),
    count = sources.len(),
    "discovered source files"
  );

  Ok(sources)
}
