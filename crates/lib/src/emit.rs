//! Writing the generated build file.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::graph::BuildGraph;
use crate::ninja::to_ninja_string;

#[derive(Debug, Error)]
pub enum WriteError {
  #[error("permission denied writing {}", path.display())]
  PermissionDenied { path: PathBuf },

  #[error("failed to write {}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl WriteError {
  fn from_io(path: &Path, source: io::Error) -> Self {
    match source.kind() {
      io::ErrorKind::PermissionDenied => WriteError::PermissionDenied {
        path: path.to_path_buf(),
      },
      _ => WriteError::Write {
        path: path.to_path_buf(),
        source,
      },
    }
  }
}

/// Sibling path used while writing `path`, e.g. `build.ninja.tmp`.
fn temp_path(path: &Path) -> PathBuf {
  let mut name = OsString::from(path.as_os_str());
  name.push(".tmp");
  PathBuf::from(name)
}

/// Replace `path` with `contents`.
///
/// Writes to a temporary sibling and renames it over the destination, so an
/// existing file is either fully replaced or left as it was.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), WriteError> {
  let temp = temp_path(path);
  debug!(temp = %temp.display(), "writing temporary build file");

  if let Err(e) = fs::write(&temp, contents).and_then(|()| fs::rename(&temp, path)) {
    // Never leave a partial temp file behind.
    let _ = fs::remove_file(&temp);
    return Err(WriteError::from_io(path, e));
  }

  info!(path = %path.display(), bytes = contents.len(), "wrote build file");
  Ok(())
}

/// Serialize `graph` and write it to `path`.
pub fn write_build_file(path: &Path, graph: &BuildGraph) -> Result<String, WriteError> {
  let contents = to_ninja_string(graph);
  write_atomic(path, &contents)?;
  Ok(contents)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assemble::assemble;
  use crate::config::BootstrapConfig;
  use tempfile::TempDir;

  #[test]
  fn writes_new_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("build.ninja");

    write_atomic(&path, "default tests\n").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "default tests\n");
    assert!(!temp_path(&path).exists());
  }

  #[test]
  fn replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("build.ninja");
    fs::write(&path, "old contents that are longer than the new ones\n").unwrap();

    write_atomic(&path, "new\n").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
  }

  #[test]
  fn missing_directory_fails_with_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("no/such/dir/build.ninja");

    let err = write_atomic(&path, "x").unwrap_err();

    assert!(matches!(err, WriteError::Write { .. }));
    assert!(err.to_string().contains("build.ninja"));
    assert!(!path.exists());
  }

  #[test]
  fn failed_write_leaves_no_temp_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("build.ninja");
    // A directory in the way makes the rename fail after the temp is written.
    fs::create_dir(&path).unwrap();
    fs::write(path.join("keep"), "").unwrap();

    let err = write_atomic(&path, "x").unwrap_err();

    assert!(matches!(err, WriteError::Write { ref path, .. } if path.ends_with("build.ninja")));
    assert!(!temp_path(&path).exists());
  }

  #[cfg(unix)]
  #[test]
  fn read_only_directory_is_permission_denied() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("out");
    fs::create_dir(&dir).unwrap();
    fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();

    // Permission bits do not apply to root.
    if fs::write(dir.join("writable"), "").is_ok() {
      fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
      return;
    }

    let path = dir.join("build.ninja");
    let result = write_atomic(&path, "default tests\n");
    fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

    let err = result.unwrap_err();
    assert!(matches!(err, WriteError::PermissionDenied { path: ref denied } if denied == &path));
    assert!(err.to_string().contains("build.ninja"));
    assert!(!path.exists());
    assert!(!temp_path(&path).exists());
  }

  #[test]
  fn temp_path_is_a_sibling() {
    assert_eq!(
      temp_path(Path::new("out/build.ninja")),
      PathBuf::from("out/build.ninja.tmp")
    );
  }

  #[test]
  fn write_build_file_returns_written_text() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("build.ninja");
    let graph = assemble(&BootstrapConfig::default(), &[]).unwrap();

    let contents = write_build_file(&path, &graph).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), contents);
    assert!(contents.contains("build tests: link\n"));
    assert!(contents.ends_with("default tests\n"));
  }
}
