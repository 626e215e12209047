//! JSON artifact writer.
//!
//! Output format is fixed so that artifacts are byte-for-byte reproducible:
//! UTF-8, 2-space indentation, non-ASCII characters written literally, object
//! keys in insertion order, no trailing newline.
//!
//! Writes go to a sibling `.tmp` file that is renamed over the destination,
//! so a reader never sees a half-written artifact.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ArtifactError, ArtifactResult};

/// Serialize a document with the artifact formatting rules.
pub fn to_artifact_string(document: &Value) -> ArtifactResult<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Write a document to `path`, replacing any previous artifact.
///
/// Parent directories are created as needed.
pub fn write_artifact(path: &Path, document: &Value) -> ArtifactResult<()> {
    let content = to_artifact_string(document)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }

    let tmp = tmp_path(path);
    fs::write(&tmp, content.as_bytes()).map_err(|source| io_error(&tmp, source))?;
    fs::rename(&tmp, path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        io_error(path, source)
    })?;

    Ok(())
}

/// Read an artifact back as a JSON document.
pub fn read_artifact(path: &Path) -> ArtifactResult<Value> {
    let content = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    Ok(serde_json::from_str(&content)?)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn io_error(path: &Path, source: std::io::Error) -> ArtifactError {
    ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    }
}
