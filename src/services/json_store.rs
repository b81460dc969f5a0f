//! Atomic JSON persistence for the small state files.
//!
//! Files are written to a temp sibling, synced, then renamed over the
//! target, so a crash never leaves a truncated store behind.

use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());
    path.with_file_name(format!(".{}.tmp", file_name))
}

/// Replace `path` with `contents` all-or-nothing
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Io(format!("Failed to create {}: {}", parent.display(), e)))?;
    }

    let temp_path = temp_path_for(path);
    let write_result = (|| -> std::io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()
    })();

    if let Err(e) = write_result {
        error!(error = %e, path = %temp_path.display(), "Failed to write temp file");
        let _ = fs::remove_file(&temp_path);
        return Err(AppError::Io(format!("Failed to write {}: {}", temp_path.display(), e)));
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        error!(error = %e, "Failed to rename temp file");
        let _ = fs::remove_file(&temp_path);
        return Err(AppError::Io(format!("Failed to replace {}: {}", path.display(), e)));
    }

    debug!(path = %path.display(), size = contents.len(), "File saved");
    Ok(())
}

/// Load a JSON store; a missing file is the empty default, an unparsable one is `StoreCorrupt`
pub fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => {
            return Err(AppError::Io(format!("Failed to read {}: {}", path.display(), e)));
        }
    };

    serde_json::from_str(&content).map_err(|e| AppError::StoreCorrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Serialize as pretty JSON with a trailing newline
pub fn to_store_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Serialize and replace atomically
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, &to_store_bytes(value)?)
}
