//! Checkpoint - Per-Station Result Files
//!
//! One CSV file per finished station (`inventory,udf`, one row per inventory
//! level) plus a run manifest tying the directory to one engine config.
//!
//! # Critical Invariants
//!
//! - **Completion marker**: a station's checkpoint file exists if and only if
//!   its computation finished; files are written to a temporary sibling and
//!   renamed into place, so a partial file is never visible under the final name
//! - **Write once**: existing checkpoints are never rewritten
//! - **Config matching**: a directory written under one config hash cannot be
//!   resumed under another

use crate::udf::config::UdfConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default directory for per-station checkpoints
pub const DEFAULT_CHECKPOINT_DIR: &str = "results/intermediate";

/// Manifest file name inside the checkpoint directory
pub const MANIFEST_FILE: &str = "run.json";

const CHECKPOINT_HEADER: [&str; 2] = ["inventory", "udf"];

/// Errors raised by checkpoint persistence
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error on {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Checkpoint already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Malformed checkpoint {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Checkpoint directory was written with config {found}, current config is {expected}")]
    ConfigMismatch { expected: String, found: String },
}

// ============================================================================
// Snapshot Structures
// ============================================================================

/// One checkpoint row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRow {
    pub inventory: usize,
    pub udf: f64,
}

/// Contents of `run.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// SHA256 of the canonical JSON of `config`
    pub config_hash: String,

    pub config: UdfConfig,
}

/// What [`CheckpointStore::ensure_manifest`] found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestStatus {
    /// No manifest existed; one was written
    Created,
    /// Existing manifest matches the current config
    Matched,
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Compute deterministic SHA256 hash of config
///
/// Uses canonical JSON serialization with sorted keys so the hash does not
/// depend on field or map ordering.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, CheckpointError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        CheckpointError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        CheckpointError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// File Naming
// ============================================================================

/// Make a station id safe to use as a file name
///
/// Path separators, characters reserved on common filesystems, and control
/// characters become `_`. A leading `.` also becomes `_` so ids like `..`
/// cannot escape the directory or create hidden files.
///
/// # Example
/// ```
/// use station_udf_core_rs::orchestrator::checkpoint::sanitize_station_id;
///
/// assert_eq!(sanitize_station_id("HB/101"), "HB_101");
/// assert_eq!(sanitize_station_id(".."), "_.");
/// assert_eq!(sanitize_station_id(""), "_");
/// ```
pub fn sanitize_station_id(id: &str) -> String {
    let mut sanitized: String = id
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.starts_with('.') {
        sanitized.replace_range(..1, "_");
    }
    if sanitized.is_empty() {
        sanitized.push('_');
    }
    sanitized
}

// ============================================================================
// Store
// ============================================================================

/// Checkpoint directory handle
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory (and parents) if missing
    pub fn prepare(&self) -> Result<(), CheckpointError> {
        fs::create_dir_all(&self.dir).map_err(|source| CheckpointError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    /// Checkpoint path for a station id
    pub fn path_for(&self, station_id: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", sanitize_station_id(station_id)))
    }

    /// Whether this station already finished in some earlier run
    pub fn exists(&self, station_id: &str) -> bool {
        self.path_for(station_id).is_file()
    }

    /// Write a station's UDF table
    ///
    /// Refuses to overwrite an existing checkpoint.
    pub fn write(&self, station_id: &str, udf: &[f64]) -> Result<PathBuf, CheckpointError> {
        let path = self.path_for(station_id);
        if path.exists() {
            return Err(CheckpointError::AlreadyExists(path));
        }

        let tmp_path = path.with_extension("csv.tmp");
        let csv_err = |source: csv::Error| CheckpointError::Csv {
            path: tmp_path.clone(),
            source,
        };

        {
            let mut writer = csv::Writer::from_path(&tmp_path).map_err(csv_err)?;
            for (inventory, &udf) in udf.iter().enumerate() {
                writer
                    .serialize(CheckpointRow { inventory, udf })
                    .map_err(csv_err)?;
            }
            if udf.is_empty() {
                writer.write_record(CHECKPOINT_HEADER).map_err(csv_err)?;
            }
            writer.flush().map_err(|source| CheckpointError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        }

        fs::rename(&tmp_path, &path).map_err(|source| CheckpointError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Read a station's UDF table back
    ///
    /// Rows must be `0, 1, 2, …` in order with no gaps.
    pub fn load(&self, station_id: &str) -> Result<Vec<f64>, CheckpointError> {
        let path = self.path_for(station_id);
        let csv_err = |source: csv::Error| CheckpointError::Csv {
            path: path.clone(),
            source,
        };

        let mut reader = csv::Reader::from_path(&path).map_err(csv_err)?;
        let headers = reader.headers().map_err(csv_err)?.clone();
        if headers.iter().ne(CHECKPOINT_HEADER) {
            return Err(CheckpointError::Malformed {
                path: path.clone(),
                reason: format!("unexpected header {:?}", headers),
            });
        }

        let mut udf = Vec::new();
        for row in reader.deserialize::<CheckpointRow>() {
            let row = row.map_err(csv_err)?;
            if row.inventory != udf.len() {
                return Err(CheckpointError::Malformed {
                    path: path.clone(),
                    reason: format!("expected inventory {}, found {}", udf.len(), row.inventory),
                });
            }
            udf.push(row.udf);
        }

        Ok(udf)
    }

    /// Check or create the run manifest for `config`
    ///
    /// # Errors
    /// [`CheckpointError::ConfigMismatch`] if the directory already holds a
    /// manifest for a different config.
    pub fn ensure_manifest(&self, config: &UdfConfig) -> Result<ManifestStatus, CheckpointError> {
        let path = self.dir.join(MANIFEST_FILE);
        let config_hash = compute_config_hash(config)?;

        if path.is_file() {
            let raw = fs::read_to_string(&path).map_err(|source| CheckpointError::Io {
                path: path.clone(),
                source,
            })?;
            let existing: RunManifest = serde_json::from_str(&raw).map_err(|e| {
                CheckpointError::Malformed {
                    path: path.clone(),
                    reason: e.to_string(),
                }
            })?;

            if existing.config_hash != config_hash {
                return Err(CheckpointError::ConfigMismatch {
                    expected: config_hash,
                    found: existing.config_hash,
                });
            }
            return Ok(ManifestStatus::Matched);
        }

        let manifest = RunManifest {
            config_hash,
            config: *config,
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| CheckpointError::SerializationError(e.to_string()))?;
        fs::write(&path, json).map_err(|source| CheckpointError::Io { path, source })?;
        Ok(ManifestStatus::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_config_hash_deterministic() {
        let hash1 = compute_config_hash(&UdfConfig::default()).unwrap();
        let hash2 = compute_config_hash(&UdfConfig::default()).unwrap();

        assert_eq!(hash1, hash2, "Same config should produce same hash");
    }

    #[test]
    fn test_compute_config_hash_different_for_different_configs() {
        let hash1 = compute_config_hash(&UdfConfig::default()).unwrap();
        let hash2 = compute_config_hash(&UdfConfig::with_discretization(15.0)).unwrap();

        assert_ne!(
            hash1, hash2,
            "Different configs should produce different hashes"
        );
    }

    #[test]
    fn test_sanitize_reserved_characters() {
        assert_eq!(sanitize_station_id(r#"a\b:c*d?e"f<g>h|i"#), "a_b_c_d_e_f_g_h_i");
        assert_eq!(sanitize_station_id("tab\there"), "tab_here");
        assert_eq!(sanitize_station_id(".hidden"), "_hidden");
        assert_eq!(sanitize_station_id("plain-id_42"), "plain-id_42");
    }
}
