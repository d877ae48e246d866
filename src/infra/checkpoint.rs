// ============================================================
// Layer 6 — Checkpoint Store
// ============================================================
// Persists model snapshots keyed by a logical model name.
//
// File layout:
//   checkpoints/
//     lstm/
//       manifest.json      ← commit record for the key
//       lstm-v7.bin        ← encoded parameters, version 7
//     train_config.json    ← run configuration
//     normalizer.json      ← fitted feature scaling
//
// How a save works:
//   1. Write the payload to a temp file in the key directory,
//      fsync, rename to `<key>-v<N>.bin`
//   2. Write the manifest (version, shapes, byte length,
//      sha256 of the payload) the same way; this rename is
//      the commit point
//   3. Delete the previous version's payload
//
// A crash before step 2 finishes leaves the old manifest
// pointing at the old payload, so readers never see a torn
// checkpoint. Temp files are uniquely named by `tempfile`,
// which keeps concurrent saves from clobbering each other.
//
// Loads verify the byte length and digest before handing the
// state to the model; the model then verifies the shapes.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

use crate::domain::{
    error::CheckpointError,
    traits::{is_valid_checkpoint_key, CheckpointInfo, CheckpointStore, ModelState},
};

const MANIFEST_FILE: &str = "manifest.json";

/// Commit record of one checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointManifest {
    pub key:      String,
    pub version:  u64,
    pub saved_at: DateTime<Utc>,
    pub shapes:   Vec<Vec<usize>>,
    /// Payload file name, relative to the key directory
    pub payload:  String,
    pub bytes:    u64,
    pub sha256:   String,
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Write `bytes` to `target` via a temp file in the same directory.
fn write_atomic(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

// ─── FileCheckpointStore ──────────────────────────────────────────────────────

pub struct FileCheckpointStore {
    /// Root directory; each key gets its own subdirectory
    dir: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_dir(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Keys become directory and file names, so only a safe subset
    /// of characters is allowed.
    fn check_key(&self, key: &str) -> Result<(), CheckpointError> {
        if is_valid_checkpoint_key(key) {
            Ok(())
        } else {
            Err(CheckpointError::Io {
                key:    key.to_string(),
                path:   self.dir.clone(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "invalid checkpoint key"),
            })
        }
    }

    /// Read the committed manifest for `key`.
    fn manifest(&self, key: &str) -> Result<CheckpointManifest, CheckpointError> {
        self.check_key(key)?;
        let path = self.key_dir(key).join(MANIFEST_FILE);

        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CheckpointError::NotFound { key: key.to_string() });
            }
            Err(source) => return Err(CheckpointError::Io { key: key.to_string(), path, source }),
        };

        let manifest: CheckpointManifest = serde_json::from_str(&json).map_err(|e| {
            CheckpointError::Corrupt { key: key.to_string(), reason: format!("unreadable manifest: {e}") }
        })?;

        if manifest.key != key {
            return Err(CheckpointError::Corrupt {
                key:    key.to_string(),
                reason: format!("manifest belongs to '{}'", manifest.key),
            });
        }
        Ok(manifest)
    }

    /// Save any serialisable value as pretty JSON in the root directory.
    pub fn save_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", self.dir.display()))?;

        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        write_atomic(&path, json.as_bytes())
            .with_context(|| format!("Cannot write '{}'", path.display()))?;

        tracing::debug!("Saved '{}'", path.display());
        Ok(path)
    }

    pub fn load_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Make sure you have run 'train' before 'evaluate'.",
                path.display()
            )
        })?;
        serde_json::from_str(&json).with_context(|| format!("Malformed JSON in '{}'", path.display()))
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn save(&self, key: &str, state: &ModelState) -> Result<CheckpointInfo, CheckpointError> {
        self.check_key(key)?;
        let key_dir = self.key_dir(key);
        let io_err  = |path: &Path| {
            let path = path.to_path_buf();
            move |source: io::Error| CheckpointError::Io { key: key.to_string(), path, source }
        };

        fs::create_dir_all(&key_dir).map_err(io_err(&key_dir))?;

        let previous = match self.manifest(key) {
            Ok(m) => Some(m),
            Err(CheckpointError::NotFound { .. }) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable manifest for '{}'", key);
                None
            }
        };
        let version = previous.as_ref().map_or(1, |m| m.version + 1);

        // 1. payload
        let payload      = format!("{key}-v{version}.bin");
        let payload_path = key_dir.join(&payload);
        write_atomic(&payload_path, &state.payload).map_err(io_err(&payload_path))?;

        // 2. manifest (commit point)
        let manifest = CheckpointManifest {
            key:      key.to_string(),
            version,
            saved_at: Utc::now(),
            shapes:   state.shapes.clone(),
            payload,
            bytes:    state.payload.len() as u64,
            sha256:   sha256_hex(&state.payload),
        };
        let manifest_path = key_dir.join(MANIFEST_FILE);
        let json = serde_json::to_vec_pretty(&manifest).map_err(|e| CheckpointError::Io {
            key:    key.to_string(),
            path:   manifest_path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        write_atomic(&manifest_path, &json).map_err(io_err(&manifest_path))?;

        // 3. prune the superseded payload
        if let Some(old) = previous.filter(|m| m.payload != manifest.payload) {
            let old_path = key_dir.join(&old.payload);
            if let Err(e) = fs::remove_file(&old_path) {
                tracing::warn!(error = %e, "Could not remove old checkpoint '{}'", old_path.display());
            }
        }

        tracing::debug!("Saved checkpoint '{}' v{} ({} bytes)", key, version, manifest.bytes);
        Ok(CheckpointInfo { key: key.to_string(), version, path: payload_path })
    }

    fn load(&self, key: &str) -> Result<ModelState, CheckpointError> {
        self.load_versioned(key).map(|(_, state)| state)
    }
}

impl FileCheckpointStore {
    /// Load `key` together with the manifest it was verified against,
    /// from a single manifest read.
    pub fn load_versioned(&self, key: &str) -> Result<(CheckpointManifest, ModelState), CheckpointError> {
        let manifest = self.manifest(key)?;
        let path     = self.key_dir(key).join(&manifest.payload);
        let corrupt  = |reason: String| CheckpointError::Corrupt { key: key.to_string(), reason };

        let payload = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(corrupt(format!("payload '{}' is missing", manifest.payload)));
            }
            Err(source) => return Err(CheckpointError::Io { key: key.to_string(), path, source }),
        };

        if payload.len() as u64 != manifest.bytes {
            return Err(corrupt(format!(
                "expected {} bytes, found {}",
                manifest.bytes,
                payload.len()
            )));
        }
        if sha256_hex(&payload) != manifest.sha256 {
            return Err(corrupt("sha256 digest mismatch".to_string()));
        }

        tracing::info!("Loaded checkpoint '{}' v{} saved at {}", key, manifest.version, manifest.saved_at);
        let state = ModelState { shapes: manifest.shapes.clone(), payload };
        Ok((manifest, state))
    }
}
