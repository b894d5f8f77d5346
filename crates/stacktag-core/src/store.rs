//! Named artifact persistence.
//!
//! Each artifact is a single file `<dir>/<name>.json` holding an envelope:
//!
//! ```json
//! {"format_version": 1, "checksum": "<blake3 hex>", "payload": { ... }}
//! ```
//!
//! The checksum covers the exact payload bytes. Writes go to a uniquely named
//! temporary file in the same directory which is then renamed over the target,
//! so a reader sees either the previous envelope or the complete new one.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::ArtifactError;

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    format_version: u32,
    checksum: &'a str,
    payload: &'a RawValue,
}

#[derive(Deserialize)]
struct Envelope {
    format_version: u32,
    checksum: String,
    payload: Box<RawValue>,
}

/// Directory-backed store of named, serializable artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the artifact stored under `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Whether an artifact is stored under `name`.
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).exists()
    }

    /// Serialize `value` and atomically replace whatever is stored under `name`.
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), ArtifactError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ArtifactError::Write {
            path: self.dir.clone(),
            source,
        })?;

        let encode = |source| ArtifactError::Encode {
            name: name.to_string(),
            source,
        };
        let payload = serde_json::value::to_raw_value(value).map_err(encode)?;
        let checksum = blake3::hash(payload.get().as_bytes()).to_hex().to_string();
        let bytes = serde_json::to_vec(&EnvelopeRef {
            format_version: FORMAT_VERSION,
            checksum: &checksum,
            payload: &payload,
        })
        .map_err(encode)?;

        let path = self.path_for(name);
        self.write_atomic(&path, &bytes)?;

        tracing::info!(
            "Saved artifact '{}' to {:?} ({:.1} KB)",
            name,
            path,
            bytes.len() as f64 / 1_000.0
        );
        Ok(())
    }

    /// Load and deserialize the artifact stored under `name`.
    ///
    /// The envelope's format version and payload checksum are verified first.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArtifactError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(ArtifactError::NotFound(path));
        }
        let bytes = std::fs::read(&path).map_err(|source| ArtifactError::Read {
            path: path.clone(),
            source,
        })?;

        let decode = |source| ArtifactError::Decode {
            name: name.to_string(),
            source,
        };
        let envelope: Envelope = serde_json::from_slice(&bytes).map_err(decode)?;
        if envelope.format_version != FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedFormat {
                name: name.to_string(),
                found: envelope.format_version,
                expected: FORMAT_VERSION,
            });
        }

        let payload = envelope.payload.get();
        let actual = blake3::hash(payload.as_bytes()).to_hex().to_string();
        if actual != envelope.checksum {
            return Err(ArtifactError::ChecksumMismatch {
                name: name.to_string(),
                expected: envelope.checksum,
                actual,
            });
        }

        let value = serde_json::from_str(payload).map_err(decode)?;
        tracing::info!("Loaded artifact '{}' from {:?}", name, path);
        Ok(value)
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
        let write_err = |source| ArtifactError::Write {
            path: path.to_path_buf(),
            source,
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(bytes).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        // Dropping the returned error removes the temporary file.
        tmp.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}
