//! The metadata document: one JSON object mapping generated filenames to
//! [`PhotoRecord`]s, read and rewritten whole on every operation.
//!
//! Writes are plain overwrites. A crash mid-write can truncate the document,
//! and two processes sharing it race with last-write-wins.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Error;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PhotoRecord {
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub likes: u64,
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub uploaded_at: f64,
}

/// Records keyed by filename, in document order.
pub type Metadata = IndexMap<String, PhotoRecord>;

/// What [`MetadataStore::load`] does with a document it cannot read or parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Log the failure and carry on with an empty store.
    Lenient,
    /// Return the failure to the caller. A missing document is still empty.
    Strict,
}

impl Default for LoadPolicy {
    fn default() -> Self {
        LoadPolicy::Lenient
    }
}

#[derive(Clone, Debug)]
pub struct MetadataStore {
    path: PathBuf,
    policy: LoadPolicy,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>, policy: LoadPolicy) -> Self {
        MetadataStore {
            path: path.into(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an empty document if none exists yet.
    pub fn init(&self) -> Result<(), Error> {
        if self.path.exists() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        debug!(path = %self.path.display(), "creating empty metadata document");
        self.save(&Metadata::new())
    }

    pub fn load(&self) -> Result<Metadata, Error> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no metadata document, store is empty");
                return Ok(Metadata::new());
            },
            Err(err) => return self.fallback(err.into()),
        };

        match serde_json::from_slice(&raw) {
            Ok(metadata) => Ok(metadata),
            Err(err) => self.fallback(err.into()),
        }
    }

    fn fallback(&self, err: Error) -> Result<Metadata, Error> {
        match self.policy {
            LoadPolicy::Lenient => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    cause = ?std::error::Error::source(&err),
                    "could not load metadata, treating store as empty"
                );
                Ok(Metadata::new())
            },
            LoadPolicy::Strict => Err(err),
        }
    }

    /// Overwrites the document with `metadata`, indented, non-ASCII kept as is.
    pub fn save(&self, metadata: &Metadata) -> Result<(), Error> {
        let json = serde_json::to_vec_pretty(metadata)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
