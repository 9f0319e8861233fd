//! Small persistent key-value storage for session values.
//!
//! The file is read once when the storage is opened and rewritten in full on
//! every update, so the on-disk copy always matches the last write.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::{LeadflowError, Result};

/// Key under which the pending one-time-password identifier is kept.
pub const OTP_ID_KEY: &str = "otp_id";

#[derive(Debug)]
pub struct LocalStorage {
    path: Option<PathBuf>,
    values: RwLock<BTreeMap<String, String>>,
}

impl LocalStorage {
    /// Open storage backed by `path`. A missing file is an empty storage.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                LeadflowError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read storage at {}: {}", path.display(), e),
                ))
            })?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: Some(path),
            values: RwLock::new(values),
        })
    }

    /// Storage that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<()> {
        let mut values = self.values.write();
        values.insert(key.to_string(), value.into());
        self.persist(&values)
    }

    pub fn remove(&self, key: &str) -> Result<Option<String>> {
        let mut values = self.values.write();
        let removed = values.remove(key);
        if removed.is_some() {
            self.persist(&values)?;
        }
        Ok(removed)
    }

    pub fn otp_id(&self) -> Option<String> {
        self.get(OTP_ID_KEY)
    }

    pub fn set_otp_id(&self, id: impl Into<String>) -> Result<()> {
        self.set(OTP_ID_KEY, id)
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(values)?;
        fs::write(path, content).map_err(|e| {
            LeadflowError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write storage at {}: {}", path.display(), e),
            ))
        })?;
        tracing::trace!(path = %path.display(), keys = values.len(), "storage persisted");
        Ok(())
    }
}
