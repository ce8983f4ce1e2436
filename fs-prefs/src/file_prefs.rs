use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::base_prefs::BasePrefs;
use card_error::{CardError, Result};

const STORAGE_VERSION: i32 = 1;

/// File-backed preferences store.
///
/// The whole mapping lives in one versioned JSON document; every
/// mutation writes through to disk before returning, so the store is
/// durable at the granularity of single `set`/`remove` calls.
pub struct FilePrefs {
    /// Label for logging
    label: String,
    path: PathBuf,
    data: FilePrefsData,
}

/// On-disk form of a [`FilePrefs`] instance.
#[derive(Serialize, Deserialize)]
struct FilePrefsData {
    version: i32,
    entries: BTreeMap<String, Vec<u8>>,
}

impl FilePrefs {
    /// Open a preferences file with a diagnostic label, reading the
    /// existing document when the path is already populated.
    pub fn new(label: String, path: &Path) -> Result<Self> {
        let mut prefs = Self {
            label,
            path: PathBuf::from(path),
            data: FilePrefsData {
                version: STORAGE_VERSION,
                entries: BTreeMap::new(),
            },
        };

        if path.exists() {
            prefs.read_fs()?;
        }

        Ok(prefs)
    }

    fn read_fs(&mut self) -> Result<()> {
        let file = File::open(&self.path)?;
        let data: FilePrefsData = serde_json::from_reader(file)
            .map_err(|err| CardError::Storage(self.label.clone(), err.to_string()))?;

        if data.version != STORAGE_VERSION {
            return Err(CardError::Storage(
                self.label.clone(),
                format!(
                    "Storage version mismatch: expected {}, got {}",
                    STORAGE_VERSION, data.version
                ),
            ));
        }

        self.data = data;
        Ok(())
    }

    fn write_fs(&mut self) -> Result<()> {
        let parent_dir = self.path.parent().ok_or_else(|| {
            CardError::Storage(
                self.label.clone(),
                "Failed to get parent directory".to_owned(),
            )
        })?;
        fs::create_dir_all(parent_dir)?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        let value_data = serde_json::to_string(&self.data)?;
        writer.write_all(value_data.as_bytes())?;
        writer.flush()?;

        log::debug!(
            "prefs/{}: {} entries have been written",
            self.label,
            self.data.entries.len()
        );
        Ok(())
    }

    /// Remove the backing file from disk.
    pub fn erase(&self) -> Result<()> {
        fs::remove_file(&self.path)
            .map_err(|err| CardError::Storage(self.label.clone(), err.to_string()))
    }
}

impl BasePrefs for FilePrefs {
    fn get(&self, key: &str) -> Option<&[u8]> {
        self.data.entries.get(key).map(Vec::as_slice)
    }

    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.data.entries.insert(key.to_owned(), value);
        self.write_fs()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.data.entries.remove(key).is_none() {
            log::debug!("prefs/{}: removing absent key {}", self.label, key);
            return Ok(());
        }
        self.write_fs()
    }
}
