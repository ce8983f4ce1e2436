use std::collections::BTreeMap;

use crate::base_prefs::BasePrefs;
use card_error::Result;

/// In-memory preferences store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryPrefs {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BasePrefs for MemoryPrefs {
    fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
