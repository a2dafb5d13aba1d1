use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::ledger::Transaction;

/// A named copy of the ledger kept inside the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFile {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "date")]
    pub saved_at: NaiveDateTime,
    pub item_count: usize,
    pub data: Vec<Transaction>,
}

impl SavedFile {
    pub fn new(name: impl Into<String>, saved_at: NaiveDateTime, data: Vec<Transaction>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            saved_at,
            item_count: data.len(),
            data,
        }
    }
}

/// Saved files, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedFileLibrary {
    files: Vec<SavedFile>,
}

impl SavedFileLibrary {
    pub fn new(files: Vec<SavedFile>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[SavedFile] {
        &self.files
    }

    /// Stores a copy under `name`. A file with the same name (ignoring case) is
    /// replaced where it sits; a new name goes to the front.
    pub fn save(
        &mut self,
        name: &str,
        saved_at: NaiveDateTime,
        data: Vec<Transaction>,
    ) -> Result<&SavedFile, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidInput("file name is required".into()));
        }
        let file = SavedFile::new(name, saved_at, data);
        let lowered = name.to_lowercase();
        let slot = match self
            .files
            .iter()
            .position(|existing| existing.name.to_lowercase() == lowered)
        {
            Some(idx) => {
                self.files[idx] = file;
                idx
            }
            None => {
                self.files.insert(0, file);
                0
            }
        };
        Ok(&self.files[slot])
    }

    pub fn get(&self, id: Uuid) -> Option<&SavedFile> {
        self.files.iter().find(|file| file.id == id)
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.files.len();
        self.files.retain(|file| file.id != id);
        self.files.len() != before
    }

    pub fn into_files(self) -> Vec<SavedFile> {
        self.files
    }
}
