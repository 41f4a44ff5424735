use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::errors::BackendError;
use crate::store::SlotStorage;

/// Slots stored as `<directory>/<key>.json`.
///
/// Writes go to a temporary file in the same directory which then
/// replaces the slot, so readers never observe a half-written value.
#[derive(Clone, Debug)]
pub struct FileSlots {
    directory: PathBuf,
}

impl FileSlots {
    /// Opens `directory`, creating it if needed.
    pub fn open(directory: impl AsRef<Path>) -> Result<Self, BackendError> {
        let directory = directory.as_ref().to_owned();

        fs::create_dir_all(&directory).map_err(|source| BackendError::StorageDirectory {
            path: directory.clone(),
            source,
        })?;

        Ok(Self { directory })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }
}

impl SlotStorage for FileSlots {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(BackendError::Storage {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let storage_error = |source: std::io::Error| BackendError::Storage {
            key: key.to_owned(),
            source,
        };

        let mut file = NamedTempFile::new_in(&self.directory).map_err(storage_error)?;
        file.write_all(value.as_bytes()).map_err(storage_error)?;
        file.flush().map_err(storage_error)?;

        file.persist(self.path_for(key))
            .map_err(|source| BackendError::Persist {
                key: key.to_owned(),
                source,
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_slot_is_none() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let slots = FileSlots::open(directory.path()).expect("open slots");

        assert_eq!(slots.get("absent").expect("get absent slot"), None);
    }

    #[test]
    fn values_survive_reopening() {
        let directory = tempfile::tempdir().expect("create temporary directory");

        {
            let slots = FileSlots::open(directory.path()).expect("open slots");
            slots.set("greeting", "नमस्ते").expect("set slot");
            slots.set("greeting", "[]").expect("overwrite slot");
        }

        let slots = FileSlots::open(directory.path()).expect("reopen slots");
        assert_eq!(slots.get("greeting").expect("get slot"), Some("[]".to_owned()));
        assert!(directory.path().join("greeting.json").exists());
    }

    #[test]
    fn open_creates_nested_directories() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let nested = directory.path().join("a").join("b");

        FileSlots::open(&nested).expect("open nested slots");

        assert!(nested.is_dir());
    }
}
