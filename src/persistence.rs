//! Storage of the single active progression record.

use crate::error::{PersistenceError, PersistenceResult};
use crate::model::ProgressionRecord;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// One save slot per player: `load` returns `None` when there is no game yet.
pub trait ProgressRepository: Send + Sync {
    fn load(&self) -> PersistenceResult<Option<ProgressionRecord>>;

    fn save(&self, record: &ProgressionRecord) -> PersistenceResult<()>;

    fn delete(&self) -> PersistenceResult<()>;

    fn has_existing_game(&self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }
}

#[derive(Default)]
pub struct InMemoryProgressRepo {
    record: RwLock<Option<ProgressionRecord>>,
}

impl InMemoryProgressRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: ProgressionRecord) -> Self {
        Self {
            record: RwLock::new(Some(record)),
        }
    }
}

impl ProgressRepository for InMemoryProgressRepo {
    fn load(&self) -> PersistenceResult<Option<ProgressionRecord>> {
        let record = self
            .record
            .read()
            .map_err(|_| PersistenceError::Load("save slot lock was poisoned".to_string()))?;
        Ok(record.clone())
    }

    fn save(&self, record: &ProgressionRecord) -> PersistenceResult<()> {
        let mut slot = self
            .record
            .write()
            .map_err(|_| PersistenceError::Save("save slot lock was poisoned".to_string()))?;
        *slot = Some(record.clone());
        Ok(())
    }

    fn delete(&self) -> PersistenceResult<()> {
        let mut slot = self
            .record
            .write()
            .map_err(|_| PersistenceError::Save("save slot lock was poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}

/// JSON save file. Writes go to a temp file first and are renamed into place.
pub struct FileProgressRepository {
    path: PathBuf,
}

impl FileProgressRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressRepository for FileProgressRepository {
    fn load(&self) -> PersistenceResult<Option<ProgressionRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| PersistenceError::Load(format!("{}: {e}", self.path.display())))?;
        let record: ProgressionRecord = serde_json::from_str(&raw)
            .map_err(|e| PersistenceError::Load(format!("{}: {e}", self.path.display())))?;
        tracing::debug!("Loaded progress from {}", self.path.display());
        Ok(Some(record))
    }

    fn save(&self, record: &ProgressionRecord) -> PersistenceResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| PersistenceError::Save(format!("{}: {e}", parent.display())))?;
        }
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| PersistenceError::Save(e.to_string()))?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)
            .map_err(|e| PersistenceError::Save(format!("{}: {e}", temp_path.display())))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| PersistenceError::Save(format!("{}: {e}", self.path.display())))?;
        tracing::info!("Saved progress to {}", self.path.display());
        Ok(())
    }

    fn delete(&self) -> PersistenceResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| PersistenceError::Save(format!("{}: {e}", self.path.display())))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::species;

    fn record() -> ProgressionRecord {
        ProgressionRecord::new_game(species(7).expect("squirtle is bundled"))
    }

    #[test]
    fn memory_repo_holds_one_record() {
        let repo = InMemoryProgressRepo::new();
        assert!(!repo.has_existing_game());
        let mut rec = record();
        repo.save(&rec).expect("save");
        rec.experience = 80;
        repo.save(&rec).expect("overwrite");
        let loaded = repo.load().expect("load").expect("present");
        assert_eq!(loaded.experience, 80);
        repo.delete().expect("delete");
        assert!(repo.load().expect("load").is_none());
    }

    #[test]
    fn file_repo_round_trips_and_deletes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileProgressRepository::new(dir.path().join("saves").join("progress.json"));
        assert!(repo.load().expect("missing file is not an error").is_none());

        let rec = record();
        repo.save(&rec).expect("save");
        assert!(repo.has_existing_game());
        assert_eq!(repo.load().expect("load"), Some(rec));
        assert!(!dir.path().join("saves").join("progress.json.tmp").exists());

        repo.delete().expect("delete");
        assert!(!repo.has_existing_game());
    }

    #[test]
    fn corrupt_file_is_a_load_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("progress.json");
        fs::write(&path, "{not json").expect("write");
        let repo = FileProgressRepository::new(&path);
        assert!(matches!(repo.load(), Err(PersistenceError::Load(_))));
        assert!(!repo.has_existing_game());
    }
}
