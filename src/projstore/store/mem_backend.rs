use super::backend::{Staged, StagingKind, StagingSlot, StorageBackend};
use crate::error::{Result, StoreError};
use crate::ids::{CREATE_STAGING_ID, UPDATE_STAGING_ID};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Default)]
struct MemState {
    records: HashMap<String, String>,
    staged: HashMap<PathBuf, (StagingKind, String)>,
}

#[derive(Default)]
struct Faults {
    write: bool,
    promote: bool,
    remove: bool,
}

/// In-memory storage backend for testing.
///
/// Uses `Mutex` rather than `RefCell` so a `ProjectStore<MemBackend>` stays
/// `Sync`, like the filesystem-backed store.
#[derive(Default)]
pub struct MemBackend {
    state: Mutex<MemState>,
    faults: Mutex<Faults>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a committed record, bypassing staging.
    pub fn insert_record(&self, name: &str, content: &str) {
        self.state()
            .records
            .insert(name.to_string(), content.to_string());
    }

    /// Make record and staging writes fail.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.faults().write = simulate;
    }

    /// Make promoting a staged file fail, as if it vanished before the rename.
    pub fn set_simulate_promote_error(&self, simulate: bool) {
        self.faults().promote = simulate;
    }

    /// Make record removal fail.
    pub fn set_simulate_remove_error(&self, simulate: bool) {
        self.faults().remove = simulate;
    }

    pub fn staged_count(&self) -> usize {
        self.state().staged.len()
    }

    fn state(&self) -> MutexGuard<'_, MemState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_write(&self) -> Result<()> {
        if self.faults().write {
            return Err(StoreError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn list_records(&self) -> Result<Vec<String>> {
        Ok(self.state().records.keys().cloned().collect())
    }

    fn read_record(&self, name: &str) -> Result<Option<String>> {
        Ok(self.state().records.get(name).cloned())
    }

    fn write_record(&self, name: &str, content: &str) -> Result<()> {
        self.check_write()?;
        self.insert_record(name, content);
        Ok(())
    }

    fn remove_record(&self, name: &str) -> Result<bool> {
        if self.faults().remove {
            return Err(StoreError::Store("Simulated remove error".to_string()));
        }
        Ok(self.state().records.remove(name).is_some())
    }

    fn record_exists(&self, name: &str) -> bool {
        self.state().records.contains_key(name)
    }

    fn record_path(&self, name: &str) -> PathBuf {
        PathBuf::from(format!("memory://{}", name))
    }

    fn stage(&self, slot: StagingSlot, content: &str) -> Result<Staged> {
        self.check_write()?;
        let path = match slot {
            StagingSlot::Create => self.record_path(CREATE_STAGING_ID),
            StagingSlot::Update => self.record_path(UPDATE_STAGING_ID),
            StagingSlot::UniqueCreate => {
                PathBuf::from(format!("memory://.staging-create-{}", Uuid::new_v4()))
            }
            StagingSlot::UniqueUpdate => {
                PathBuf::from(format!("memory://.staging-update-{}", Uuid::new_v4()))
            }
        };
        let kind = slot.kind();
        self.state()
            .staged
            .insert(path.clone(), (kind, content.to_string()));
        Ok(Staged {
            path,
            kind: Some(kind),
        })
    }

    fn read_staged(&self, staged: &Staged) -> Result<String> {
        self.state()
            .staged
            .get(&staged.path)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| StoreError::Store(format!("No staged file {}", staged.path.display())))
    }

    fn rewrite_staged(&self, staged: &Staged, content: &str) -> Result<()> {
        self.check_write()?;
        let mut state = self.state();
        let entry = state.staged.get_mut(&staged.path).ok_or_else(|| {
            StoreError::Store(format!("No staged file {}", staged.path.display()))
        })?;
        entry.1 = content.to_string();
        Ok(())
    }

    fn promote(&self, staged: &Staged, name: &str) -> Result<()> {
        if self.faults().promote {
            return Err(StoreError::Store("Simulated promote error".to_string()));
        }
        let mut state = self.state();
        let (_, content) = state.staged.remove(&staged.path).ok_or_else(|| {
            StoreError::Store(format!("No staged file {}", staged.path.display()))
        })?;
        state.records.insert(name.to_string(), content);
        Ok(())
    }

    fn discard(&self, staged: &Staged) -> Result<()> {
        self.state().staged.remove(&staged.path);
        Ok(())
    }

    fn list_staged(&self) -> Result<Vec<Staged>> {
        Ok(self
            .state()
            .staged
            .iter()
            .map(|(path, (kind, _))| Staged {
                path: path.clone(),
                kind: Some(*kind),
            })
            .collect())
    }
}
