use super::backend::{Staged, StagingKind, StagingSlot, StorageBackend};
use crate::error::{Result, StoreError};
use crate::ids::{is_reserved, CREATE_STAGING_ID, UPDATE_STAGING_ID};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const UNIQUE_STAGING_PREFIX: &str = ".staging-";
const UNIQUE_STAGING_SUFFIX: &str = ".tmp";
const CREATE_TAG: &str = "create-";
const UPDATE_TAG: &str = "update-";

pub struct FsBackend {
    dir: PathBuf,
    file_ext: String,
}

impl FsBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_ext: ".json".to_string(),
        }
    }

    pub fn with_file_ext(mut self, ext: &str) -> Self {
        if ext.starts_with('.') {
            self.file_ext = ext.to_string();
        } else {
            self.file_ext = format!(".{}", ext);
        }
        self
    }

    pub fn file_ext(&self) -> &str {
        &self.file_ext
    }

    fn record_filename(&self, name: &str) -> String {
        format!("{}{}", name, self.file_ext)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(StoreError::Io)?;
        }
        Ok(())
    }

    fn staging_path(&self, slot: StagingSlot) -> PathBuf {
        match slot {
            StagingSlot::Create => self.dir.join(self.record_filename(CREATE_STAGING_ID)),
            StagingSlot::Update => self.dir.join(self.record_filename(UPDATE_STAGING_ID)),
            StagingSlot::UniqueCreate => self.unique_staging_path(CREATE_TAG),
            StagingSlot::UniqueUpdate => self.unique_staging_path(UPDATE_TAG),
        }
    }

    fn unique_staging_path(&self, tag: &str) -> PathBuf {
        self.dir.join(format!(
            "{}{}{}{}",
            UNIQUE_STAGING_PREFIX,
            tag,
            Uuid::new_v4(),
            UNIQUE_STAGING_SUFFIX
        ))
    }

    /// Record stem for a directory entry, if the entry is a committed record.
    fn record_name(&self, path: &Path) -> Option<String> {
        let name = path.file_name()?.to_str()?;
        if name.starts_with('.') {
            return None;
        }
        let stem = name.strip_suffix(self.file_ext.as_str())?;
        if stem.is_empty() || is_reserved(stem) {
            return None;
        }
        Some(stem.to_string())
    }

    /// Staging entry for a directory entry, if it is a staging file.
    fn staged_entry(&self, path: PathBuf) -> Option<Staged> {
        let name = path.file_name()?.to_str()?;
        let kind = if let Some(rest) = name
            .strip_prefix(UNIQUE_STAGING_PREFIX)
            .and_then(|rest| rest.strip_suffix(UNIQUE_STAGING_SUFFIX))
        {
            if rest.starts_with(CREATE_TAG) {
                Some(StagingKind::Create)
            } else if rest.starts_with(UPDATE_TAG) {
                Some(StagingKind::Update)
            } else {
                None
            }
        } else {
            match name.strip_suffix(self.file_ext.as_str())? {
                CREATE_STAGING_ID => Some(StagingKind::Create),
                UPDATE_STAGING_ID => Some(StagingKind::Update),
                _ => return None,
            }
        };
        Some(Staged { path, kind })
    }

    fn files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(StoreError::Io)? {
            let path = entry.map_err(StoreError::Io)?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }
}

impl StorageBackend for FsBackend {
    fn list_records(&self) -> Result<Vec<String>> {
        Ok(self
            .files()?
            .iter()
            .filter_map(|path| self.record_name(path))
            .collect())
    }

    fn read_record(&self, name: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.record_path(name)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn write_record(&self, name: &str, content: &str) -> Result<()> {
        self.ensure_dir()?;
        fs::write(self.record_path(name), content).map_err(StoreError::Io)
    }

    fn remove_record(&self, name: &str) -> Result<bool> {
        match fs::remove_file(self.record_path(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn record_exists(&self, name: &str) -> bool {
        self.record_path(name).is_file()
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(self.record_filename(name))
    }

    fn stage(&self, slot: StagingSlot, content: &str) -> Result<Staged> {
        self.ensure_dir()?;
        let path = self.staging_path(slot);
        fs::write(&path, content).map_err(StoreError::Io)?;
        Ok(Staged {
            path,
            kind: Some(slot.kind()),
        })
    }

    fn read_staged(&self, staged: &Staged) -> Result<String> {
        fs::read_to_string(&staged.path).map_err(StoreError::Io)
    }

    fn rewrite_staged(&self, staged: &Staged, content: &str) -> Result<()> {
        fs::write(&staged.path, content).map_err(StoreError::Io)
    }

    fn promote(&self, staged: &Staged, name: &str) -> Result<()> {
        fs::rename(&staged.path, self.record_path(name)).map_err(StoreError::Io)
    }

    fn discard(&self, staged: &Staged) -> Result<()> {
        match fs::remove_file(&staged.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn list_staged(&self) -> Result<Vec<Staged>> {
        Ok(self
            .files()?
            .into_iter()
            .filter_map(|path| self.staged_entry(path))
            .collect())
    }
}
