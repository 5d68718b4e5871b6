use super::backend::{Staged, StagingKind, StagingSlot, StorageBackend};
use super::fs_backend::FsBackend;
use super::DoctorReport;
use crate::config::{CommitMode, StoreConfig, StorePaths};
use crate::error::{Result, StoreError};
use crate::ids::{is_reserved, IdGenerator};
use crate::model::{id_order, parse_id, Project};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Outcome of a create. The id is minted before anything touches the disk,
/// so it is returned even when persisting the record failed.
#[derive(Debug)]
pub struct Created {
    pub id: String,
    pub persisted: Result<()>,
}

impl Created {
    pub fn is_persisted(&self) -> bool {
        self.persisted.is_ok()
    }

    /// The id if the record reached disk, the persistence error otherwise.
    pub fn into_result(self) -> Result<String> {
        self.persisted.map(|()| self.id)
    }
}

pub struct ProjectStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    config: StoreConfig,
    cache: RwLock<HashMap<String, Project>>,
    /// Held for the whole of every mutation.
    writer: Mutex<IdGenerator>,
}

impl ProjectStore<FsBackend> {
    /// Open the store under `paths`, using `config` for the file extension.
    pub fn open_paths(paths: &StorePaths, config: StoreConfig) -> Result<Self> {
        let backend = FsBackend::new(paths.projects_dir()).with_file_ext(config.file_ext());
        Self::open(backend, config)
    }
}

impl<B: StorageBackend> ProjectStore<B> {
    /// Scan every record on the backend and build the cache.
    ///
    /// A single unreadable record aborts the whole load.
    pub fn open(backend: B, config: StoreConfig) -> Result<Self> {
        let mut ids = IdGenerator::new(config.id_offset);
        let mut cache = HashMap::new();

        for name in backend.list_records()? {
            let loaded = load_record(&backend, &name).map_err(|e| StoreError::Load {
                path: backend.record_path(&name),
                source: Box::new(e),
            })?;
            // Vanished between listing and reading.
            let Some((project, numeric_id)) = loaded else {
                continue;
            };
            ids.observe(numeric_id);
            cache.insert(project.id.clone(), project);
        }

        info!(
            "Loaded {} projects (last used id {}, {} commits)",
            cache.len(),
            ids.last_used(),
            config.commit_mode
        );

        Ok(Self {
            backend,
            config,
            cache: RwLock::new(cache),
            writer: Mutex::new(ids),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn cached_count(&self) -> usize {
        self.read_cache().len()
    }

    // --- Read Path ---

    /// Snapshot of every cached project, ordered by id. Never touches disk.
    pub fn list_all(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self.read_cache().values().cloned().collect();
        projects.sort_by(|a, b| id_order(&a.id, &b.id));
        projects
    }

    /// Cached project, or the file on disk on a cache miss.
    ///
    /// A project found on disk is returned without being cached, so repeated
    /// misses for the same id keep reading the file.
    pub fn get(&self, id: &str) -> Result<Option<Project>> {
        parse_id(id)?;
        if is_reserved(id) {
            return Ok(None);
        }
        if let Some(project) = self.read_cache().get(id) {
            return Ok(Some(project.clone()));
        }

        debug!("Cache miss for project {}, reading from disk", id);
        match self.backend.read_record(id)? {
            Some(raw) => Ok(Some(Project::from_payload(&raw)?)),
            None => Ok(None),
        }
    }

    // --- Write Path ---

    /// Store a new project under a freshly minted id.
    ///
    /// Only failing to mint an id is an `Err`. Every later failure is logged
    /// and reported through [`Created::persisted`].
    pub fn create(&self, payload: &str) -> Result<Created> {
        let mut ids = self.lock_writer();
        let id = ids.next_id()?;

        let (project, persisted) = self.write_new(&id, payload);
        if let Some(project) = project {
            self.write_cache().insert(id.clone(), project);
        }

        match &persisted {
            Ok(()) => debug!("Created project {}", id),
            Err(e) => warn!("Project {} was not persisted: {}", id, e),
        }
        Ok(Created { id, persisted })
    }

    /// Replace an existing project with the payload, which must carry its id.
    ///
    /// The cache takes the new record whenever the payload parsed, even if the
    /// disk commit then failed.
    pub fn update(&self, payload: &str) -> Result<()> {
        let _writer = self.lock_writer();

        let staged = self.backend.stage(self.slot(StagingKind::Update), payload)?;
        let project = match self.parse_update(&staged) {
            Ok(project) => project,
            Err(e) => {
                self.discard_quietly(&staged);
                warn!("Rejected update payload: {}", e);
                return Err(e);
            }
        };

        let committed = match self.config.commit_mode {
            CommitMode::Atomic => self.replace_atomic(&staged, &project.id),
            CommitMode::Legacy => self.replace_legacy(&staged, &project.id),
        };

        let id = project.id.clone();
        self.write_cache().insert(id.clone(), project);

        match &committed {
            Ok(()) => debug!("Updated project {}", id),
            Err(e) => warn!("Update of project {} failed: {}", id, e),
        }
        committed
    }

    /// Remove the file for `id`. Ok(false) if there was no file.
    pub fn delete(&self, id: &str) -> Result<bool> {
        parse_id(id)?;
        if is_reserved(id) {
            return Ok(false);
        }
        let _writer = self.lock_writer();

        let removed = self.backend.remove_record(id)?;
        if self.config.evict_on_delete {
            self.write_cache().remove(id);
        }
        debug!("Delete project {}: removed={}", id, removed);
        Ok(removed)
    }

    /// Promote stranded staging files whose record is missing, drop the rest.
    pub fn doctor(&self) -> Result<DoctorReport> {
        let mut ids = self.lock_writer();
        let mut report = DoctorReport::default();

        for staged in self.backend.list_staged()? {
            match self.recoverable(&staged) {
                Some((project, numeric_id)) => {
                    self.backend.promote(&staged, &project.id)?;
                    info!("Recovered project {} from {}", project.id, staged.path.display());
                    ids.observe(numeric_id);
                    self.write_cache().insert(project.id.clone(), project);
                    report.recovered_staging += 1;
                }
                None => {
                    self.backend.discard(&staged)?;
                    debug!("Discarded staging file {}", staged.path.display());
                    report.discarded_staging += 1;
                }
            }
        }

        Ok(report)
    }

    // --- Helpers ---

    fn slot(&self, kind: StagingKind) -> StagingSlot {
        match self.config.commit_mode {
            CommitMode::Atomic => StagingSlot::unique(kind),
            CommitMode::Legacy => StagingSlot::shared(kind),
        }
    }

    /// Stage, parse and persist a new record. The project is returned whenever
    /// the payload parsed, independently of the persist result.
    fn write_new(&self, id: &str, payload: &str) -> (Option<Project>, Result<()>) {
        let staged = match self.backend.stage(self.slot(StagingKind::Create), payload) {
            Ok(staged) => staged,
            Err(e) => return (None, Err(e)),
        };

        let mut project = match self.parse_staged(&staged) {
            Ok(project) => project,
            Err(e) => {
                self.discard_quietly(&staged);
                return (None, Err(e));
            }
        };
        project.id = id.to_string();

        let persisted = match self.config.commit_mode {
            CommitMode::Atomic => self.create_atomic(&staged, &project),
            CommitMode::Legacy => self.create_in_place(&staged, &project),
        };
        (Some(project), persisted)
    }

    fn create_atomic(&self, staged: &Staged, project: &Project) -> Result<()> {
        let result = project
            .to_payload()
            .and_then(|content| self.backend.rewrite_staged(staged, &content))
            .and_then(|()| self.backend.promote(staged, &project.id));
        if result.is_err() {
            self.discard_quietly(staged);
        }
        result
    }

    fn create_in_place(&self, staged: &Staged, project: &Project) -> Result<()> {
        let content = project.to_payload()?;
        self.backend.write_record(&project.id, &content)?;
        self.backend.discard(staged)
    }

    fn replace_atomic(&self, staged: &Staged, id: &str) -> Result<()> {
        if !self.backend.record_exists(id) {
            self.discard_quietly(staged);
            return Err(StoreError::NotFound(id.to_string()));
        }
        if let Err(e) = self.backend.promote(staged, id) {
            self.discard_quietly(staged);
            return Err(e);
        }
        Ok(())
    }

    /// Delete-then-rename. Between the two steps the record only exists in
    /// the staging file.
    fn replace_legacy(&self, staged: &Staged, id: &str) -> Result<()> {
        match self.backend.remove_record(id) {
            Ok(true) => {}
            Ok(false) => {
                self.discard_quietly(staged);
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => {
                self.discard_quietly(staged);
                return Err(e);
            }
        }

        self.backend
            .promote(staged, id)
            .map_err(|source| StoreError::PartialCommit {
                id: id.to_string(),
                staging: staged.path.clone(),
                source: Box::new(source),
            })
    }

    fn parse_staged(&self, staged: &Staged) -> Result<Project> {
        let raw = self.backend.read_staged(staged)?;
        Project::from_payload(&raw)
    }

    fn parse_update(&self, staged: &Staged) -> Result<Project> {
        let project = self.parse_staged(staged)?;
        project.numeric_id()?;
        if is_reserved(&project.id) {
            return Err(StoreError::InvalidId(project.id));
        }
        Ok(project)
    }

    fn recoverable(&self, staged: &Staged) -> Option<(Project, u64)> {
        // Only update staging holds a complete record. Create staging may
        // still carry the caller's payload, with an id the store never minted.
        if staged.kind != Some(StagingKind::Update) {
            return None;
        }

        let project = self.parse_staged(staged).ok()?;
        let numeric_id = project.numeric_id().ok()?;
        if is_reserved(&project.id) || self.backend.record_exists(&project.id) {
            return None;
        }
        Some((project, numeric_id))
    }

    fn discard_quietly(&self, staged: &Staged) {
        if let Err(e) = self.backend.discard(staged) {
            warn!(
                "Could not remove staging file {}: {}",
                staged.path.display(),
                e
            );
        }
    }

    fn lock_writer(&self) -> MutexGuard<'_, IdGenerator> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<String, Project>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<String, Project>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_record<B: StorageBackend>(backend: &B, name: &str) -> Result<Option<(Project, u64)>> {
    let Some(raw) = backend.read_record(name)? else {
        return Ok(None);
    };
    let project = Project::from_payload(&raw)?;
    let numeric_id = project.numeric_id()?;
    Ok(Some((project, numeric_id)))
}
