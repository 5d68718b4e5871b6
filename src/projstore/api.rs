//! # API Facade
//!
//! The API layer is the surface a front end (this crate's CLI, a request
//! handler, ...) talks to. It takes a command and a raw serialized record and
//! answers with records plus leveled messages.
//!
//! The API does not print, exit or format records for a terminal. Store
//! failures that the caller must act on come back as `Err`; outcomes that are
//! merely worth reporting (a create whose record did not reach disk, a delete
//! with nothing to delete) come back as messages.
//!
//! `ProjectApi<B>` is generic over the storage backend so it can be tested on
//! [`MemBackend`](crate::store::mem_backend::MemBackend).

use crate::config::{StoreConfig, StorePaths};
use crate::error::{Result, StoreError};
use crate::model::Project;
use crate::store::backend::StorageBackend;
use crate::store::{DoctorReport, ProjectStore};
use std::fs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub projects: Vec<Project>,
    /// Id minted by a create, set even when the record was not saved.
    pub id: Option<String>,
    pub config: Option<StoreConfig>,
    pub report: Option<DoctorReport>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_projects(mut self, projects: Vec<Project>) -> Self {
        self.projects = projects;
        self
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    Get(String),
    Set(String, String),
}

/// The main API facade for store operations.
pub struct ProjectApi<B: StorageBackend> {
    store: ProjectStore<B>,
    paths: StorePaths,
}

impl<B: StorageBackend> ProjectApi<B> {
    pub fn new(store: ProjectStore<B>, paths: StorePaths) -> Self {
        Self { store, paths }
    }

    pub fn list(&self) -> Result<CmdResult> {
        let projects = self.store.list_all();
        let mut result = CmdResult::default();
        if projects.is_empty() {
            result.add_message(CmdMessage::info("No projects."));
        }
        Ok(result.with_projects(projects))
    }

    pub fn get(&self, id: &str) -> Result<CmdResult> {
        match self.store.get(id)? {
            Some(project) => Ok(CmdResult::default().with_projects(vec![project])),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    pub fn create(&self, payload: &str) -> Result<CmdResult> {
        let created = self.store.create(payload)?;
        let mut result = CmdResult::default();
        match &created.persisted {
            Ok(()) => {
                result.add_message(CmdMessage::success(format!(
                    "Project created: {}",
                    created.id
                )));
            }
            Err(e) => {
                result.add_message(CmdMessage::error(format!(
                    "Project {} was assigned but not saved: {}",
                    created.id, e
                )));
            }
        }
        result.id = Some(created.id);
        Ok(result)
    }

    pub fn update(&self, payload: &str) -> Result<CmdResult> {
        self.store.update(payload)?;
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::success("Project updated."));
        Ok(result)
    }

    pub fn delete(&self, id: &str) -> Result<CmdResult> {
        let mut result = CmdResult::default();
        if self.store.delete(id)? {
            result.add_message(CmdMessage::success(format!("Project deleted: {}", id)));
        } else {
            result.add_message(CmdMessage::warning(format!(
                "No project file for {}, nothing deleted.",
                id
            )));
        }
        Ok(result)
    }

    pub fn doctor(&self) -> Result<CmdResult> {
        let report = self.store.doctor()?;
        let mut result = CmdResult::default();

        if report.recovered_staging == 0 && report.discarded_staging == 0 {
            result.add_message(CmdMessage::info("No stranded writes found."));
        }
        if report.recovered_staging > 0 {
            result.add_message(CmdMessage::success(format!(
                "Recovered {} project(s) from staging.",
                report.recovered_staging
            )));
        }
        if report.discarded_staging > 0 {
            result.add_message(CmdMessage::info(format!(
                "Removed {} leftover staging file(s).",
                report.discarded_staging
            )));
        }

        result.report = Some(report);
        Ok(result)
    }

    /// Read or change `config.json`. Changes apply the next time a store is
    /// opened.
    pub fn config(&self, action: ConfigAction) -> Result<CmdResult> {
        let dir = self.paths.config_dir();
        let mut config = StoreConfig::load(dir)?;
        let mut result = CmdResult::default();

        match action {
            ConfigAction::ShowAll => {}
            ConfigAction::Get(key) => {
                let value = config.get(&key)?;
                result.add_message(CmdMessage::info(format!("{} = {}", key, value)));
            }
            ConfigAction::Set(key, value) => {
                config.set(&key, &value)?;
                config.save(dir)?;
                result.add_message(CmdMessage::success(format!(
                    "{} set to {}",
                    key,
                    config.get(&key)?
                )));
            }
        }

        Ok(result.with_config(config))
    }

    /// Create the data directory and a default `config.json` if missing.
    pub fn init(&self) -> Result<CmdResult> {
        let mut result = CmdResult::default();
        fs::create_dir_all(self.paths.projects_dir()).map_err(StoreError::Io)?;

        let config = StoreConfig::load(self.paths.config_dir())?;
        config.save(self.paths.config_dir())?;

        result.add_message(CmdMessage::success(format!(
            "Initialized store at {}",
            self.paths.root.display()
        )));
        Ok(result.with_config(config))
    }
}
