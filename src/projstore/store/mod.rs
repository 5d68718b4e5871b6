//! # Storage Layer
//!
//! Projects are stored one file per record, and a full in-memory cache is built
//! once when the store is opened.
//!
//! ## Split
//!
//! - [`backend::StorageBackend`]: raw I/O (list, read, stage, promote, remove).
//!   - [`fs_backend::FsBackend`]: production, one directory of files.
//!   - [`mem_backend::MemBackend`]: tests, with fault injection.
//! - [`project_store::ProjectStore`]: cache, id generation and commit strategy.
//!
//! ## Storage Layout
//!
//! ```text
//! projects/
//! ├── 100001.json            # committed records, named by id
//! ├── 100002.json
//! ├── .staging-create-{uuid}.tmp  # atomic mode, one per in-flight create
//! ├── .staging-update-{uuid}.tmp  # atomic mode, one per in-flight update
//! ├── 888888.json            # legacy mode, shared create staging
//! └── 999999.json            # legacy mode, shared update staging
//! ```
//!
//! ## Write Path
//!
//! Every create and update first writes the caller's payload to a staging
//! file and parses it back from there. What happens next depends on the
//! [`CommitMode`](crate::config::CommitMode):
//!
//! | | Atomic (default) | Legacy |
//! |---|---|---|
//! | staging name | unique per call | fixed per operation kind |
//! | create | rewrite staging with id, rename onto `<id>` | write `<id>` in place, drop staging |
//! | update | rename staging over existing `<id>` | delete `<id>`, then rename staging |
//!
//! The legacy update leaves a window where `<id>` does not exist. If the rename
//! fails inside it the store reports
//! [`StoreError::PartialCommit`](crate::error::StoreError::PartialCommit) and
//! leaves the staging file where [`ProjectStore::doctor`] can recover it.
//! Doctor only promotes update staging: a create staging file may still hold
//! the caller's payload under an id the store never minted.
//!
//! ## Cache
//!
//! - Filled at open, on create and on update (even when the disk commit failed,
//!   as long as the payload parsed).
//! - A cache miss in `get` reads the file directly and does *not* fill the cache.
//! - Delete leaves the entry in place unless `evict_on_delete` is set, so a
//!   deleted project stays visible until the store is reopened.
//!
//! ## Concurrency
//!
//! All operations take `&self`. Mutations are serialized by a writer lock that
//! also owns the id counter; reads share a `RwLock` over the cache.

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod project_store;

pub use project_store::{Created, ProjectStore};

/// Report from the `doctor` operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    /// Staged records promoted to their missing final file.
    pub recovered_staging: usize,
    /// Staging files that held nothing recoverable and were removed.
    pub discarded_staging: usize,
}
