//! # Projstore Architecture
//!
//! Projstore keeps "Project" records as one JSON file each and serves them from
//! a full in-memory cache built when the store is opened.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (args.rs, main.rs)                                     │
//! │  - Parses arguments, reads payloads, prints results         │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Takes a command and a raw payload                        │
//! │  - Returns records and leveled messages (`CmdResult`)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - ProjectStore: cache, id generation, commit strategy      │
//! │  - StorageBackend: FsBackend (production), MemBackend (test)│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is an ordinary value. Whoever opens it owns it and hands out
//! references; there is no process-wide instance.
//!
//! ## Module Overview
//!
//! - [`api`]: Facade used by the CLI or any other front end
//! - [`store`]: Cache, write path and storage backends
//! - [`ids`]: Identifier generation and reserved staging ids
//! - [`model`]: The opaque [`model::Project`] record
//! - [`config`]: Store settings and data directory resolution
//! - [`error`]: Error types
//! - [`logging`]: `env_logger` setup for binaries

pub mod api;
pub mod config;
pub mod error;
pub mod ids;
pub mod logging;
pub mod model;
pub mod store;

#[cfg(test)]
pub mod test_utils;
