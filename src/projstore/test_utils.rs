use crate::config::{StoreConfig, StorePaths};
use crate::store::fs_backend::FsBackend;
use crate::store::ProjectStore;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub paths: StorePaths,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            paths: StorePaths::new(root.clone()),
            root,
        }
    }

    /// Open a store over this environment, as a fresh process would.
    pub fn open(&self, config: StoreConfig) -> ProjectStore<FsBackend> {
        ProjectStore::open_paths(&self.paths, config).expect("failed to open store")
    }

    /// Drop a raw file into the projects directory.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let dir = self.paths.projects_dir();
        fs::create_dir_all(&dir).expect("failed to create projects dir");
        let path = dir.join(name);
        fs::write(&path, content).expect("failed to write file");
        path
    }
}
