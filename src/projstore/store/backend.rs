use crate::error::Result;
use std::path::PathBuf;

/// The operation a staging file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingKind {
    /// Holds the caller's payload until the store rewrites it under a
    /// minted id.
    Create,
    /// Holds a complete record whose id the caller supplied.
    Update,
}

/// Which staging file a write goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingSlot {
    /// The shared file named after the reserved create id.
    Create,
    /// The shared file named after the reserved update id.
    Update,
    /// A fresh create file private to this call.
    UniqueCreate,
    /// A fresh update file private to this call.
    UniqueUpdate,
}

impl StagingSlot {
    pub fn shared(kind: StagingKind) -> Self {
        match kind {
            StagingKind::Create => StagingSlot::Create,
            StagingKind::Update => StagingSlot::Update,
        }
    }

    pub fn unique(kind: StagingKind) -> Self {
        match kind {
            StagingKind::Create => StagingSlot::UniqueCreate,
            StagingKind::Update => StagingSlot::UniqueUpdate,
        }
    }

    pub fn kind(self) -> StagingKind {
        match self {
            StagingSlot::Create | StagingSlot::UniqueCreate => StagingKind::Create,
            StagingSlot::Update | StagingSlot::UniqueUpdate => StagingKind::Update,
        }
    }
}

/// A staged record sitting on the backend, not yet promoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staged {
    pub path: PathBuf,
    /// None for a staging file whose operation cannot be told from its name.
    pub kind: Option<StagingKind>,
}

/// Abstract interface for raw record I/O.
///
/// This trait handles the "how" of storage (filesystem vs memory), while
/// `ProjectStore` handles the "what" (cache, ids, commit strategy).
/// Records are addressed by file name without extension, which for every
/// committed record is its id.
pub trait StorageBackend {
    // --- Records ---

    /// Names of all committed records. Staging files are never listed.
    fn list_records(&self) -> Result<Vec<String>>;

    /// Raw content of a record. Ok(None) if it does not exist.
    fn read_record(&self, name: &str) -> Result<Option<String>>;

    /// Write a record in place. Not atomic: a crash can leave a torn file.
    fn write_record(&self, name: &str, content: &str) -> Result<()>;

    /// Remove a record. Ok(false) if there was nothing to remove.
    fn remove_record(&self, name: &str) -> Result<bool>;

    fn record_exists(&self, name: &str) -> bool;

    /// Location of a record, for diagnostics. Virtual for non-fs backends.
    fn record_path(&self, name: &str) -> PathBuf;

    // --- Staging ---

    /// Write content into a staging slot, replacing whatever was there.
    fn stage(&self, slot: StagingSlot, content: &str) -> Result<Staged>;

    fn read_staged(&self, staged: &Staged) -> Result<String>;

    fn rewrite_staged(&self, staged: &Staged, content: &str) -> Result<()>;

    /// Move a staged file onto a record name, replacing any existing record
    /// in one step.
    fn promote(&self, staged: &Staged, name: &str) -> Result<()>;

    /// Remove a staged file. Missing files are not an error.
    fn discard(&self, staged: &Staged) -> Result<()>;

    /// Every staging file currently present, shared or unique.
    fn list_staged(&self) -> Result<Vec<Staged>>;
}
