//! # Identifier Generation
//!
//! Project ids are decimal strings handed out by a process-local counter.
//!
//! - At load, every id found on disk is fed to [`IdGenerator::observe`], so the
//!   counter starts at the highest id already persisted.
//! - If nothing was observed (empty store) and nothing has been issued yet, the
//!   counter is seeded from the configured offset before the first increment.
//!   With the default offset of `100000` the first project is `100001`.
//! - The two reserved staging ids ([`CREATE_STAGING_ID`], [`UPDATE_STAGING_ID`])
//!   are skipped, so a generated id never names a staging file.
//!
//! The generator itself is not synchronized. The store keeps it behind its
//! writer lock, which makes `next_id` atomic with respect to other mutations.

use crate::error::{Result, StoreError};

/// Staging file name used by legacy-mode creates.
pub const CREATE_STAGING_ID: &str = "888888";

/// Staging file name used by legacy-mode updates.
pub const UPDATE_STAGING_ID: &str = "999999";

pub const DEFAULT_ID_OFFSET: u64 = 100_000;

pub fn is_reserved(id: &str) -> bool {
    id == CREATE_STAGING_ID || id == UPDATE_STAGING_ID
}

#[derive(Debug, Clone)]
pub struct IdGenerator {
    last_used: u64,
    offset: u64,
}

impl IdGenerator {
    pub fn new(offset: u64) -> Self {
        Self {
            last_used: 0,
            offset,
        }
    }

    /// Record an id seen on disk.
    pub fn observe(&mut self, id: u64) {
        self.last_used = self.last_used.max(id);
    }

    pub fn last_used(&self) -> u64 {
        self.last_used
    }

    pub fn next_id(&mut self) -> Result<String> {
        if self.last_used == 0 {
            self.last_used = self.offset;
        }
        loop {
            self.last_used = self
                .last_used
                .checked_add(1)
                .ok_or(StoreError::IdsExhausted)?;
            let id = self.last_used.to_string();
            if !is_reserved(&id) {
                return Ok(id);
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeds_from_offset_when_empty() {
        let mut ids = IdGenerator::new(100_000);
        assert_eq!(ids.next_id().unwrap(), "100001");
        assert_eq!(ids.next_id().unwrap(), "100002");
    }

    #[test]
    fn test_continues_after_highest_observed() {
        let mut ids = IdGenerator::new(100_000);
        ids.observe(100_007);
        ids.observe(100_003);
        assert_eq!(ids.next_id().unwrap(), "100008");
    }

    #[test]
    fn test_observed_ids_below_offset_win_over_offset() {
        // The offset only seeds an empty counter.
        let mut ids = IdGenerator::new(100_000);
        ids.observe(5);
        assert_eq!(ids.next_id().unwrap(), "6");
    }

    #[test]
    fn test_skips_reserved_ids() {
        let mut ids = IdGenerator::new(0);
        ids.observe(888_887);
        assert_eq!(ids.next_id().unwrap(), "888889");

        ids.observe(999_998);
        assert_eq!(ids.next_id().unwrap(), "1000000");
    }

    #[test]
    fn test_exhaustion() {
        let mut ids = IdGenerator::new(0);
        ids.observe(u64::MAX);
        assert!(matches!(ids.next_id(), Err(StoreError::IdsExhausted)));
    }

    #[test]
    fn test_strictly_increasing() {
        let mut ids = IdGenerator::default();
        let mut prev = 0u64;
        for _ in 0..50 {
            let id: u64 = ids.next_id().unwrap().parse().unwrap();
            assert!(id > prev);
            prev = id;
        }
    }
}
