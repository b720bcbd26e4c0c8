//! Ledger persistence using Sled
//!
//! Blocks are stored as JSON keyed by their height (big-endian, so sled's
//! key order is chain order). Blocks that cannot be read back are moved to a
//! quarantine tree instead of blocking startup.

use sled::{Db, Tree};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::ledger::LedgerBlock;

const BLOCKS_TREE: &str = "ledger_blocks";
const QUARANTINE_TREE: &str = "ledger_quarantine";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Db(#[from] sled::Error),
    #[error("block codec error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("blocks are not contiguous: expected height {expected}, found {found}")]
    Gap { expected: u64, found: u64 },
    #[error("malformed block key of {0} bytes")]
    BadKey(usize),
}

/// Database wrapper
#[derive(Debug, Clone)]
pub struct LedgerStore {
    db: Db,
    blocks_tree: Tree,
    quarantine_tree: Tree,
}

impl LedgerStore {
    /// Open or create the database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::from_db(sled::open(path)?)
    }

    /// Throwaway database removed on drop
    pub fn temporary() -> Result<Self, StorageError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    /// Wrap an already opened database
    pub fn from_db(db: Db) -> Result<Self, StorageError> {
        let blocks_tree = db.open_tree(BLOCKS_TREE)?;
        let quarantine_tree = db.open_tree(QUARANTINE_TREE)?;
        Ok(Self {
            db,
            blocks_tree,
            quarantine_tree,
        })
    }

    /// Save a block at its height
    pub fn save_block(&self, height: u64, block: &LedgerBlock) -> Result<(), StorageError> {
        let value = serde_json::to_vec(block)?;
        self.blocks_tree.insert(height.to_be_bytes(), value)?;
        self.db.flush()?;
        debug!(height, hash = %block.hash, "persisted ledger block");
        Ok(())
    }

    /// Save every block of a chain, genesis first
    pub fn save_all(&self, blocks: &[LedgerBlock]) -> Result<(), StorageError> {
        for (height, block) in blocks.iter().enumerate() {
            self.blocks_tree.insert((height as u64).to_be_bytes(), serde_json::to_vec(block)?)?;
        }
        self.db.flush()?;
        Ok(())
    }

    /// Load all blocks in height order. Fails on the first gap or
    /// undecodable block.
    pub fn load_blocks(&self) -> Result<Vec<LedgerBlock>, StorageError> {
        match self.load_readable()? {
            (blocks, None) => Ok(blocks),
            (_, Some(problem)) => Err(problem),
        }
    }

    /// Load the longest contiguous, decodable prefix of the chain, along
    /// with the reason loading stopped early. Only database failures are
    /// returned as errors.
    pub fn load_readable(&self) -> Result<(Vec<LedgerBlock>, Option<StorageError>), StorageError> {
        let mut blocks = Vec::new();

        for item in self.blocks_tree.iter() {
            let (key, value) = item?;
            let height = match decode_height(&key) {
                Some(height) => height,
                None => return Ok((blocks, Some(StorageError::BadKey(key.len())))),
            };

            let expected = blocks.len() as u64;
            if height != expected {
                return Ok((blocks, Some(StorageError::Gap { expected, found: height })));
            }
            match serde_json::from_slice(&value) {
                Ok(block) => blocks.push(block),
                Err(e) => return Ok((blocks, Some(StorageError::Codec(e)))),
            }
        }

        Ok((blocks, None))
    }

    /// Move every stored block at `height` or above (and any malformed key)
    /// into the quarantine tree. Returns how many entries were moved.
    pub fn quarantine_from(&self, height: u64) -> Result<usize, StorageError> {
        let mut moved = 0;
        for item in self.blocks_tree.iter() {
            let (key, value) = item?;
            if decode_height(&key).map_or(true, |h| h >= height) {
                self.quarantine_tree.insert(key.clone(), value)?;
                self.blocks_tree.remove(key)?;
                moved += 1;
            }
        }
        self.db.flush()?;
        Ok(moved)
    }

    /// Lowest height held in quarantine, if any block was ever quarantined
    pub fn first_quarantined_height(&self) -> Result<Option<u64>, StorageError> {
        let mut first: Option<u64> = None;
        for item in self.quarantine_tree.iter() {
            let (key, _) = item?;
            let height = decode_height(&key).unwrap_or(0);
            first = Some(first.map_or(height, |f| f.min(height)));
        }
        Ok(first)
    }

    pub fn quarantined_count(&self) -> usize {
        self.quarantine_tree.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks_tree.len()
    }
}

fn decode_height(key: &[u8]) -> Option<u64> {
    let bytes: [u8; 8] = key.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::HashChainLedger;
    use serde_json::json;

    #[test]
    fn test_round_trip_preserves_validity() {
        let store = LedgerStore::temporary().unwrap();
        let mut ledger = HashChainLedger::new();
        ledger.append_entry(json!({ "event_type": "MATCH_FOUND", "details": { "compatibility_score": 0.8991 } }));
        ledger.append_entry(json!({ "event_type": "DONOR_REGISTRATION" }));
        store.save_all(ledger.blocks()).unwrap();

        let loaded = store.load_blocks().unwrap();
        assert_eq!(loaded, ledger.blocks());
        assert_eq!(store.block_count(), 3);
        assert!(HashChainLedger::from_blocks(loaded).verify_integrity());
    }

    #[test]
    fn test_incremental_saves() {
        let store = LedgerStore::temporary().unwrap();
        let mut ledger = HashChainLedger::new();
        store.save_block(0, &ledger.blocks()[0]).unwrap();
        let block = ledger.append_entry(json!({ "n": 1 }));
        store.save_block(1, &block).unwrap();

        assert_eq!(store.load_blocks().unwrap().len(), 2);
    }

    #[test]
    fn test_gap_is_reported() {
        let store = LedgerStore::temporary().unwrap();
        let ledger = HashChainLedger::new();
        store.save_block(1, &ledger.blocks()[0]).unwrap();

        assert!(matches!(
            store.load_blocks(),
            Err(StorageError::Gap { expected: 0, found: 1 })
        ));
    }

    #[test]
    fn test_readable_prefix_stops_at_gap() {
        let store = LedgerStore::temporary().unwrap();
        let mut ledger = HashChainLedger::new();
        ledger.append_entry(json!({ "n": 1 }));
        ledger.append_entry(json!({ "n": 2 }));
        store.save_block(0, &ledger.blocks()[0]).unwrap();
        store.save_block(2, &ledger.blocks()[2]).unwrap();

        let (blocks, problem) = store.load_readable().unwrap();
        assert_eq!(blocks, &ledger.blocks()[..1]);
        assert!(matches!(problem, Some(StorageError::Gap { expected: 1, found: 2 })));
    }

    #[test]
    fn test_undecodable_block_is_quarantined() {
        let store = LedgerStore::temporary().unwrap();
        let ledger = HashChainLedger::new();
        store.save_block(0, &ledger.blocks()[0]).unwrap();
        let mut forged = serde_json::to_value(&ledger.blocks()[0]).unwrap();
        forged["hash"] = json!("not-hex");
        store
            .blocks_tree
            .insert(1u64.to_be_bytes(), serde_json::to_vec(&forged).unwrap())
            .unwrap();
        store.save_block(2, &ledger.blocks()[0]).unwrap();

        let (blocks, problem) = store.load_readable().unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(matches!(problem, Some(StorageError::Codec(_))));

        assert_eq!(store.quarantine_from(1).unwrap(), 2);
        assert_eq!(store.block_count(), 1);
        assert_eq!(store.quarantined_count(), 2);
        assert_eq!(store.first_quarantined_height().unwrap(), Some(1));
        assert_eq!(store.load_blocks().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        let store = LedgerStore::temporary().unwrap();
        assert!(store.load_blocks().unwrap().is_empty());
    }
}
