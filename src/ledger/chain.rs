//! Hash-chained audit ledger
//!
//! Append-only sequence of blocks starting at a genesis block. Integrity is
//! checked by re-hashing every block and comparing each link.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::constants::GENESIS_MESSAGE;
use crate::crypto::Hash;
use super::LedgerBlock;

/// Kind of integrity violation found in a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    /// The chain holds no blocks at all
    Empty,
    /// The first block does not point at the zero hash
    GenesisLink,
    /// `previous_hash` differs from the preceding block's hash
    BrokenLink,
    /// Stored hash differs from the recomputed content hash
    HashMismatch,
    /// Persisted blocks from this height on could not be read back
    Unreadable,
}

/// Result of a full verification pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainReport {
    pub is_valid: bool,
    /// Number of blocks, genesis included
    pub length: usize,
    pub tip_hash: Option<Hash>,
    /// Index of the first offending block
    pub first_violation: Option<usize>,
    pub violation: Option<Violation>,
}

/// Append-only hash chain.
///
/// Not internally synchronised: wrap in [`super::SharedLedger`] when more
/// than one caller can append.
#[derive(Debug, Clone)]
pub struct HashChainLedger {
    blocks: Vec<LedgerBlock>,
}

impl Default for HashChainLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl HashChainLedger {
    /// Fresh chain holding only the genesis block
    pub fn new() -> Self {
        let mut ledger = Self { blocks: Vec::new() };
        ledger.ensure_genesis();
        ledger
    }

    /// Rehydrate a persisted chain. An empty sequence is an uninitialised
    /// chain and receives a genesis block; anything else is taken as is and
    /// should be checked with [`Self::verify_integrity`].
    pub fn from_blocks(blocks: Vec<LedgerBlock>) -> Self {
        let mut ledger = Self { blocks };
        ledger.ensure_genesis();
        ledger
    }

    fn ensure_genesis(&mut self) {
        if self.blocks.is_empty() {
            let genesis = LedgerBlock::new(json!({ "message": GENESIS_MESSAGE }), Hash::zero());
            debug!(hash = %genesis.hash, "created genesis block");
            self.blocks.push(genesis);
        }
    }

    /// Append a payload as a new block linked to the current tip
    pub fn append_entry(&mut self, data: Value) -> LedgerBlock {
        let block = self.next_block(data);
        self.commit(block.clone());
        block
    }

    /// Seal the block that `append_entry` would add, without adding it
    pub fn next_block(&self, data: Value) -> LedgerBlock {
        LedgerBlock::new(data, self.tip_hash())
    }

    /// Push a block built by [`Self::next_block`] against the current tip
    pub(super) fn commit(&mut self, block: LedgerBlock) {
        debug!(height = self.blocks.len(), hash = %block.hash, "appended ledger block");
        self.blocks.push(block);
    }

    pub fn blocks(&self) -> &[LedgerBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Never true for a ledger built through `new` or `from_blocks`
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn genesis(&self) -> Option<&LedgerBlock> {
        self.blocks.first()
    }

    pub fn tip(&self) -> Option<&LedgerBlock> {
        self.blocks.last()
    }

    fn tip_hash(&self) -> Hash {
        self.tip().map(|b| b.hash).unwrap_or_else(Hash::zero)
    }

    /// Whole-chain verification; read-only and repeatable
    pub fn verify_integrity(&self) -> bool {
        self.verify_report().is_valid
    }

    /// Walk the chain and report the first violation, if any.
    ///
    /// The genesis block must point at the zero hash and be sealed; every
    /// later block must link to its predecessor and be sealed.
    pub fn verify_report(&self) -> ChainReport {
        let violation = self.find_violation();
        if let Some((index, kind)) = violation {
            warn!(index, violation = ?kind, "ledger integrity violation");
        }

        ChainReport {
            is_valid: violation.is_none(),
            length: self.blocks.len(),
            tip_hash: self.tip().map(|b| b.hash),
            first_violation: violation.map(|(index, _)| index),
            violation: violation.map(|(_, kind)| kind),
        }
    }

    fn find_violation(&self) -> Option<(usize, Violation)> {
        let genesis = match self.blocks.first() {
            Some(block) => block,
            None => return Some((0, Violation::Empty)),
        };
        if !genesis.previous_hash.is_zero() {
            return Some((0, Violation::GenesisLink));
        }
        if !genesis.is_sealed() {
            return Some((0, Violation::HashMismatch));
        }

        for (i, pair) in self.blocks.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.previous_hash != previous.hash {
                return Some((i + 1, Violation::BrokenLink));
            }
            if !current.is_sealed() {
                return Some((i + 1, Violation::HashMismatch));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(n: usize) -> HashChainLedger {
        let mut ledger = HashChainLedger::new();
        for i in 0..n {
            ledger.append_entry(json!({ "seq": i }));
        }
        ledger
    }

    #[test]
    fn test_genesis_only_chain_is_valid() {
        let ledger = HashChainLedger::new();
        assert_eq!(ledger.len(), 1);
        let genesis = ledger.genesis().unwrap();
        assert_eq!(genesis.data, json!({ "message": "Genesis Block" }));
        assert_eq!(genesis.previous_hash.to_hex(), "0".repeat(64));
        assert!(ledger.verify_integrity());
    }

    #[test]
    fn test_appends_link_to_tip() {
        let ledger = ledger_with(3);
        assert_eq!(ledger.len(), 4);
        for pair in ledger.blocks().windows(2) {
            assert_eq!(pair[1].previous_hash, pair[0].hash);
        }
        assert!(ledger.verify_integrity());
    }

    #[test]
    fn test_tampered_data_detected() {
        let mut blocks = ledger_with(3).blocks().to_vec();
        blocks[2].data = json!({ "seq": 99 });
        let report = HashChainLedger::from_blocks(blocks).verify_report();

        assert!(!report.is_valid);
        assert_eq!(report.first_violation, Some(2));
        assert_eq!(report.violation, Some(Violation::HashMismatch));
    }

    #[test]
    fn test_rehashed_tamper_breaks_next_link() {
        let mut blocks = ledger_with(3).blocks().to_vec();
        blocks[1].data = json!({ "seq": "forged" });
        blocks[1].hash = blocks[1].compute_hash();
        let report = HashChainLedger::from_blocks(blocks).verify_report();

        assert_eq!(report.first_violation, Some(2));
        assert_eq!(report.violation, Some(Violation::BrokenLink));
    }

    #[test]
    fn test_corrupted_genesis_detected() {
        let mut blocks = ledger_with(1).blocks().to_vec();
        blocks[0].data = json!({ "message": "Genesis Blocks" });
        let ledger = HashChainLedger::from_blocks(blocks);
        assert!(!ledger.verify_integrity());
    }

    #[test]
    fn test_empty_blocks_get_genesis() {
        let ledger = HashChainLedger::from_blocks(Vec::new());
        assert_eq!(ledger.len(), 1);
        assert!(ledger.verify_integrity());
    }

    #[test]
    fn test_verification_does_not_mutate() {
        let ledger = ledger_with(2);
        let before = ledger.blocks().to_vec();
        for _ in 0..3 {
            assert!(ledger.verify_integrity());
        }
        assert_eq!(ledger.blocks(), before.as_slice());
    }
}
