//! Ledger block structure
//!
//! A block commits to its predecessor through `previous_hash` and to its own
//! content through `hash`, the SHA-256 of the canonical JSON of every other
//! field.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::crypto::{hash_value, Hash};

/// One entry of the audit chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerBlock {
    /// RFC 3339 creation time
    pub timestamp: String,
    /// Opaque structured event payload
    pub data: Value,
    /// Hash of the preceding block, zero for genesis
    pub previous_hash: Hash,
    /// Always 0; there is no proof of work
    pub nonce: u64,
    pub hash: Hash,
}

impl LedgerBlock {
    /// Build and seal a block at the current time
    pub fn new(data: Value, previous_hash: Hash) -> Self {
        Self::with_timestamp(Utc::now().to_rfc3339(), data, previous_hash)
    }

    /// Build and seal a block with an explicit timestamp
    pub fn with_timestamp(timestamp: String, data: Value, previous_hash: Hash) -> Self {
        let mut block = Self {
            timestamp,
            data,
            previous_hash,
            nonce: 0,
            hash: Hash::zero(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Recompute the digest over every field except `hash`
    pub fn compute_hash(&self) -> Hash {
        hash_value(json!({
            "timestamp": self.timestamp,
            "data": self.data,
            "previous_hash": self.previous_hash.to_hex(),
            "nonce": self.nonce,
        }))
    }

    /// Stored hash matches content
    pub fn is_sealed(&self) -> bool {
        self.compute_hash() == self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.previous_hash.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_block_is_sealed() {
        let block = LedgerBlock::new(json!({"message": "hello"}), Hash::zero());
        assert!(block.is_sealed());
        assert!(block.is_genesis());
        assert_eq!(block.nonce, 0);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let a = LedgerBlock::with_timestamp("2026-01-01T00:00:00+00:00".into(), json!({"a": 1, "b": 2}), Hash::zero());
        let b = LedgerBlock::with_timestamp("2026-01-01T00:00:00+00:00".into(), json!({"b": 2, "a": 1}), Hash::zero());
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn test_any_field_change_breaks_seal() {
        let block = LedgerBlock::new(json!({"message": "hello"}), Hash::zero());

        let mut tampered = block.clone();
        tampered.data = json!({"message": "hellp"});
        assert!(!tampered.is_sealed());

        let mut tampered = block.clone();
        tampered.nonce = 1;
        assert!(!tampered.is_sealed());

        let mut tampered = block.clone();
        tampered.timestamp.push('Z');
        assert!(!tampered.is_sealed());
    }

    #[test]
    fn test_block_json_shape() {
        let block = LedgerBlock::new(json!({"k": "v"}), Hash::zero());
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["previous_hash"], json!("0".repeat(64)));
        assert_eq!(value["hash"].as_str().unwrap().len(), 64);
        assert_eq!(value["nonce"], json!(0));
    }
}
