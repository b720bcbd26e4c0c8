//! Ledger module - hash-chained audit blocks and their integrity checks

mod block;
mod chain;

pub use block::*;
pub use chain::*;

use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("ledger lock poisoned")]
    LockPoisoned,
}

/// Ledger shared between callers.
///
/// `append_entry` reads the tip and writes a new one; the mutex makes that a
/// single step so two appends can never link to the same tip.
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<HashChainLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: HashChainLedger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashChainLedger>, LedgerError> {
        self.inner.lock().map_err(|_| LedgerError::LockPoisoned)
    }

    /// Append under the lock. Returns the new block and its height.
    pub fn append_entry(&self, data: serde_json::Value) -> Result<(u64, LedgerBlock), LedgerError> {
        self.append_with(data, |_, _| Ok::<_, LedgerError>(()))
    }

    /// Append under the lock, running `persist` on the sealed block first.
    /// The block joins the chain only if `persist` succeeds, so a failed
    /// write leaves the chain and the next height unchanged.
    pub fn append_with<E>(
        &self,
        data: serde_json::Value,
        persist: impl FnOnce(u64, &LedgerBlock) -> Result<(), E>,
    ) -> Result<(u64, LedgerBlock), E>
    where
        E: From<LedgerError>,
    {
        let mut ledger = self.lock()?;
        let height = ledger.len() as u64;
        let block = ledger.next_block(data);
        persist(height, &block)?;
        ledger.commit(block.clone());
        Ok((height, block))
    }

    /// Run `f` with the chain locked
    pub fn with_ledger<R>(&self, f: impl FnOnce(&HashChainLedger) -> R) -> Result<R, LedgerError> {
        let ledger = self.lock()?;
        Ok(f(&ledger))
    }

    /// `false` when the lock is poisoned as well as on a broken chain
    pub fn verify_integrity(&self) -> bool {
        self.with_ledger(|l| l.verify_integrity()).unwrap_or(false)
    }

    pub fn verify_report(&self) -> Result<ChainReport, LedgerError> {
        self.with_ledger(|l| l.verify_report())
    }

    /// Copy of every block
    pub fn snapshot(&self) -> Result<Vec<LedgerBlock>, LedgerError> {
        self.with_ledger(|l| l.blocks().to_vec())
    }

    pub fn len(&self) -> Result<usize, LedgerError> {
        self.with_ledger(|l| l.len())
    }
}
