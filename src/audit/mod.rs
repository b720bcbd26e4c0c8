//! Audit module - typed domain events written to the hash-chained ledger
//!
//! Recording is fallible and returns a `Result`. Business operations treat
//! audit failures as non-fatal: the call site logs the error and carries on.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::ledger::{ChainReport, HashChainLedger, LedgerBlock, LedgerError, SharedLedger, Violation};
use crate::storage::{LedgerStore, StorageError};

#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("audit store error: {0}")]
    Storage(#[from] StorageError),
}

/// Domain events worth an audit entry
#[derive(Debug, Clone, PartialEq)]
pub enum AuditEvent {
    DonorRegistration {
        donor_id: String,
        donor_name: String,
        blood_group: String,
    },
    HospitalRequest {
        request_id: String,
        hospital_id: String,
        urgency: String,
        organ: String,
    },
    MatchFound {
        request_id: String,
        donor_id: String,
        compatibility_score: f64,
    },
}

/// Block payload of an audit event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditPayload {
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub action: String,
    pub details: Value,
}

impl AuditEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            AuditEvent::DonorRegistration { .. } => "DONOR_REGISTRATION",
            AuditEvent::HospitalRequest { .. } => "HOSPITAL_REQUEST",
            AuditEvent::MatchFound { .. } => "MATCH_FOUND",
        }
    }

    pub fn entity_type(&self) -> &'static str {
        match self {
            AuditEvent::DonorRegistration { .. } => "Donor",
            AuditEvent::HospitalRequest { .. } | AuditEvent::MatchFound { .. } => "Request",
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            AuditEvent::DonorRegistration { .. } => "registered",
            AuditEvent::HospitalRequest { .. } => "created",
            AuditEvent::MatchFound { .. } => "matched",
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            AuditEvent::DonorRegistration { donor_id, .. } => donor_id,
            AuditEvent::HospitalRequest { request_id, .. } => request_id,
            AuditEvent::MatchFound { request_id, .. } => request_id,
        }
    }

    fn details(&self) -> Value {
        match self {
            AuditEvent::DonorRegistration { donor_name, blood_group, .. } => json!({
                "donor_name": donor_name,
                "blood_group": blood_group,
            }),
            AuditEvent::HospitalRequest { hospital_id, urgency, organ, .. } => json!({
                "hospital_id": hospital_id,
                "urgency": urgency,
                "organ": organ,
            }),
            AuditEvent::MatchFound { donor_id, compatibility_score, .. } => json!({
                "donor_id": donor_id,
                "compatibility_score": compatibility_score,
            }),
        }
    }

    pub fn payload(&self) -> AuditPayload {
        AuditPayload {
            event_type: self.event_type().to_string(),
            entity_type: self.entity_type().to_string(),
            entity_id: self.entity_id().to_string(),
            action: self.action().to_string(),
            details: self.details(),
        }
    }
}

/// Audit facade over a shared ledger, optionally persisted
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    ledger: SharedLedger,
    store: Option<LedgerStore>,
    /// First persisted height that could not be read back
    unreadable_from: Option<u64>,
}

impl AuditLog {
    /// In-memory audit log with a fresh chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate the chain from `store`; every later block is persisted to it.
    /// A store with no blocks is initialised with a genesis block.
    ///
    /// Blocks past a gap or that fail to decode are quarantined and the
    /// readable prefix is kept. The loss shows up as a [`Violation::Unreadable`]
    /// in [`Self::chain_report`] rather than as an error.
    pub fn open(store: LedgerStore) -> Result<Self, AuditError> {
        let (blocks, problem) = store.load_readable()?;
        if let Some(problem) = problem {
            let height = blocks.len() as u64;
            let moved = store.quarantine_from(height)?;
            warn!(error = %problem, height, moved, "quarantined unreadable ledger blocks");
        }

        let fresh = blocks.is_empty();
        let ledger = HashChainLedger::from_blocks(blocks);
        if fresh {
            store.save_all(ledger.blocks())?;
            info!("initialised audit ledger with genesis block");
        } else {
            info!(blocks = ledger.len(), "loaded audit ledger");
        }

        Ok(Self {
            ledger: SharedLedger::new(ledger),
            unreadable_from: store.first_quarantined_height()?,
            store: Some(store),
        })
    }

    /// Append an event to the chain. With a store, the block is written
    /// before it joins the chain; a failed write appends nothing.
    pub fn record(&self, event: &AuditEvent) -> Result<LedgerBlock, AuditError> {
        let data = serde_json::to_value(event.payload()).map_err(LedgerError::from)?;
        let (height, block) = self.ledger.append_with(data, |height, block| match &self.store {
            Some(store) => store.save_block(height, block).map_err(AuditError::from),
            None => Ok(()),
        })?;
        info!(
            event_type = event.event_type(),
            entity_id = event.entity_id(),
            height,
            "audit event recorded"
        );
        Ok(block)
    }

    pub fn log_donor_registration(&self, donor_id: &str, donor_name: &str, blood_group: &str) -> Result<LedgerBlock, AuditError> {
        self.record(&AuditEvent::DonorRegistration {
            donor_id: donor_id.to_string(),
            donor_name: donor_name.to_string(),
            blood_group: blood_group.to_string(),
        })
    }

    pub fn log_hospital_request(&self, request_id: &str, hospital_id: &str, urgency: &str, organ: &str) -> Result<LedgerBlock, AuditError> {
        self.record(&AuditEvent::HospitalRequest {
            request_id: request_id.to_string(),
            hospital_id: hospital_id.to_string(),
            urgency: urgency.to_string(),
            organ: organ.to_string(),
        })
    }

    pub fn log_match_found(&self, request_id: &str, donor_id: &str, compatibility_score: f64) -> Result<LedgerBlock, AuditError> {
        self.record(&AuditEvent::MatchFound {
            request_id: request_id.to_string(),
            donor_id: donor_id.to_string(),
            compatibility_score,
        })
    }

    /// Admin check of the whole chain. A broken chain is logged, not raised.
    pub fn verify_chain(&self) -> bool {
        let valid = self.ledger.verify_integrity() && self.unreadable_from.is_none();
        if !valid {
            warn!("audit ledger failed integrity verification");
        }
        valid
    }

    pub fn chain_report(&self) -> Result<ChainReport, AuditError> {
        let mut report = self.ledger.verify_report()?;
        if let (true, Some(height)) = (report.is_valid, self.unreadable_from) {
            report.is_valid = false;
            report.first_violation = Some(height as usize);
            report.violation = Some(Violation::Unreadable);
        }
        Ok(report)
    }

    /// Copy of the full chain
    pub fn chain(&self) -> Result<Vec<LedgerBlock>, AuditError> {
        Ok(self.ledger.snapshot()?)
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }
}
