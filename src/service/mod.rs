//! Service module - ties the donor pool, the ranker and the audit log together

mod pool;

pub use pool::*;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::audit::AuditLog;
use crate::constants::{AUDIT_MATCH_THRESHOLD, SERVICE_MATCH_LIMIT};
use crate::matching::{MatchRanker, MatchResult};
use crate::records::{Donor, RecipientRequest};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("donor pool unavailable")]
    PoolUnavailable,
    #[error("donor {0} is already registered")]
    DuplicateDonor(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Matched,
}

/// A created request with its initial matches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestOutcome {
    pub request: RecipientRequest,
    pub status: RequestStatus,
    pub matches: Vec<MatchResult>,
}

/// Matching workflow over a donor pool.
///
/// Audit entries are best-effort: a failing ledger is logged and never fails
/// the registration, request or match that triggered it.
pub struct MatchingService<P: DonorPool> {
    pool: Arc<P>,
    audit: AuditLog,
    ranker: MatchRanker,
    next_request: AtomicU64,
}

impl<P: DonorPool> MatchingService<P> {
    pub fn new(pool: Arc<P>, audit: AuditLog) -> Self {
        Self {
            pool,
            audit,
            ranker: MatchRanker::new(SERVICE_MATCH_LIMIT),
            next_request: AtomicU64::new(0),
        }
    }

    pub fn pool(&self) -> &Arc<P> {
        &self.pool
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn ranker(&self) -> &MatchRanker {
        &self.ranker
    }

    /// Store a donor and record the registration
    pub fn register_donor(&self, donor: Donor) -> Result<Donor, ServiceError> {
        let donor = self.pool.register(donor)?;
        let donor_id = donor.id.as_deref().unwrap_or_default();

        if let Err(e) = self.audit.log_donor_registration(
            donor_id,
            donor.name_or_default(),
            donor.blood_group_or_default(),
        ) {
            warn!(error = %e, donor_id, "failed to record donor registration");
        }
        info!(donor_id, "donor registered");
        Ok(donor)
    }

    /// Record a new request and run matching for it immediately
    pub fn create_request(&self, mut request: RecipientRequest) -> Result<RequestOutcome, ServiceError> {
        if request.id.is_none() {
            let n = self.next_request.fetch_add(1, Ordering::Relaxed) + 1;
            request.id = Some(format!("request-{n}"));
        }
        let request_id = request.id.clone().unwrap_or_default();

        if let Err(e) = self.audit.log_hospital_request(
            &request_id,
            request.hospital_id.as_deref().unwrap_or_default(),
            request.urgency_or_default(),
            request.organ_or_default(),
        ) {
            warn!(error = %e, request_id = %request_id, "failed to record hospital request");
        }

        let matches = self.find_matches(&request, self.ranker.default_limit())?;
        let status = if matches.is_empty() {
            RequestStatus::Pending
        } else {
            RequestStatus::Matched
        };

        Ok(RequestOutcome { request, status, matches })
    }

    /// Rank the pool's donors for the request's organ and record every
    /// match scoring above the audit threshold. Requests without an id are
    /// ranked but not recorded.
    pub fn find_matches(&self, request: &RecipientRequest, limit: usize) -> Result<Vec<MatchResult>, ServiceError> {
        let donors = self.pool.donors_for_organ(request.organ_or_default())?;
        let matches = self
            .ranker
            .rank_matches(&donors, request, request.urgency_or_default(), limit);

        let request_id = request.id.as_deref().unwrap_or_default();
        let audited = matches.iter().filter(|m| m.match_score > AUDIT_MATCH_THRESHOLD);
        if request.id.is_none() {
            debug!(skipped = audited.count(), "request has no id, matches not recorded");
        } else {
            for m in audited {
                let donor_id = m.donor_id.as_deref().unwrap_or_default();
                if let Err(e) = self.audit.log_match_found(request_id, donor_id, m.match_score) {
                    warn!(error = %e, request_id, donor_id, "failed to record match");
                }
            }
        }

        info!(
            request_id,
            candidates = donors.len(),
            matches = matches.len(),
            "matching complete"
        );
        Ok(matches)
    }

    /// Claim a matched donor for a request
    pub fn claim_donor(&self, donor_id: &str) -> Result<bool, ServiceError> {
        let claimed = self.pool.claim(donor_id)?;
        if !claimed {
            warn!(donor_id, "donor could not be claimed");
        }
        Ok(claimed)
    }
}
