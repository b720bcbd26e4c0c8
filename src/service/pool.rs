//! Donor pool collaborator
//!
//! Supplies donor snapshots to the matcher and owns the availability flip
//! that claims a donor for a request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::records::Donor;
use super::ServiceError;

/// Source of donors for matching
pub trait DonorPool: Send + Sync {
    /// Snapshot of donors offering `organ` (case-insensitive). Donors without
    /// an organ count as `Kidney`.
    fn donors_for_organ(&self, organ: &str) -> Result<Vec<Donor>, ServiceError>;

    /// Store a donor, assigning an id if it has none. Returns the stored record.
    fn register(&self, donor: Donor) -> Result<Donor, ServiceError>;

    /// Atomically mark an available donor as taken. `false` if the donor is
    /// unknown or already claimed.
    fn claim(&self, donor_id: &str) -> Result<bool, ServiceError>;
}

/// Donor pool kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryDonorPool {
    donors: Mutex<Vec<Donor>>,
    next_id: AtomicU64,
}

impl InMemoryDonorPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_donors(donors: Vec<Donor>) -> Self {
        Self {
            donors: Mutex::new(donors),
            next_id: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Donor>>, ServiceError> {
        self.donors.lock().map_err(|_| ServiceError::PoolUnavailable)
    }

    pub fn all(&self) -> Result<Vec<Donor>, ServiceError> {
        Ok(self.lock()?.clone())
    }

    pub fn get(&self, donor_id: &str) -> Result<Option<Donor>, ServiceError> {
        Ok(self
            .lock()?
            .iter()
            .find(|d| d.id.as_deref() == Some(donor_id))
            .cloned())
    }
}

impl DonorPool for InMemoryDonorPool {
    fn donors_for_organ(&self, organ: &str) -> Result<Vec<Donor>, ServiceError> {
        let organ = organ.to_lowercase();
        Ok(self
            .lock()?
            .iter()
            .filter(|d| d.organ_or_default().to_lowercase() == organ)
            .cloned()
            .collect())
    }

    fn register(&self, mut donor: Donor) -> Result<Donor, ServiceError> {
        let mut donors = self.lock()?;
        if donor.id.is_none() {
            let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
            donor.id = Some(format!("donor-{n}"));
        }
        if donors.iter().any(|d| d.id == donor.id) {
            return Err(ServiceError::DuplicateDonor(donor.id.unwrap_or_default()));
        }
        donors.push(donor.clone());
        Ok(donor)
    }

    fn claim(&self, donor_id: &str) -> Result<bool, ServiceError> {
        let mut donors = self.lock()?;
        match donors.iter_mut().find(|d| d.id.as_deref() == Some(donor_id)) {
            Some(donor) if donor.is_available() => {
                donor.availability = Some(false);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_register_assigns_ids() {
        let pool = InMemoryDonorPool::new();
        let a = pool.register(Donor::default()).unwrap();
        let b = pool.register(Donor::default()).unwrap();
        assert_eq!(a.id.as_deref(), Some("donor-1"));
        assert_eq!(b.id.as_deref(), Some("donor-2"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let pool = InMemoryDonorPool::new();
        pool.register(Donor::new("d1", "A", "O+", "Kidney", 30, "Pune")).unwrap();
        assert!(matches!(
            pool.register(Donor::new("d1", "B", "O+", "Kidney", 30, "Pune")),
            Err(ServiceError::DuplicateDonor(id)) if id == "d1"
        ));
    }

    #[test]
    fn test_filter_by_organ() {
        let pool = InMemoryDonorPool::with_donors(vec![
            Donor::new("d1", "A", "O+", "Kidney", 30, "Pune"),
            Donor::new("d2", "B", "O+", "liver", 30, "Pune"),
            Donor::default(),
        ]);
        assert_eq!(pool.donors_for_organ("KIDNEY").unwrap().len(), 2);
        assert_eq!(pool.donors_for_organ("Liver").unwrap().len(), 1);
        assert!(pool.donors_for_organ("Heart").unwrap().is_empty());
    }

    #[test]
    fn test_claim_only_once() {
        let pool = Arc::new(InMemoryDonorPool::with_donors(vec![Donor::new(
            "d1", "A", "O+", "Kidney", 30, "Pune",
        )]));
        let winners: usize = (0..8)
            .map(|_| {
                let pool = pool.clone();
                thread::spawn(move || pool.claim("d1").unwrap())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();

        assert_eq!(winners, 1);
        assert!(!pool.get("d1").unwrap().unwrap().is_available());
        assert!(!pool.claim("missing").unwrap());
    }
}
