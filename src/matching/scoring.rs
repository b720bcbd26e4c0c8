//! Per-factor compatibility scores
//!
//! Pure functions, each returning a value in [0, 1]. The genetic and
//! proximity factors are documented stand-ins (age similarity, exact location
//! match), not medical or geographic models.

use crate::constants::*;
use crate::records::{Donor, RecipientRequest};
use super::BloodGroup;

/// Blood compatibility between a donor and a recipient group label.
///
/// 1.0 when identical, 0.85 when the donor is in the recipient's compatible
/// set, otherwise 0.0. Unknown labels score 0.0.
pub fn blood_compatibility(donor_blood: &str, recipient_blood: &str) -> f64 {
    let (donor, recipient) = match (
        donor_blood.parse::<BloodGroup>(),
        recipient_blood.parse::<BloodGroup>(),
    ) {
        (Ok(d), Ok(r)) => (d, r),
        _ => return 0.0,
    };

    if donor == recipient {
        BLOOD_IDENTICAL
    } else if recipient.can_receive_from(donor) {
        BLOOD_COMPATIBLE
    } else {
        0.0
    }
}

/// Genetic-compatibility proxy from age similarity and donor availability
pub fn genetic_compatibility(donor: &Donor, recipient: &RecipientRequest) -> f64 {
    let age_diff = donor.age_or_default().abs_diff(recipient.age_or_default()) as f64;
    let age_factor = (1.0 - age_diff / 100.0).max(0.0);

    let mut score = GENETIC_BASE + age_factor * GENETIC_AGE_BONUS;
    if donor.is_available() {
        score += GENETIC_AVAILABILITY_BONUS;
    }
    score.min(1.0)
}

/// 1.0 for the same location (case-insensitive), else the fixed fallback
pub fn geographic_proximity(donor_location: &str, recipient_location: &str) -> f64 {
    if donor_location.to_lowercase() == recipient_location.to_lowercase() {
        1.0
    } else {
        PROXIMITY_FALLBACK
    }
}

/// Minimum overall score a match must reach for the given urgency
pub fn urgency_weight(urgency: &str) -> f64 {
    match urgency.trim().to_ascii_lowercase().as_str() {
        "low" => 0.6,
        "medium" => 0.7,
        "high" => 0.85,
        _ => DEFAULT_URGENCY_WEIGHT,
    }
}

/// Baseline transplant score of an organ type
pub fn organ_baseline(organ: &str) -> f64 {
    match organ.trim().to_ascii_lowercase().as_str() {
        "kidney" => 0.95,
        "liver" => 0.92,
        "heart" => 0.98,
        "lung" => 0.90,
        "pancreas" => 0.85,
        "cornea" => 0.88,
        _ => DEFAULT_ORGAN_BASELINE,
    }
}

/// Health factor: availability doubles as the donor health signal
pub fn health_status(donor: &Donor) -> f64 {
    if donor.is_available() {
        HEALTH_AVAILABLE
    } else {
        HEALTH_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_blood_identical() {
        assert_eq!(blood_compatibility("A+", "A+"), 1.0);
        assert_eq!(blood_compatibility("ab-", "AB-"), 1.0);
    }

    #[test]
    fn test_blood_compatible() {
        assert_eq!(blood_compatibility("O-", "AB+"), 0.85);
        assert_eq!(blood_compatibility("O+", "B+"), 0.85);
    }

    #[test]
    fn test_blood_incompatible() {
        assert_eq!(blood_compatibility("AB+", "O-"), 0.0);
        assert_eq!(blood_compatibility("A+", "B+"), 0.0);
    }

    #[test]
    fn test_blood_malformed_is_zero() {
        assert_eq!(blood_compatibility("XYZ", "XYZ"), 0.0);
        assert_eq!(blood_compatibility("", "A+"), 0.0);
        assert_eq!(blood_compatibility("A+", "Q"), 0.0);
    }

    #[test]
    fn test_genetic_same_age_available() {
        let donor = Donor::new("d1", "A", "O+", "Kidney", 40, "Pune");
        let recipient = RecipientRequest::new("O+", "Kidney", "high", 40, "Pune");
        assert!(approx(genetic_compatibility(&donor, &recipient), 0.85));
    }

    #[test]
    fn test_genetic_age_gap_and_unavailable() {
        let donor = Donor::new("d1", "A", "O+", "Kidney", 20, "Pune").with_availability(false);
        let recipient = RecipientRequest::new("O+", "Kidney", "high", 70, "Pune");
        // 0.5 + 0.2 * (1 - 50/100)
        assert!(approx(genetic_compatibility(&donor, &recipient), 0.6));
    }

    #[test]
    fn test_genetic_age_factor_floors_at_zero() {
        let donor = Donor::new("d1", "A", "O+", "Kidney", 0, "Pune").with_availability(false);
        let recipient = RecipientRequest::new("O+", "Kidney", "high", 120, "Pune");
        assert!(approx(genetic_compatibility(&donor, &recipient), 0.5));
    }

    #[test]
    fn test_proximity() {
        assert_eq!(geographic_proximity("Mumbai", "mumbai"), 1.0);
        assert_eq!(geographic_proximity("Mumbai", "Delhi"), 0.6);
    }

    #[test]
    fn test_urgency_weights() {
        assert_eq!(urgency_weight("low"), 0.6);
        assert_eq!(urgency_weight("Medium"), 0.7);
        assert_eq!(urgency_weight("HIGH"), 0.85);
        assert_eq!(urgency_weight("critical"), 0.7);
        assert_eq!(urgency_weight("whenever"), 0.7);
    }

    #[test]
    fn test_organ_baselines() {
        assert_eq!(organ_baseline("Kidney"), 0.95);
        assert_eq!(organ_baseline("heart"), 0.98);
        assert_eq!(organ_baseline("Cornea"), 0.88);
        assert_eq!(organ_baseline("Spleen"), 0.90);
    }

    #[test]
    fn test_health_status() {
        let donor = Donor::new("d1", "A", "O+", "Kidney", 40, "Pune");
        assert_eq!(health_status(&donor), 1.0);
        assert_eq!(health_status(&donor.with_availability(false)), 0.3);
    }
}
