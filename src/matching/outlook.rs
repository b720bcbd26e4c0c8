//! Transplant outcome heuristic
//!
//! Adjusts a match score by exact blood and location agreement and lists the
//! risk factors a coordinator should review. Like the genetic proxy, this is
//! a heuristic and makes no medical claim.

use serde::{Deserialize, Serialize};

use crate::records::{Donor, RecipientRequest};
use super::BloodGroup;

/// Donors older than this are flagged
const RISK_AGE_LIMIT: u32 = 65;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Proceed,
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlookConfidence {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransplantOutlook {
    /// Percentage, 2 decimals
    pub predicted_success_rate: f64,
    pub confidence_level: OutlookConfidence,
    pub risk_factors: Vec<String>,
    pub recommendation: Verdict,
}

fn same_blood_group(donor: &Donor, recipient: &RecipientRequest) -> bool {
    match (
        donor.blood_group_or_default().parse::<BloodGroup>(),
        recipient.blood_group_or_default().parse::<BloodGroup>(),
    ) {
        (Ok(d), Ok(r)) => d == r,
        _ => false,
    }
}

/// Predict the outcome of transplanting from `donor` to `recipient` given
/// their match score.
pub fn predict_outcome(donor: &Donor, recipient: &RecipientRequest, match_score: f64) -> TransplantOutlook {
    let identical_blood = same_blood_group(donor, recipient);
    let same_location = donor.location_or_default().to_lowercase()
        == recipient.location_or_default().to_lowercase();

    let mut probability = match_score;
    if identical_blood {
        probability += 0.10;
    }
    if same_location {
        probability += 0.05;
    }
    let probability = probability.clamp(0.0, 1.0);

    let mut risk_factors = Vec::new();
    if !identical_blood {
        risk_factors.push("Blood type mismatch".to_string());
    }
    if !donor.is_available() {
        risk_factors.push("Donor health concerns".to_string());
    }
    if donor.age_or_default() > RISK_AGE_LIMIT {
        risk_factors.push("Donor age above 65".to_string());
    }
    if risk_factors.is_empty() {
        risk_factors.push("No major risk factors identified".to_string());
    }

    TransplantOutlook {
        predicted_success_rate: (probability * 100.0 * 100.0).round() / 100.0,
        confidence_level: if probability > 0.85 {
            OutlookConfidence::High
        } else {
            OutlookConfidence::Medium
        },
        risk_factors,
        recommendation: if probability > 0.75 {
            Verdict::Proceed
        } else {
            Verdict::Review
        },
    }
}
