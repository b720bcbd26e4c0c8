//! Weighted match scoring and donor ranking
//!
//! Combines the factor scores into one overall score per donor, attaches a
//! confidence tier and recommendation, then filters, sorts and truncates.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::constants::*;
use crate::records::{Donor, RecipientRequest};
use super::scoring;

/// Qualitative confidence derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// >0.8 High, >0.6 Medium, else Low
    pub fn from_score(score: f64) -> Self {
        if score > 0.8 {
            Confidence::High
        } else if score > 0.6 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// Recommendation band. Boundaries are strict: a score of exactly 0.90 is
/// `Great`, not `Excellent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Marginal,
    Acceptable,
    Good,
    Great,
    Excellent,
}

impl Recommendation {
    pub fn from_score(score: f64) -> Self {
        if score > 0.90 {
            Recommendation::Excellent
        } else if score > 0.80 {
            Recommendation::Great
        } else if score > 0.70 {
            Recommendation::Good
        } else if score > 0.60 {
            Recommendation::Acceptable
        } else {
            Recommendation::Marginal
        }
    }

    /// Text shown to coordinators
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::Excellent => "EXCELLENT MATCH - Highly recommended for immediate transplant",
            Recommendation::Great => "GREAT MATCH - Well-suited for this recipient",
            Recommendation::Good => "GOOD MATCH - Suitable, but monitor other factors",
            Recommendation::Acceptable => "ACCEPTABLE MATCH - Consider if no better options available",
            Recommendation::Marginal => "MARGINAL MATCH - Only use if no alternatives available",
        }
    }
}

/// Per-factor sub-scores, each rounded to 3 decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub blood_compatibility: f64,
    pub genetic_compatibility: f64,
    pub geographic_proximity: f64,
    pub health_status: f64,
    pub organ_match: f64,
    pub urgency_factor: f64,
    pub overall_score: f64,
    /// Unrounded overall score >= urgency weight
    pub meets_urgency_threshold: bool,
    pub confidence: Confidence,
}

/// One ranked donor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub donor_id: Option<String>,
    pub donor_name: String,
    pub blood_group: Option<String>,
    pub organ: Option<String>,
    pub location: Option<String>,
    /// Unrounded overall score in [0, 1]
    pub match_score: f64,
    pub breakdown: MatchBreakdown,
    /// RFC 3339 generation time
    pub match_timestamp: String,
    pub recommendation: String,
    pub tier: Recommendation,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Missing ids sort after present ones
fn compare_donor_ids(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stateless donor ranker
#[derive(Debug, Clone, Copy)]
pub struct MatchRanker {
    default_limit: usize,
}

impl Default for MatchRanker {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_LIMIT)
    }
}

impl MatchRanker {
    pub fn new(default_limit: usize) -> Self {
        Self { default_limit }
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Overall weighted score and its breakdown for one donor/recipient pair.
    ///
    /// Availability feeds both the genetic proxy and the health factor.
    pub fn score(&self, donor: &Donor, recipient: &RecipientRequest, urgency: &str) -> (f64, MatchBreakdown) {
        let blood = scoring::blood_compatibility(
            donor.blood_group_or_default(),
            recipient.blood_group_or_default(),
        );
        let genetic = scoring::genetic_compatibility(donor, recipient);
        let proximity = scoring::geographic_proximity(
            donor.location_or_default(),
            recipient.location_or_default(),
        );
        let health = scoring::health_status(donor);
        let organ = scoring::organ_baseline(recipient.organ_or_default());

        let overall = blood * BLOOD_WEIGHT
            + genetic * GENETIC_WEIGHT
            + proximity * PROXIMITY_WEIGHT
            + health * HEALTH_WEIGHT
            + organ * ORGAN_WEIGHT;

        let urgency_factor = scoring::urgency_weight(urgency);

        let breakdown = MatchBreakdown {
            blood_compatibility: round3(blood),
            genetic_compatibility: round3(genetic),
            geographic_proximity: round3(proximity),
            health_status: round3(health),
            organ_match: round3(organ),
            urgency_factor: round3(urgency_factor),
            overall_score: round3(overall),
            meets_urgency_threshold: overall >= urgency_factor,
            confidence: Confidence::from_score(overall),
        };

        (overall, breakdown)
    }

    /// Rank available, blood-compatible donors for a recipient.
    ///
    /// Unavailable donors are excluded before scoring. Donors with a zero
    /// overall score or a zero blood score are dropped. Results are sorted by
    /// score descending, ties broken by donor id ascending (missing ids last)
    /// and then by input order, and truncated to `limit`.
    pub fn rank_matches(
        &self,
        donors: &[Donor],
        recipient: &RecipientRequest,
        urgency: &str,
        limit: usize,
    ) -> Vec<MatchResult> {
        let generated_at = Utc::now().to_rfc3339();
        let mut skipped_unavailable = 0usize;
        let mut skipped_incompatible = 0usize;

        let mut matches: Vec<MatchResult> = Vec::new();
        for donor in donors {
            if !donor.is_available() {
                skipped_unavailable += 1;
                continue;
            }

            let (score, breakdown) = self.score(donor, recipient, urgency);
            if score <= 0.0 || breakdown.blood_compatibility == 0.0 {
                skipped_incompatible += 1;
                continue;
            }

            let tier = Recommendation::from_score(score);
            matches.push(MatchResult {
                donor_id: donor.id.clone(),
                donor_name: donor.name_or_default().to_string(),
                blood_group: donor.blood_group.clone(),
                organ: donor.organ.clone(),
                location: donor.location.clone(),
                match_score: score,
                breakdown,
                match_timestamp: generated_at.clone(),
                recommendation: tier.message().to_string(),
                tier,
            });
        }

        matches.sort_by(|a, b| {
            b.match_score
                .total_cmp(&a.match_score)
                .then_with(|| compare_donor_ids(&a.donor_id, &b.donor_id))
        });
        matches.truncate(limit);

        debug!(
            pool = donors.len(),
            skipped_unavailable,
            skipped_incompatible,
            returned = matches.len(),
            "ranked donor pool"
        );

        matches
    }

    /// `rank_matches` with the ranker's default limit
    pub fn rank(&self, donors: &[Donor], recipient: &RecipientRequest, urgency: &str) -> Vec<MatchResult> {
        self.rank_matches(donors, recipient, urgency, self.default_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_recipient() -> RecipientRequest {
        RecipientRequest::new("AB+", "Kidney", "high", 32, "Mumbai")
    }

    #[test]
    fn test_universal_donor_scenario() {
        let donor = Donor::new("d1", "Asha", "O-", "Kidney", 30, "Mumbai");
        let (score, breakdown) = MatchRanker::default().score(&donor, &scenario_recipient(), "high");

        assert_eq!(breakdown.blood_compatibility, 0.85);
        assert_eq!(breakdown.geographic_proximity, 1.0);
        assert!(score > 0.8);
        assert_eq!(breakdown.confidence, Confidence::High);
        assert!(Recommendation::from_score(score) >= Recommendation::Great);
        assert!(breakdown.meets_urgency_threshold);
    }

    #[test]
    fn test_breakdown_values_are_rounded() {
        let donor = Donor::new("d1", "Asha", "O-", "Kidney", 30, "Mumbai");
        let (_, breakdown) = MatchRanker::default().score(&donor, &scenario_recipient(), "high");
        // 0.5 + 0.2 * 0.98 + 0.15
        assert_eq!(breakdown.genetic_compatibility, 0.846);
        assert_eq!(breakdown.organ_match, 0.95);
        assert_eq!(breakdown.urgency_factor, 0.85);
    }

    #[test]
    fn test_recommendation_boundaries_are_strict() {
        assert_eq!(Recommendation::from_score(0.95), Recommendation::Excellent);
        assert_eq!(Recommendation::from_score(0.90), Recommendation::Great);
        assert_eq!(Recommendation::from_score(0.80), Recommendation::Good);
        assert_eq!(Recommendation::from_score(0.70), Recommendation::Acceptable);
        assert_eq!(Recommendation::from_score(0.60), Recommendation::Marginal);
        assert_eq!(Recommendation::from_score(0.0), Recommendation::Marginal);
    }

    #[test]
    fn test_confidence_boundaries() {
        assert_eq!(Confidence::from_score(0.81), Confidence::High);
        assert_eq!(Confidence::from_score(0.80), Confidence::Medium);
        assert_eq!(Confidence::from_score(0.60), Confidence::Low);
    }

    #[test]
    fn test_unavailable_donor_excluded() {
        let donors = vec![
            Donor::new("d1", "Asha", "AB+", "Kidney", 32, "Mumbai").with_availability(false),
            Donor::new("d2", "Ravi", "O-", "Kidney", 45, "Delhi"),
        ];
        let results = MatchRanker::default().rank_matches(&donors, &scenario_recipient(), "high", 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].donor_id.as_deref(), Some("d2"));
    }

    #[test]
    fn test_blood_incompatible_donor_excluded() {
        let recipient = RecipientRequest::new("O-", "Liver", "medium", 40, "Pune");
        let donors = vec![
            Donor::new("d1", "Asha", "AB+", "Liver", 40, "Pune"),
            Donor::new("d2", "Ravi", "O-", "Liver", 40, "Pune"),
        ];
        let results = MatchRanker::default().rank(&donors, &recipient, "medium");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].donor_id.as_deref(), Some("d2"));
        assert_eq!(results[0].tier, Recommendation::Excellent);
    }

    #[test]
    fn test_sorted_descending_and_truncated() {
        let recipient = RecipientRequest::new("AB+", "Heart", "low", 40, "Chennai");
        let donors = vec![
            Donor::new("d1", "A", "O+", "Heart", 80, "Delhi"),
            Donor::new("d2", "B", "AB+", "Heart", 40, "Chennai"),
            Donor::new("d3", "C", "B-", "Heart", 41, "Chennai"),
        ];
        let results = MatchRanker::default().rank_matches(&donors, &recipient, "low", 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].donor_id.as_deref(), Some("d2"));
        assert_eq!(results[1].donor_id.as_deref(), Some("d3"));
        assert!(results[0].match_score >= results[1].match_score);
    }

    #[test]
    fn test_ties_broken_by_donor_id() {
        let recipient = RecipientRequest::new("A+", "Lung", "medium", 30, "Kochi");
        let donors = vec![
            Donor::new("zeta", "Z", "A+", "Lung", 30, "Kochi"),
            Donor { id: None, ..Donor::new("", "N", "A+", "Lung", 30, "Kochi") },
            Donor::new("alpha", "A", "A+", "Lung", 30, "Kochi"),
        ];
        let results = MatchRanker::default().rank(&donors, &recipient, "medium");
        let ids: Vec<Option<&str>> = results.iter().map(|r| r.donor_id.as_deref()).collect();
        assert_eq!(ids, vec![Some("alpha"), Some("zeta"), None]);
    }

    #[test]
    fn test_malformed_records_use_defaults() {
        let donor: Donor = serde_json::from_str(r#"{"id": "d9", "age": "??"}"#).unwrap();
        let recipient: RecipientRequest = serde_json::from_str("{}").unwrap();
        let results = MatchRanker::default().rank(&[donor], &recipient, "medium");
        // O+ donor to O+ recipient, same (empty) location, same default age
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].donor_name, "Unknown");
        assert_eq!(results[0].breakdown.blood_compatibility, 1.0);
    }

    #[test]
    fn test_zero_limit_returns_nothing() {
        let donors = vec![Donor::new("d1", "A", "O-", "Kidney", 30, "Mumbai")];
        assert!(MatchRanker::default()
            .rank_matches(&donors, &scenario_recipient(), "high", 0)
            .is_empty());
    }
}
