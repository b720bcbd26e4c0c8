//! LifeLink Core Library
//!
//! Donor/recipient matching for a blood and organ donation platform, plus an
//! append-only, SHA-256 hash-chained audit ledger of registrations, requests
//! and matches.

pub mod audit;
pub mod config;
pub mod crypto;
pub mod ledger;
pub mod matching;
pub mod records;
pub mod rpc;
pub mod service;
pub mod storage;

/// Scoring constants - fixed tables, never configurable at runtime
pub mod constants {
    /// Factor weights of the overall match score (sum to 1.0)
    pub const BLOOD_WEIGHT: f64 = 0.40;
    pub const GENETIC_WEIGHT: f64 = 0.25;
    pub const PROXIMITY_WEIGHT: f64 = 0.15;
    pub const HEALTH_WEIGHT: f64 = 0.15;
    pub const ORGAN_WEIGHT: f64 = 0.05;

    /// Blood score for an identical group
    pub const BLOOD_IDENTICAL: f64 = 1.0;
    /// Blood score for a compatible, non-identical group
    pub const BLOOD_COMPATIBLE: f64 = 0.85;

    /// Genetic proxy: base score, age-similarity bonus, availability bonus
    pub const GENETIC_BASE: f64 = 0.5;
    pub const GENETIC_AGE_BONUS: f64 = 0.2;
    pub const GENETIC_AVAILABILITY_BONUS: f64 = 0.15;

    /// Proximity score when locations differ (no geocoding)
    pub const PROXIMITY_FALLBACK: f64 = 0.6;

    /// Health factor for available / unavailable donors
    pub const HEALTH_AVAILABLE: f64 = 1.0;
    pub const HEALTH_UNAVAILABLE: f64 = 0.3;

    /// Urgency weight for unrecognised urgency labels
    pub const DEFAULT_URGENCY_WEIGHT: f64 = 0.7;
    /// Organ baseline for organs outside the table
    pub const DEFAULT_ORGAN_BASELINE: f64 = 0.90;

    /// Default substitutions applied at the matching boundary
    pub const DEFAULT_BLOOD_GROUP: &str = "O+";
    pub const DEFAULT_ORGAN: &str = "Kidney";
    pub const DEFAULT_AGE: u32 = 50;
    pub const DEFAULT_URGENCY: &str = "medium";
    pub const DEFAULT_DONOR_NAME: &str = "Unknown";

    /// Default number of ranked results
    pub const DEFAULT_MATCH_LIMIT: usize = 10;
    /// Results returned by the matching service per request
    pub const SERVICE_MATCH_LIMIT: usize = 5;
    /// Matches scoring strictly above this are written to the audit ledger
    pub const AUDIT_MATCH_THRESHOLD: f64 = 0.8;

    /// Payload of the genesis block
    pub const GENESIS_MESSAGE: &str = "Genesis Block";
}
