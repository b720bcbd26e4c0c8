//! Donor record supplied by the donor pool

use serde::{Deserialize, Serialize};
use super::lenient;
use crate::constants::{DEFAULT_AGE, DEFAULT_BLOOD_GROUP, DEFAULT_DONOR_NAME, DEFAULT_ORGAN};

/// A registered donor.
///
/// Every field is optional so that partial records from storage never abort
/// a ranking call. Accessors apply the default substitution rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub blood_group: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub organ: Option<String>,
    #[serde(default, deserialize_with = "lenient::age")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub availability: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: Option<String>,
}

impl Donor {
    pub fn new(id: &str, name: &str, blood_group: &str, organ: &str, age: u32, location: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            blood_group: Some(blood_group.to_string()),
            organ: Some(organ.to_string()),
            age: Some(age),
            availability: Some(true),
            location: Some(location.to_string()),
        }
    }

    pub fn with_availability(mut self, available: bool) -> Self {
        self.availability = Some(available);
        self
    }

    /// Blood group, `O+` when missing
    pub fn blood_group_or_default(&self) -> &str {
        self.blood_group.as_deref().unwrap_or(DEFAULT_BLOOD_GROUP)
    }

    /// Organ, `Kidney` when missing
    pub fn organ_or_default(&self) -> &str {
        self.organ.as_deref().unwrap_or(DEFAULT_ORGAN)
    }

    /// Age, 50 when missing
    pub fn age_or_default(&self) -> u32 {
        self.age.unwrap_or(DEFAULT_AGE)
    }

    pub fn location_or_default(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }

    pub fn name_or_default(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_DONOR_NAME)
    }

    /// A donor without an availability flag is treated as available.
    pub fn is_available(&self) -> bool {
        self.availability.unwrap_or(true)
    }
}
