//! Recipient donation request

use serde::{Deserialize, Serialize};
use super::lenient;
use crate::constants::{DEFAULT_AGE, DEFAULT_BLOOD_GROUP, DEFAULT_ORGAN, DEFAULT_URGENCY};

/// A recipient's donation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipientRequest {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub hospital_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub blood_group: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub organ: Option<String>,
    /// `low`, `medium`, `high` or `critical`
    #[serde(default, deserialize_with = "lenient::string")]
    pub urgency: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::age")]
    pub age: Option<u32>,
}

impl RecipientRequest {
    pub fn new(blood_group: &str, organ: &str, urgency: &str, age: u32, location: &str) -> Self {
        Self {
            id: None,
            hospital_id: None,
            blood_group: Some(blood_group.to_string()),
            organ: Some(organ.to_string()),
            urgency: Some(urgency.to_string()),
            location: Some(location.to_string()),
            age: Some(age),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn blood_group_or_default(&self) -> &str {
        self.blood_group.as_deref().unwrap_or(DEFAULT_BLOOD_GROUP)
    }

    pub fn organ_or_default(&self) -> &str {
        self.organ.as_deref().unwrap_or(DEFAULT_ORGAN)
    }

    pub fn age_or_default(&self) -> u32 {
        self.age.unwrap_or(DEFAULT_AGE)
    }

    pub fn location_or_default(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }

    /// Urgency string, `medium` when missing
    pub fn urgency_or_default(&self) -> &str {
        self.urgency.as_deref().unwrap_or(DEFAULT_URGENCY)
    }
}
