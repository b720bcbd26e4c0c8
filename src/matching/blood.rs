//! ABO/Rh blood groups and the donor compatibility table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the eight ABO/Rh blood groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "O-")]
    ONeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "AB-")]
    ABNeg,
    #[serde(rename = "AB+")]
    ABPos,
}

use BloodGroup::*;

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [ONeg, OPos, ANeg, APos, BNeg, BPos, ABNeg, ABPos];

    pub fn as_str(&self) -> &'static str {
        match self {
            ONeg => "O-",
            OPos => "O+",
            ANeg => "A-",
            APos => "A+",
            BNeg => "B-",
            BPos => "B+",
            ABNeg => "AB-",
            ABPos => "AB+",
        }
    }

    /// Donor groups eligible to give to a recipient of this group.
    ///
    /// O- appears in every row (universal donor); AB+ accepts every group
    /// (universal recipient).
    pub fn compatible_donors(&self) -> &'static [BloodGroup] {
        match self {
            ONeg => &[ONeg],
            OPos => &[ONeg, OPos],
            ANeg => &[ONeg, ANeg],
            APos => &[ONeg, OPos, ANeg, APos],
            BNeg => &[ONeg, BNeg],
            BPos => &[ONeg, OPos, BNeg, BPos],
            ABNeg => &[ONeg, ANeg, BNeg, ABNeg],
            ABPos => &[ONeg, OPos, ANeg, APos, BNeg, BPos, ABNeg, ABPos],
        }
    }

    pub fn can_receive_from(&self, donor: BloodGroup) -> bool {
        self.compatible_donors().contains(&donor)
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised blood group label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown blood group: {0:?}")]
pub struct UnknownBloodGroup(pub String);

impl FromStr for BloodGroup {
    type Err = UnknownBloodGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "O-" => Ok(ONeg),
            "O+" => Ok(OPos),
            "A-" => Ok(ANeg),
            "A+" => Ok(APos),
            "B-" => Ok(BNeg),
            "B+" => Ok(BPos),
            "AB-" => Ok(ABNeg),
            "AB+" => Ok(ABPos),
            _ => Err(UnknownBloodGroup(s.to_string())),
        }
    }
}
