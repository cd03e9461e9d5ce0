use std::fmt;

use college_core::ServiceError;
use serde::{Deserialize, Serialize};

/// Enrollment time-of-day category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    /// Morning.
    #[serde(rename = "M")]
    Morning,
    /// Afternoon ("tarde").
    #[serde(rename = "T")]
    Afternoon,
    /// Night.
    #[serde(rename = "N")]
    Night,
}

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::Night];

    /// Parse a caller-supplied shift, case-insensitively.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        match raw.trim().to_uppercase().as_str() {
            "M" => Ok(Shift::Morning),
            "T" => Ok(Shift::Afternoon),
            "N" => Ok(Shift::Night),
            _ => Err(ServiceError::Validation(format!(
                "invalid shift '{}': must be 'M' (morning), 'T' (afternoon) or 'N' (night)",
                raw
            ))),
        }
    }

    /// Single-letter code used in storage and enrollment codes.
    pub fn as_str(self) -> &'static str {
        match self {
            Shift::Morning => "M",
            Shift::Afternoon => "T",
            Shift::Night => "N",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
