//! Call scenario tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Purpose of a call; selects the prompt template the orchestrator uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    BillingInquiry,
    InsuranceVerification,
    AppointmentScheduling,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::BillingInquiry,
        Scenario::InsuranceVerification,
        Scenario::AppointmentScheduling,
    ];

    /// Wire tag, e.g. `billing_inquiry`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::BillingInquiry => "billing_inquiry",
            Scenario::InsuranceVerification => "insurance_verification",
            Scenario::AppointmentScheduling => "appointment_scheduling",
        }
    }

    /// Human-readable name for summaries and dashboards.
    pub fn display_name(&self) -> &'static str {
        match self {
            Scenario::BillingInquiry => "Billing Inquiry",
            Scenario::InsuranceVerification => "Insurance Verification",
            Scenario::AppointmentScheduling => "Appointment Scheduling",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.as_str() == s)
            .ok_or_else(|| ValidationError::unknown_variant("scenario", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_tags_round_trip_through_from_str() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.as_str().parse::<Scenario>().unwrap(), scenario);
        }
    }

    #[test]
    fn unknown_scenario_tag_is_rejected() {
        let err = "tax_filing".parse::<Scenario>().unwrap_err();
        assert_eq!(err, ValidationError::unknown_variant("scenario", "tax_filing"));
    }

    #[test]
    fn scenario_serializes_snake_case() {
        let json = serde_json::to_string(&Scenario::InsuranceVerification).unwrap();
        assert_eq!(json, "\"insurance_verification\"");
    }
}
