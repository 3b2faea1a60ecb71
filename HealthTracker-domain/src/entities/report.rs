use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::fitness::FitnessRecord;
use super::medication::Medication;

/// Coarse health risk derived from heart rate and activity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    /// No assessment was available when the report was built
    Unknown,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Risk level with the rule that produced it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub reason: String,
}

impl RiskAssessment {
    pub fn unknown() -> Self {
        Self {
            level: RiskLevel::Unknown,
            reason: String::new(),
        }
    }
}

/// Text report plus the data it was built from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthReport {
    pub summary: String,
    pub medications: Vec<Medication>,
    pub fitness: FitnessRecord,
    pub conflicts: Vec<String>,
    pub risk: RiskAssessment,
}

/// Everything produced by one workflow run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct WorkflowOutcome {
    pub medications: Vec<Medication>,
    pub fitness: FitnessRecord,
    pub conflicts: Vec<String>,
    pub risk: RiskAssessment,
    pub report: HealthReport,
}

/// Analytics over a user's recent fitness history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AnalyticsSummary {
    pub records: usize,
    pub average_steps: f64,
    pub calories_status: String,
    pub heart_rate_status: String,
}
