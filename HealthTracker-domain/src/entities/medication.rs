use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Domain model for a medication entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Medication {
    pub id: i64,
    /// Patient the medication belongs to
    pub user_id: i64,
    pub med_name: String,
    pub schedule: String,
    pub notes: Option<String>,
    /// Doctor who added the entry
    pub created_by: Option<i64>,
    pub created_at: String,
}

/// Request payload for adding or editing a medication
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MedicationRequest {
    #[validate(length(min = 1, max = 100, message = "Medication name must be between 1 and 100 characters"))]
    pub med_name: String,

    #[validate(length(min = 1, max = 100, message = "Schedule must be between 1 and 100 characters"))]
    pub schedule: String,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

/// Request payload for an ad-hoc interaction check
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct InteractionCheckRequest {
    /// Every distinct pair is looked up in the reference table
    #[validate(length(min = 1, max = 50, message = "Provide between 1 and 50 medications"))]
    pub medications: Vec<String>,
}

/// Result of an interaction check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct InteractionCheckResponse {
    pub conflicts: Vec<String>,
}

/// Reference information about a common medicine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Medicine {
    pub name: String,
    pub use_case: String,
    pub side_effects: String,
    pub precautions: String,
}
