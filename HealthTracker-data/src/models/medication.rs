use serde::{Deserialize, Serialize};

/// Storage model for a medication entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationRecord {
    pub id: i64,
    /// Patient the medication belongs to
    pub user_id: i64,
    pub med_name: String,
    /// Free-text dosing schedule, e.g. "1 tablet after breakfast"
    pub schedule: String,
    pub notes: Option<String>,
    /// Doctor who prescribed the entry, when known
    pub created_by: Option<i64>,
    pub created_at: String,
}

/// Input data for adding a medication entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedication {
    pub user_id: i64,
    pub med_name: String,
    pub schedule: String,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
}
