use serde::{Deserialize, Serialize};

/// Storage model for a recorded symptom
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomRecord {
    pub id: i64,
    pub user_id: i64,
    pub symptom: String,
    /// `mild`, `moderate` or `severe`
    pub severity: String,
    pub recorded_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSymptom {
    pub user_id: i64,
    pub symptom: String,
    pub severity: String,
}
