use serde::{Deserialize, Serialize};

/// Storage model for an account row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    /// Row identifier
    pub id: i64,
    
    /// Display name
    pub name: String,
    
    /// Lower-cased, unique email address
    pub email: String,
    
    /// Optional phone number
    pub phone: Option<String>,
    
    /// Encoded password hash (`salt:hash`, base64)
    pub password_hash: String,
    
    /// One of `patient`, `doctor` or `caregiver`
    pub role: String,
    
    /// Assigned doctor for patient accounts
    pub doctor_id: Option<i64>,
    
    /// Assigned patient for caregiver accounts
    pub patient_id: Option<i64>,
    
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

/// Input data for inserting a new account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub doctor_id: Option<i64>,
    pub patient_id: Option<i64>,
}
