use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Account role. Determines which patients' records a user may read or change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Owns fitness, symptom and goal records; reads own medications
    Patient,
    /// Manages medications for assigned patients
    Doctor,
    /// Read-only view of one assigned patient
    Caregiver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Caregiver => "caregiver",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            "caregiver" => Ok(Role::Caregiver),
            _ => Err("Invalid role. Must be patient, doctor, or caregiver".to_string()),
        }
    }
}

/// Public view of an account (no credentials)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    /// Assigned doctor (patients only)
    pub doctor_id: Option<i64>,
    /// Assigned patient (caregivers only)
    pub patient_id: Option<i64>,
    pub created_at: String,
}

/// Request payload for registering an account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RegistrationRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(email(message = "Email address is not valid"))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// `patient`, `doctor` or `caregiver`
    pub role: String,

    #[validate(length(max = 20, message = "Phone cannot exceed 20 characters"))]
    pub phone: Option<String>,

    /// Doctor to assign a patient to
    pub doctor_id: Option<i64>,

    /// Patient a caregiver looks after
    pub patient_id: Option<i64>,
}

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("Doctor".parse::<Role>().unwrap(), Role::Doctor);
        assert_eq!(" caregiver ".parse::<Role>().unwrap(), Role::Caregiver);
        assert_eq!(
            "admin".parse::<Role>().unwrap_err(),
            "Invalid role. Must be patient, doctor, or caregiver"
        );
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Patient).unwrap(), "\"patient\"");
    }
}
