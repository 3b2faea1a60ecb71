use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Date used for fitness entries that do not name one
pub const DEFAULT_FITNESS_DATE: &str = "2025-01-01";

/// Dates are stored as `YYYY-MM-DD` so that text ordering is date ordering.
/// A blank date is replaced when the entry is stored.
pub fn validate_fitness_date(date: &str) -> Result<(), ValidationError> {
    if date.trim().is_empty() {
        return Ok(());
    }

    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        // chrono accepts unpadded fields; only the zero-padded form sorts correctly
        Ok(parsed) if parsed.format("%Y-%m-%d").to_string() == date => Ok(()),
        _ => {
            let mut error = ValidationError::new("date");
            error.message = Some(Cow::Owned(format!("Date '{}' must use the YYYY-MM-DD format", date)));
            Err(error)
        }
    }
}

/// Domain model for a fitness record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct FitnessRecord {
    /// Row id; 0 for the zero record returned when nothing was logged
    pub id: i64,
    pub user_id: i64,
    pub bmi: f64,
    pub steps: i64,
    /// Hours of sleep
    pub sleep: f64,
    pub calories: i64,
    pub heart_rate: i64,
    /// Hours of exercise
    pub exercise: f64,
    /// Systolic blood pressure
    pub bp: i64,
    pub date: String,
}

impl FitnessRecord {
    /// All-zero record used when a user has not logged anything yet
    pub fn empty(user_id: i64) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }
}

/// Request payload for a fitness entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct FitnessEntry {
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "BMI must be between 0 and 100"))]
    pub bmi: f64,

    #[serde(default)]
    #[validate(range(min = 0, max = 200000, message = "Steps must be between 0 and 200000"))]
    pub steps: i64,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 24.0, message = "Sleep must be between 0 and 24 hours"))]
    pub sleep: f64,

    #[serde(default)]
    #[validate(range(min = 0, max = 20000, message = "Calories must be between 0 and 20000"))]
    pub calories: i64,

    #[serde(default)]
    #[validate(range(min = 0, max = 250, message = "Heart rate must be between 0 and 250"))]
    pub heart_rate: i64,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 24.0, message = "Exercise must be between 0 and 24 hours"))]
    pub exercise: f64,

    #[serde(default)]
    #[validate(range(min = 0, max = 300, message = "Blood pressure must be between 0 and 300"))]
    pub bp: i64,

    /// `YYYY-MM-DD`; defaults to today
    #[validate(custom = "validate_fitness_date")]
    pub date: Option<String>,
}

/// Result of a CSV import
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ImportSummary {
    pub imported: usize,
}
