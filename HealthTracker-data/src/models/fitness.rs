use serde::{Deserialize, Serialize};

/// Storage model for a self-reported fitness row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FitnessRecord {
    /// Row identifier
    pub id: i64,
    
    /// Owner of the record
    pub user_id: i64,
    
    /// Body mass index
    pub bmi: f64,
    
    /// Daily step count
    pub steps: i64,
    
    /// Hours of sleep
    pub sleep: f64,
    
    /// Calories consumed
    pub calories: i64,
    
    /// Resting heart rate in beats per minute
    pub heart_rate: i64,
    
    /// Exercise hours
    pub exercise: f64,
    
    /// Systolic blood pressure
    pub bp: i64,
    
    /// Day the metrics refer to (`YYYY-MM-DD`)
    pub date: String,
    
    /// Insertion timestamp (RFC 3339)
    pub created_at: String,
}

/// Input data for a fitness row
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewFitnessRecord {
    pub bmi: f64,
    pub steps: i64,
    pub sleep: f64,
    pub calories: i64,
    pub heart_rate: i64,
    pub exercise: f64,
    pub bp: i64,
    pub date: String,
}
