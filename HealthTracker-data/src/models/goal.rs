use serde::{Deserialize, Serialize};

/// Stored daily goals for one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalRecord {
    pub user_id: i64,
    pub steps_goal: i64,
    pub calories_goal: i64,
    pub updated_at: String,
}
