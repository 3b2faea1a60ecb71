use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub const DEFAULT_STEPS_GOAL: i64 = 5000;
pub const DEFAULT_CALORIES_GOAL: i64 = 2000;

/// Daily goals for a user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Goals {
    pub steps_goal: i64,
    pub calories_goal: i64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            steps_goal: DEFAULT_STEPS_GOAL,
            calories_goal: DEFAULT_CALORIES_GOAL,
        }
    }
}

/// Request payload for updating goals
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct GoalsRequest {
    #[validate(range(min = 100, message = "Steps goal must be at least 100"))]
    pub steps_goal: i64,

    #[validate(range(min = 100, message = "Calories goal must be at least 100"))]
    pub calories_goal: i64,
}

/// Progress towards today's goals from the latest fitness record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct GoalProgress {
    pub steps: i64,
    pub steps_goal: i64,
    /// Capped at 100
    pub steps_percent: i64,
    pub calories: i64,
    pub calories_goal: i64,
}
