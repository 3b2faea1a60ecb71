use std::sync::Arc;

use health_tracker_data::repository::{FitnessRepositoryTrait, GoalRepositoryTrait};

use crate::entities::{GoalProgress, Goals, GoalsRequest};
use crate::services::errors::{map_repo_error, validate, ServiceError};

/// Daily step and calorie goals
pub struct GoalService<R: GoalRepositoryTrait> {
    repository: R,
    fitness: Arc<dyn FitnessRepositoryTrait>,
}

impl<R: GoalRepositoryTrait> GoalService<R> {
    pub fn new(repository: R, fitness: Arc<dyn FitnessRepositoryTrait>) -> Self {
        Self { repository, fitness }
    }

    /// Stored goals, or the defaults when none were set
    pub async fn get(&self, user_id: i64) -> Result<Goals, ServiceError> {
        let goals = self
            .repository
            .get(user_id)
            .await
            .map_err(map_repo_error)?
            .map(|g| Goals {
                steps_goal: g.steps_goal,
                calories_goal: g.calories_goal,
            })
            .unwrap_or_default();

        Ok(goals)
    }

    pub async fn set(&self, user_id: i64, request: GoalsRequest) -> Result<Goals, ServiceError> {
        validate(&request)?;

        let stored = self
            .repository
            .upsert(user_id, request.steps_goal, request.calories_goal)
            .await
            .map_err(map_repo_error)?;

        Ok(Goals {
            steps_goal: stored.steps_goal,
            calories_goal: stored.calories_goal,
        })
    }

    /// Progress of the latest fitness record against the goals
    pub async fn progress(&self, user_id: i64) -> Result<GoalProgress, ServiceError> {
        let goals = self.get(user_id).await?;
        let latest = self
            .fitness
            .latest(user_id)
            .await
            .map_err(map_repo_error)?;

        let (steps, calories) = latest.map(|r| (r.steps, r.calories)).unwrap_or((0, 0));

        Ok(GoalProgress {
            steps,
            steps_goal: goals.steps_goal,
            steps_percent: (steps.saturating_mul(100) / goals.steps_goal.max(1)).clamp(0, 100),
            calories,
            calories_goal: goals.calories_goal,
        })
    }
}
