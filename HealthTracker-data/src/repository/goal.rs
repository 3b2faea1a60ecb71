use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::DatabasePool;
use crate::models::goal::GoalRecord;
use super::errors::RepositoryError;

/// Repository trait for per-user daily goals
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    async fn get(&self, user_id: i64) -> Result<Option<GoalRecord>, RepositoryError>;

    /// Insert or replace the user's goals
    async fn upsert(&self, user_id: i64, steps_goal: i64, calories_goal: i64) -> Result<GoalRecord, RepositoryError>;
}

#[derive(Debug, Clone)]
pub struct GoalRepository {
    pool: DatabasePool,
}

impl GoalRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    async fn get(&self, user_id: i64) -> Result<Option<GoalRecord>, RepositoryError> {
        let conn = self.pool.sqlite()?;
        let goals = conn
            .query_row(
                "SELECT user_id, steps_goal, calories_goal, updated_at FROM goals WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(GoalRecord {
                        user_id: row.get(0)?,
                        steps_goal: row.get(1)?,
                        calories_goal: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(goals)
    }

    async fn upsert(&self, user_id: i64, steps_goal: i64, calories_goal: i64) -> Result<GoalRecord, RepositoryError> {
        let conn = self.pool.sqlite()?;
        let updated_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO goals (user_id, steps_goal, calories_goal, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                steps_goal = excluded.steps_goal,
                calories_goal = excluded.calories_goal,
                updated_at = excluded.updated_at",
            params![user_id, steps_goal, calories_goal, updated_at],
        )?;

        Ok(GoalRecord { user_id, steps_goal, calories_goal, updated_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_in_memory_pool;

    #[tokio::test]
    async fn test_upsert_replaces_existing_goals() {
        let repo = GoalRepository::new(create_in_memory_pool().unwrap());
        assert!(repo.get(1).await.unwrap().is_none());

        repo.upsert(1, 6000, 1800).await.unwrap();
        repo.upsert(1, 8000, 2200).await.unwrap();

        let goals = repo.get(1).await.unwrap().unwrap();
        assert_eq!((goals.steps_goal, goals.calories_goal), (8000, 2200));
    }
}
