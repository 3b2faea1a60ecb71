use async_trait::async_trait;
use chrono::Utc;
use rusqlite::params;
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::symptom::{NewSymptom, SymptomRecord};
use super::errors::RepositoryError;

/// Repository trait for symptom entries
#[async_trait]
pub trait SymptomRepositoryTrait: Send + Sync {
    async fn add(&self, symptom: NewSymptom) -> Result<SymptomRecord, RepositoryError>;

    /// Up to `limit` entries for the user, newest first
    async fn list_recent(&self, user_id: i64, limit: usize) -> Result<Vec<SymptomRecord>, RepositoryError>;
}

#[derive(Debug, Clone)]
pub struct SymptomRepository {
    pool: DatabasePool,
}

impl SymptomRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SymptomRepositoryTrait for SymptomRepository {
    async fn add(&self, symptom: NewSymptom) -> Result<SymptomRecord, RepositoryError> {
        debug!("Recording symptom for user {}", symptom.user_id);

        let conn = self.pool.sqlite()?;
        let recorded_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO symptoms (user_id, symptom, severity, recorded_at) VALUES (?1, ?2, ?3, ?4)",
            params![symptom.user_id, symptom.symptom, symptom.severity, recorded_at],
        )?;

        Ok(SymptomRecord {
            id: conn.last_insert_rowid(),
            user_id: symptom.user_id,
            symptom: symptom.symptom,
            severity: symptom.severity,
            recorded_at,
        })
    }

    async fn list_recent(&self, user_id: i64, limit: usize) -> Result<Vec<SymptomRecord>, RepositoryError> {
        let conn = self.pool.sqlite()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, symptom, severity, recorded_at FROM symptoms
             WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2"
        )?;

        let symptoms = stmt
            .query_map(params![user_id, limit as i64], |row| {
                Ok(SymptomRecord {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    symptom: row.get(2)?,
                    severity: row.get(3)?,
                    recorded_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(symptoms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_in_memory_pool;

    #[tokio::test]
    async fn test_recent_symptoms_are_limited_and_newest_first() {
        let repo = SymptomRepository::new(create_in_memory_pool().unwrap());
        for i in 0..7 {
            repo.add(NewSymptom {
                user_id: 1,
                symptom: format!("headache {}", i),
                severity: "mild".to_string(),
            }).await.unwrap();
        }

        let recent = repo.list_recent(1, 5).await.unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].symptom, "headache 6");
    }

    #[tokio::test]
    async fn test_invalid_severity_is_rejected_by_schema() {
        let repo = SymptomRepository::new(create_in_memory_pool().unwrap());
        let result = repo.add(NewSymptom {
            user_id: 1,
            symptom: "fever".to_string(),
            severity: "extreme".to_string(),
        }).await;
        assert!(matches!(result, Err(RepositoryError::Sqlite(_))));
    }
}
