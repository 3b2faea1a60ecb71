use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::fitness::{FitnessRecord, NewFitnessRecord};
use super::errors::RepositoryError;

const FITNESS_COLUMNS: &str =
    "id, user_id, bmi, steps, sleep, calories, heart_rate, exercise, bp, date, created_at";

/// Repository trait for fitness records
#[async_trait]
pub trait FitnessRepositoryTrait: Send + Sync {
    /// Append a fitness record
    async fn add(&self, user_id: i64, record: NewFitnessRecord) -> Result<FitnessRecord, RepositoryError>;

    /// Overwrite the newest record for the user, inserting one when none exists
    async fn upsert_latest(&self, user_id: i64, record: NewFitnessRecord) -> Result<FitnessRecord, RepositoryError>;

    /// Newest record for the user
    async fn latest(&self, user_id: i64) -> Result<Option<FitnessRecord>, RepositoryError>;

    /// Up to `limit` records for the user, newest first
    async fn list_for_user(&self, user_id: i64, limit: usize) -> Result<Vec<FitnessRecord>, RepositoryError>;
}

/// SQLite-backed fitness repository
#[derive(Debug, Clone)]
pub struct FitnessRepository {
    pool: DatabasePool,
}

impl FitnessRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<FitnessRecord> {
        Ok(FitnessRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            bmi: row.get(2)?,
            steps: row.get(3)?,
            sleep: row.get(4)?,
            calories: row.get(5)?,
            heart_rate: row.get(6)?,
            exercise: row.get(7)?,
            bp: row.get(8)?,
            date: row.get(9)?,
            created_at: row.get(10)?,
        })
    }

    fn into_record(id: i64, user_id: i64, record: NewFitnessRecord, created_at: String) -> FitnessRecord {
        FitnessRecord {
            id,
            user_id,
            bmi: record.bmi,
            steps: record.steps,
            sleep: record.sleep,
            calories: record.calories,
            heart_rate: record.heart_rate,
            exercise: record.exercise,
            bp: record.bp,
            date: record.date,
            created_at,
        }
    }
}

#[async_trait]
impl FitnessRepositoryTrait for FitnessRepository {
    async fn add(&self, user_id: i64, record: NewFitnessRecord) -> Result<FitnessRecord, RepositoryError> {
        debug!("Storing fitness record for user {} on {}", user_id, record.date);

        let conn = self.pool.sqlite()?;
        let created_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO fitness_data (user_id, bmi, steps, sleep, calories, heart_rate, exercise, bp, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                user_id,
                record.bmi,
                record.steps,
                record.sleep,
                record.calories,
                record.heart_rate,
                record.exercise,
                record.bp,
                record.date,
                created_at,
            ],
        )?;

        Ok(Self::into_record(conn.last_insert_rowid(), user_id, record, created_at))
    }

    async fn upsert_latest(&self, user_id: i64, record: NewFitnessRecord) -> Result<FitnessRecord, RepositoryError> {
        let mut conn = self.pool.sqlite()?;
        // Lookup and write must not interleave with a concurrent add
        let tx = conn.transaction()?;

        let latest: Option<(i64, String)> = tx
            .query_row(
                "SELECT id, created_at FROM fitness_data WHERE user_id = ?1 ORDER BY date DESC, id DESC LIMIT 1",
                params![user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (id, created_at) = match latest {
            Some((id, created_at)) => {
                debug!("Updating latest fitness record {} for user {}", id, user_id);
                tx.execute(
                    "UPDATE fitness_data
                     SET bmi = ?1, steps = ?2, sleep = ?3, calories = ?4, heart_rate = ?5,
                         exercise = ?6, bp = ?7, date = ?8
                     WHERE id = ?9",
                    params![
                        record.bmi,
                        record.steps,
                        record.sleep,
                        record.calories,
                        record.heart_rate,
                        record.exercise,
                        record.bp,
                        record.date,
                        id,
                    ],
                )?;
                (id, created_at)
            }
            None => {
                debug!("No fitness record for user {}, inserting", user_id);
                let created_at = Utc::now().to_rfc3339();
                tx.execute(
                    "INSERT INTO fitness_data (user_id, bmi, steps, sleep, calories, heart_rate, exercise, bp, date, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        user_id,
                        record.bmi,
                        record.steps,
                        record.sleep,
                        record.calories,
                        record.heart_rate,
                        record.exercise,
                        record.bp,
                        record.date,
                        created_at,
                    ],
                )?;
                (tx.last_insert_rowid(), created_at)
            }
        };

        tx.commit()?;
        Ok(Self::into_record(id, user_id, record, created_at))
    }

    async fn latest(&self, user_id: i64) -> Result<Option<FitnessRecord>, RepositoryError> {
        let conn = self.pool.sqlite()?;
        let record = conn
            .query_row(
                &format!(
                    "SELECT {} FROM fitness_data WHERE user_id = ?1 ORDER BY date DESC, id DESC LIMIT 1",
                    FITNESS_COLUMNS
                ),
                params![user_id],
                Self::map_row,
            )
            .optional()?;

        Ok(record)
    }

    async fn list_for_user(&self, user_id: i64, limit: usize) -> Result<Vec<FitnessRecord>, RepositoryError> {
        let conn = self.pool.sqlite()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM fitness_data WHERE user_id = ?1 ORDER BY date DESC, id DESC LIMIT ?2",
            FITNESS_COLUMNS
        ))?;

        let records = stmt
            .query_map(params![user_id, limit as i64], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

/// Mock fitness repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Vector-backed implementation of [`FitnessRepositoryTrait`]
    #[derive(Debug, Default)]
    pub struct MockFitnessRepository {
        records: Mutex<Vec<FitnessRecord>>,
    }

    impl MockFitnessRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined records
        pub fn with_records(records: Vec<FitnessRecord>) -> Self {
            Self { records: Mutex::new(records) }
        }

        /// Build a record with the three metrics the risk and analytics rules read
        pub fn record(id: i64, user_id: i64, steps: i64, calories: i64, heart_rate: i64, date: &str) -> FitnessRecord {
            FitnessRecord {
                id,
                user_id,
                bmi: 0.0,
                steps,
                sleep: 0.0,
                calories,
                heart_rate,
                exercise: 0.0,
                bp: 0,
                date: date.to_string(),
                created_at: Utc::now().to_rfc3339(),
            }
        }

        fn sorted_for(&self, user_id: i64) -> Result<Vec<FitnessRecord>, RepositoryError> {
            let store = self.records.lock()?;
            let mut found: Vec<_> = store.iter().filter(|r| r.user_id == user_id).cloned().collect();
            found.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
            Ok(found)
        }
    }

    #[async_trait]
    impl FitnessRepositoryTrait for MockFitnessRepository {
        async fn add(&self, user_id: i64, record: NewFitnessRecord) -> Result<FitnessRecord, RepositoryError> {
            let mut store = self.records.lock()?;
            let id = store.iter().map(|r| r.id).max().unwrap_or(0) + 1;
            let stored = FitnessRepository::into_record(id, user_id, record, Utc::now().to_rfc3339());
            store.push(stored.clone());
            Ok(stored)
        }

        async fn upsert_latest(&self, user_id: i64, record: NewFitnessRecord) -> Result<FitnessRecord, RepositoryError> {
            let latest_id = self.sorted_for(user_id)?.first().map(|r| r.id);
            match latest_id {
                Some(id) => {
                    let mut store = self.records.lock()?;
                    match store.iter_mut().find(|r| r.id == id) {
                        Some(existing) => {
                            *existing = FitnessRepository::into_record(id, user_id, record, existing.created_at.clone());
                            Ok(existing.clone())
                        }
                        None => Err(RepositoryError::NotFound(format!("Fitness record {}", id))),
                    }
                }
                None => self.add(user_id, record).await,
            }
        }

        async fn latest(&self, user_id: i64) -> Result<Option<FitnessRecord>, RepositoryError> {
            Ok(self.sorted_for(user_id)?.into_iter().next())
        }

        async fn list_for_user(&self, user_id: i64, limit: usize) -> Result<Vec<FitnessRecord>, RepositoryError> {
            Ok(self.sorted_for(user_id)?.into_iter().take(limit).collect())
        }
    }
}
