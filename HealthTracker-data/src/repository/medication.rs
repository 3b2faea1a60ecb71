use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::medication::{MedicationRecord, NewMedication};
use super::errors::RepositoryError;

const MEDICATION_COLUMNS: &str = "id, user_id, med_name, schedule, notes, created_by, created_at";

/// Repository trait for medication entries
#[async_trait]
pub trait MedicationRepositoryTrait: Send + Sync {
    /// Add a medication entry
    async fn add(&self, medication: NewMedication) -> Result<MedicationRecord, RepositoryError>;

    /// Update name, schedule and notes; returns true when a row changed
    async fn update(
        &self,
        id: i64,
        med_name: &str,
        schedule: &str,
        notes: Option<&str>,
    ) -> Result<bool, RepositoryError>;

    /// Delete an entry; returns true when a row was removed
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;

    /// Get a single entry
    async fn get_by_id(&self, id: i64) -> Result<Option<MedicationRecord>, RepositoryError>;

    /// All entries for a user, newest first
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<MedicationRecord>, RepositoryError>;

    /// Entries for a user whose name contains `term` (case-insensitive)
    async fn search_for_user(&self, user_id: i64, term: &str) -> Result<Vec<MedicationRecord>, RepositoryError>;
}

/// SQLite-backed medication repository
#[derive(Debug, Clone)]
pub struct MedicationRepository {
    pool: DatabasePool,
}

impl MedicationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<MedicationRecord> {
        Ok(MedicationRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            med_name: row.get(2)?,
            schedule: row.get(3)?,
            notes: row.get(4)?,
            created_by: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

#[async_trait]
impl MedicationRepositoryTrait for MedicationRepository {
    async fn add(&self, medication: NewMedication) -> Result<MedicationRecord, RepositoryError> {
        debug!("Adding medication '{}' for user {}", medication.med_name, medication.user_id);

        let conn = self.pool.sqlite()?;
        let created_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO medications (user_id, med_name, schedule, notes, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                medication.user_id,
                medication.med_name,
                medication.schedule,
                medication.notes,
                medication.created_by,
                created_at,
            ],
        )?;

        Ok(MedicationRecord {
            id: conn.last_insert_rowid(),
            user_id: medication.user_id,
            med_name: medication.med_name,
            schedule: medication.schedule,
            notes: medication.notes,
            created_by: medication.created_by,
            created_at,
        })
    }

    async fn update(
        &self,
        id: i64,
        med_name: &str,
        schedule: &str,
        notes: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        debug!("Updating medication {}", id);

        let conn = self.pool.sqlite()?;
        let changed = conn.execute(
            "UPDATE medications SET med_name = ?1, schedule = ?2, notes = ?3 WHERE id = ?4",
            params![med_name, schedule, notes, id],
        )?;

        Ok(changed > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        debug!("Deleting medication {}", id);

        let conn = self.pool.sqlite()?;
        let removed = conn.execute("DELETE FROM medications WHERE id = ?1", params![id])?;

        Ok(removed > 0)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<MedicationRecord>, RepositoryError> {
        let conn = self.pool.sqlite()?;
        let medication = conn
            .query_row(
                &format!("SELECT {} FROM medications WHERE id = ?1", MEDICATION_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;

        Ok(medication)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<MedicationRecord>, RepositoryError> {
        let conn = self.pool.sqlite()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM medications WHERE user_id = ?1 ORDER BY id DESC",
            MEDICATION_COLUMNS
        ))?;

        let medications = stmt
            .query_map(params![user_id], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(medications)
    }

    async fn search_for_user(&self, user_id: i64, term: &str) -> Result<Vec<MedicationRecord>, RepositoryError> {
        let pattern = format!("%{}%", term.to_lowercase());

        let conn = self.pool.sqlite()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM medications WHERE user_id = ?1 AND LOWER(med_name) LIKE ?2 ORDER BY id DESC",
            MEDICATION_COLUMNS
        ))?;

        let medications = stmt
            .query_map(params![user_id, pattern], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(medications)
    }
}

/// Mock medication repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Vector-backed implementation of [`MedicationRepositoryTrait`]
    #[derive(Debug, Default)]
    pub struct MockMedicationRepository {
        medications: Mutex<Vec<MedicationRecord>>,
    }

    impl MockMedicationRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined entries
        pub fn with_medications(medications: Vec<MedicationRecord>) -> Self {
            Self { medications: Mutex::new(medications) }
        }

        /// Build a record for fixtures
        pub fn record(id: i64, user_id: i64, med_name: &str, schedule: &str) -> MedicationRecord {
            MedicationRecord {
                id,
                user_id,
                med_name: med_name.to_string(),
                schedule: schedule.to_string(),
                notes: None,
                created_by: None,
                created_at: Utc::now().to_rfc3339(),
            }
        }
    }

    #[async_trait]
    impl MedicationRepositoryTrait for MockMedicationRepository {
        async fn add(&self, medication: NewMedication) -> Result<MedicationRecord, RepositoryError> {
            let mut store = self.medications.lock()?;
            let id = store.iter().map(|m| m.id).max().unwrap_or(0) + 1;
            let record = MedicationRecord {
                id,
                user_id: medication.user_id,
                med_name: medication.med_name,
                schedule: medication.schedule,
                notes: medication.notes,
                created_by: medication.created_by,
                created_at: Utc::now().to_rfc3339(),
            };
            store.push(record.clone());
            Ok(record)
        }

        async fn update(
            &self,
            id: i64,
            med_name: &str,
            schedule: &str,
            notes: Option<&str>,
        ) -> Result<bool, RepositoryError> {
            let mut store = self.medications.lock()?;
            match store.iter_mut().find(|m| m.id == id) {
                Some(existing) => {
                    existing.med_name = med_name.to_string();
                    existing.schedule = schedule.to_string();
                    existing.notes = notes.map(str::to_string);
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
            let mut store = self.medications.lock()?;
            let before = store.len();
            store.retain(|m| m.id != id);
            Ok(store.len() != before)
        }

        async fn get_by_id(&self, id: i64) -> Result<Option<MedicationRecord>, RepositoryError> {
            let store = self.medications.lock()?;
            Ok(store.iter().find(|m| m.id == id).cloned())
        }

        async fn list_for_user(&self, user_id: i64) -> Result<Vec<MedicationRecord>, RepositoryError> {
            let store = self.medications.lock()?;
            let mut found: Vec<_> = store.iter().filter(|m| m.user_id == user_id).cloned().collect();
            found.sort_by(|a, b| b.id.cmp(&a.id));
            Ok(found)
        }

        async fn search_for_user(&self, user_id: i64, term: &str) -> Result<Vec<MedicationRecord>, RepositoryError> {
            let term = term.to_lowercase();
            Ok(self
                .list_for_user(user_id)
                .await?
                .into_iter()
                .filter(|m| m.med_name.to_lowercase().contains(&term))
                .collect())
        }
    }
}
