use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::medicine::{InteractionRecord, MedicineRecord};
use super::errors::RepositoryError;

/// Read-only access to the seeded medicine and drug interaction tables
#[async_trait]
pub trait ReferenceRepositoryTrait: Send + Sync {
    /// Case-insensitive exact match on medicine name
    async fn find_medicine(&self, name: &str) -> Result<Option<MedicineRecord>, RepositoryError>;

    /// All reference medicines ordered by name
    async fn list_medicines(&self) -> Result<Vec<MedicineRecord>, RepositoryError>;

    /// Reference interaction for a pair, in either order
    async fn find_interaction(&self, first: &str, second: &str) -> Result<Option<InteractionRecord>, RepositoryError>;
}

#[derive(Debug, Clone)]
pub struct ReferenceRepository {
    pool: DatabasePool,
}

impl ReferenceRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn map_medicine(row: &Row<'_>) -> rusqlite::Result<MedicineRecord> {
        Ok(MedicineRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            use_case: row.get(2)?,
            side_effects: row.get(3)?,
            precautions: row.get(4)?,
        })
    }
}

#[async_trait]
impl ReferenceRepositoryTrait for ReferenceRepository {
    async fn find_medicine(&self, name: &str) -> Result<Option<MedicineRecord>, RepositoryError> {
        debug!("Looking up reference medicine '{}'", name);

        let conn = self.pool.sqlite()?;
        let medicine = conn
            .query_row(
                "SELECT id, name, use_case, side_effects, precautions
                 FROM medicines WHERE LOWER(name) = LOWER(?1)",
                params![name.trim()],
                Self::map_medicine,
            )
            .optional()?;

        Ok(medicine)
    }

    async fn list_medicines(&self) -> Result<Vec<MedicineRecord>, RepositoryError> {
        let conn = self.pool.sqlite()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, use_case, side_effects, precautions FROM medicines ORDER BY name"
        )?;

        let medicines = stmt
            .query_map([], Self::map_medicine)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(medicines)
    }

    async fn find_interaction(&self, first: &str, second: &str) -> Result<Option<InteractionRecord>, RepositoryError> {
        let conn = self.pool.sqlite()?;
        let interaction = conn
            .query_row(
                "SELECT id, med1, med2, description FROM drug_interactions
                 WHERE (LOWER(med1) = LOWER(?1) AND LOWER(med2) = LOWER(?2))
                    OR (LOWER(med1) = LOWER(?2) AND LOWER(med2) = LOWER(?1))
                 LIMIT 1",
                params![first.trim(), second.trim()],
                |row| {
                    Ok(InteractionRecord {
                        id: row.get(0)?,
                        med1: row.get(1)?,
                        med2: row.get(2)?,
                        description: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_in_memory_pool;

    #[tokio::test]
    async fn test_seeded_medicines_are_listed() {
        let repo = ReferenceRepository::new(create_in_memory_pool().unwrap());
        let medicines = repo.list_medicines().await.unwrap();
        assert_eq!(medicines.len(), 10);
        assert!(medicines.iter().any(|m| m.name == "Dolo 650"));

        let found = repo.find_medicine("  paracetamol ").await.unwrap().unwrap();
        assert_eq!(found.name, "Paracetamol");
        assert!(repo.find_medicine("unobtainium").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_interaction_lookup_is_order_independent() {
        let repo = ReferenceRepository::new(create_in_memory_pool().unwrap());

        let forward = repo.find_interaction("aspirin", "ibuprofen").await.unwrap().unwrap();
        let reverse = repo.find_interaction("IBUPROFEN", "Aspirin").await.unwrap().unwrap();
        assert_eq!(forward.id, reverse.id);
        assert_eq!(forward.description, "Both can irritate stomach and increase bleeding risk.");

        assert!(repo.find_interaction("cetirizine", "ors").await.unwrap().is_none());
    }
}
