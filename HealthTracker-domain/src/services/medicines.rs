use health_tracker_data::repository::ReferenceRepositoryTrait;

use crate::entities::conversions;
use crate::entities::Medicine;
use crate::services::errors::{map_repo_error, ServiceError};

/// Read-only lookups in the seeded medicine reference table
pub struct MedicineService<R: ReferenceRepositoryTrait> {
    repository: R,
}

impl<R: ReferenceRepositoryTrait> MedicineService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Case-insensitive lookup by exact name
    pub async fn lookup(&self, name: &str) -> Result<Medicine, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError("Medicine name is required".to_string()));
        }

        self.repository
            .find_medicine(name)
            .await
            .map_err(map_repo_error)?
            .map(conversions::convert_to_domain_medicine)
            .ok_or_else(|| ServiceError::NotFound(format!("No reference entry for '{}'", name)))
    }

    pub async fn list(&self) -> Result<Vec<Medicine>, ServiceError> {
        let medicines = self
            .repository
            .list_medicines()
            .await
            .map_err(map_repo_error)?
            .into_iter()
            .map(conversions::convert_to_domain_medicine)
            .collect();

        Ok(medicines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_tracker_data::database::create_in_memory_pool;
    use health_tracker_data::repository::ReferenceRepository;

    fn service() -> MedicineService<ReferenceRepository> {
        MedicineService::new(ReferenceRepository::new(create_in_memory_pool().unwrap()))
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let medicine = service().lookup("  PARACETAMOL ").await.unwrap();
        assert_eq!(medicine.name, "Paracetamol");
        assert!(!medicine.use_case.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_and_blank_names() {
        let service = service();
        assert!(matches!(service.lookup("unobtainium").await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.lookup(" ").await, Err(ServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_list_returns_seeded_entries() {
        assert_eq!(service().list().await.unwrap().len(), 10);
    }
}
