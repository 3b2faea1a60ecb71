use std::sync::Arc;

use tracing::info;

use health_tracker_data::models::NewMedication;
use health_tracker_data::repository::MedicationRepositoryTrait;

use crate::auth::UserInfo;
use crate::entities::conversions;
use crate::entities::{Medication, MedicationRequest};
use crate::services::access::AccessControl;
use crate::services::errors::{map_repo_error, validate, ServiceError};

/// Trim every field and drop blank notes, so validation sees the stored values
fn normalize(request: MedicationRequest) -> MedicationRequest {
    MedicationRequest {
        med_name: request.med_name.trim().to_string(),
        schedule: request.schedule.trim().to_string(),
        notes: request
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
    }
}

/// Medication tracking with per-patient access rules
#[derive(Clone)]
pub struct MedicationService {
    repository: Arc<dyn MedicationRepositoryTrait>,
    access: AccessControl,
}

impl MedicationService {
    pub fn new(repository: Arc<dyn MedicationRepositoryTrait>, access: AccessControl) -> Self {
        Self { repository, access }
    }

    async fn existing(&self, id: i64) -> Result<Medication, ServiceError> {
        self.repository
            .get_by_id(id)
            .await
            .map_err(map_repo_error)?
            .map(conversions::convert_to_domain_medication)
            .ok_or_else(|| ServiceError::NotFound(format!("Medication {} not found", id)))
    }

    /// Medications of `patient_id`, newest first
    pub async fn list(&self, actor: &UserInfo, patient_id: i64) -> Result<Vec<Medication>, ServiceError> {
        self.access.ensure_can_read(actor, patient_id).await?;

        let medications = self
            .repository
            .list_for_user(patient_id)
            .await
            .map_err(map_repo_error)?
            .into_iter()
            .map(conversions::convert_to_domain_medication)
            .collect();

        Ok(medications)
    }

    /// Add a medication for a patient; the acting doctor is recorded as creator
    pub async fn add(
        &self,
        actor: &UserInfo,
        patient_id: i64,
        request: MedicationRequest,
    ) -> Result<Medication, ServiceError> {
        let request = normalize(request);
        validate(&request)?;
        self.access.ensure_assigned_doctor(actor, patient_id).await?;

        let record = self
            .repository
            .add(NewMedication {
                user_id: patient_id,
                med_name: request.med_name,
                schedule: request.schedule,
                notes: request.notes,
                created_by: Some(actor.user_id),
            })
            .await
            .map_err(map_repo_error)?;

        info!("Doctor {} added medication {} for patient {}", actor.user_id, record.id, patient_id);
        Ok(conversions::convert_to_domain_medication(record))
    }

    pub async fn update(
        &self,
        actor: &UserInfo,
        id: i64,
        request: MedicationRequest,
    ) -> Result<Medication, ServiceError> {
        let request = normalize(request);
        validate(&request)?;
        let current = self.existing(id).await?;
        self.access.ensure_assigned_doctor(actor, current.user_id).await?;

        let changed = self
            .repository
            .update(id, &request.med_name, &request.schedule, request.notes.as_deref())
            .await
            .map_err(map_repo_error)?;

        if !changed {
            return Err(ServiceError::NotFound(format!("Medication {} not found", id)));
        }

        self.existing(id).await
    }

    pub async fn delete(&self, actor: &UserInfo, id: i64) -> Result<(), ServiceError> {
        let current = self.existing(id).await?;
        self.access.ensure_assigned_doctor(actor, current.user_id).await?;

        if !self.repository.delete(id).await.map_err(map_repo_error)? {
            return Err(ServiceError::NotFound(format!("Medication {} not found", id)));
        }

        info!("Doctor {} deleted medication {}", actor.user_id, id);
        Ok(())
    }
}
