use std::sync::Arc;

use tracing::warn;

use health_tracker_data::models::UserRecord;
use health_tracker_data::repository::UserRepositoryTrait;

use crate::auth::UserInfo;
use crate::entities::Role;
use crate::services::errors::{map_repo_error, ServiceError};

/// Who may see or change a patient's records.
///
/// - reads: the patient, the patient's assigned doctor, or the caregiver
///   assigned to the patient
/// - medication writes: the assigned doctor only
/// - self-reported data (fitness, symptoms, goals): the patient only
#[derive(Clone)]
pub struct AccessControl {
    users: Arc<dyn UserRepositoryTrait>,
}

impl AccessControl {
    pub fn new(users: Arc<dyn UserRepositoryTrait>) -> Self {
        Self { users }
    }

    async fn patient(&self, patient_id: i64) -> Result<UserRecord, ServiceError> {
        self.users
            .get_by_id(patient_id)
            .await
            .map_err(map_repo_error)?
            .filter(|user| user.role == Role::Patient.as_str())
            .ok_or_else(|| ServiceError::NotFound(format!("Patient {} not found", patient_id)))
    }

    /// Ensure `actor` may read the records of `patient_id`
    pub async fn ensure_can_read(&self, actor: &UserInfo, patient_id: i64) -> Result<(), ServiceError> {
        let patient = self.patient(patient_id).await?;

        let allowed = match actor.role {
            Role::Patient => actor.user_id == patient.id,
            Role::Doctor => patient.doctor_id == Some(actor.user_id),
            Role::Caregiver => {
                let caregiver = self.users.get_by_id(actor.user_id).await.map_err(map_repo_error)?;
                caregiver.and_then(|c| c.patient_id) == Some(patient.id)
            }
        };

        if allowed {
            Ok(())
        } else {
            warn!("User {} ({}) denied read access to patient {}", actor.user_id, actor.role, patient_id);
            Err(ServiceError::Forbidden("Not allowed to view this patient's records".to_string()))
        }
    }

    /// Ensure `actor` is the doctor assigned to `patient_id`
    pub async fn ensure_assigned_doctor(&self, actor: &UserInfo, patient_id: i64) -> Result<(), ServiceError> {
        if actor.role != Role::Doctor {
            return Err(ServiceError::Forbidden("Only doctors can manage medications".to_string()));
        }

        let patient = self.patient(patient_id).await?;
        if patient.doctor_id == Some(actor.user_id) {
            Ok(())
        } else {
            warn!("Doctor {} is not assigned to patient {}", actor.user_id, patient_id);
            Err(ServiceError::Forbidden("Patient is not assigned to you".to_string()))
        }
    }

    /// Ensure `actor` is the patient writing their own data
    pub fn ensure_self(&self, actor: &UserInfo, patient_id: i64) -> Result<(), ServiceError> {
        if actor.role == Role::Patient && actor.user_id == patient_id {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("Only the patient can record their own data".to_string()))
        }
    }
}
