use std::sync::Arc;

use tracing::debug;

use health_tracker_data::models::NewSymptom;
use health_tracker_data::repository::SymptomRepositoryTrait;

use crate::auth::UserInfo;
use crate::entities::conversions;
use crate::entities::{Symptom, SymptomRequest};
use crate::services::access::AccessControl;
use crate::services::errors::{map_repo_error, validate, ServiceError};

/// How many symptoms `recent` returns
pub const RECENT_SYMPTOMS: usize = 5;

/// Symptom log kept by patients
#[derive(Clone)]
pub struct SymptomService {
    repository: Arc<dyn SymptomRepositoryTrait>,
    access: AccessControl,
}

impl SymptomService {
    pub fn new(repository: Arc<dyn SymptomRepositoryTrait>, access: AccessControl) -> Self {
        Self { repository, access }
    }

    pub async fn record(&self, actor: &UserInfo, request: SymptomRequest) -> Result<Symptom, ServiceError> {
        self.access.ensure_self(actor, actor.user_id)?;
        validate(&request)?;

        let stored = self
            .repository
            .add(NewSymptom {
                user_id: actor.user_id,
                symptom: request.symptom.trim().to_string(),
                severity: request.severity.as_str().to_string(),
            })
            .await
            .map_err(map_repo_error)?;

        debug!("Recorded symptom {} for user {}", stored.id, actor.user_id);
        conversions::convert_to_domain_symptom(stored).map_err(ServiceError::RepositoryError)
    }

    /// The latest symptoms of a patient, newest first
    pub async fn recent(&self, actor: &UserInfo, patient_id: i64) -> Result<Vec<Symptom>, ServiceError> {
        self.access.ensure_can_read(actor, patient_id).await?;

        self.repository
            .list_recent(patient_id, RECENT_SYMPTOMS)
            .await
            .map_err(map_repo_error)?
            .into_iter()
            .map(|r| conversions::convert_to_domain_symptom(r).map_err(ServiceError::RepositoryError))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Severity;
    use crate::services::access::tests::clinic;
    use health_tracker_data::database::create_in_memory_pool;
    use health_tracker_data::repository::SymptomRepository;

    fn headache(severity: Severity) -> SymptomRequest {
        SymptomRequest { symptom: "Headache".to_string(), severity }
    }

    #[tokio::test]
    async fn test_patient_records_and_caregiver_reads() {
        let c = clinic().await;
        let service = SymptomService::new(
            Arc::new(SymptomRepository::new(create_in_memory_pool().unwrap())),
            AccessControl::new(c.users.clone()),
        );

        for severity in [Severity::Mild, Severity::Moderate, Severity::Severe, Severity::Mild, Severity::Mild, Severity::Severe] {
            service.record(&c.patient, headache(severity)).await.unwrap();
        }

        let recent = service.recent(&c.caregiver, c.patient.user_id).await.unwrap();
        assert_eq!(recent.len(), RECENT_SYMPTOMS);
        assert_eq!(recent[0].severity, Severity::Severe);

        assert!(matches!(
            service.recent(&c.other_doctor, c.patient.user_id).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_only_patients_record_symptoms() {
        let c = clinic().await;
        let service = SymptomService::new(
            Arc::new(SymptomRepository::new(create_in_memory_pool().unwrap())),
            AccessControl::new(c.users.clone()),
        );

        assert!(matches!(service.record(&c.doctor, headache(Severity::Mild)).await, Err(ServiceError::Forbidden(_))));

        let empty = SymptomRequest { symptom: String::new(), severity: Severity::Mild };
        assert!(matches!(service.record(&c.patient, empty).await, Err(ServiceError::ValidationError(_))));
    }
}
