use std::sync::Arc;

use tracing::{info, warn};

use health_tracker_data::models::NewUser;
use health_tracker_data::repository::UserRepositoryTrait;

use crate::auth::logging::{log_account_deletion, log_registration};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::UserInfo;
use crate::entities::conversions;
use crate::entities::{RegistrationRequest, Role, User};
use crate::services::errors::{map_repo_error, validate, ServiceError};

/// Confirmation phrase required to delete an account
pub const DELETE_CONFIRMATION: &str = "DELETE";

/// Demo accounts created by [`UserService::seed_demo_users`]
pub const DEMO_DOCTOR: (&str, &str) = ("doctor@example.com", "doctor123");
pub const DEMO_PATIENT: (&str, &str) = ("patient@example.com", "patient123");
pub const DEMO_CAREGIVER: (&str, &str) = ("caregiver@example.com", "caregiver123");

/// Accounts, credentials and role assignments
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepositoryTrait>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepositoryTrait>) -> Self {
        Self { repository }
    }

    async fn user_with_role(&self, id: i64, role: Role) -> Result<Option<User>, ServiceError> {
        let found = self.repository.get_by_id(id).await.map_err(map_repo_error)?;
        match found {
            Some(record) if record.role == role.as_str() => {
                conversions::convert_to_domain_user(record)
                    .map(Some)
                    .map_err(ServiceError::RepositoryError)
            }
            _ => Ok(None),
        }
    }

    /// Register a new account
    pub async fn register(&self, request: RegistrationRequest) -> Result<User, ServiceError> {
        let email = request.email.trim().to_lowercase();
        let request = RegistrationRequest { email, ..request };
        validate(&request)?;

        let role: Role = request.role.parse().map_err(ServiceError::ValidationError)?;

        let (doctor_id, patient_id) = match role {
            Role::Patient => {
                if let Some(doctor_id) = request.doctor_id {
                    if self.user_with_role(doctor_id, Role::Doctor).await?.is_none() {
                        return Err(ServiceError::ValidationError(format!("Doctor {} does not exist", doctor_id)));
                    }
                }
                (request.doctor_id, None)
            }
            Role::Caregiver => {
                let patient_id = request.patient_id.ok_or_else(|| {
                    ServiceError::ValidationError("Caregivers must name the patient they look after".to_string())
                })?;
                if self.user_with_role(patient_id, Role::Patient).await?.is_none() {
                    return Err(ServiceError::ValidationError(format!("Patient {} does not exist", patient_id)));
                }
                (None, Some(patient_id))
            }
            Role::Doctor => (None, None),
        };

        let record = self
            .repository
            .create(NewUser {
                name: request.name.trim().to_string(),
                email: request.email.clone(),
                phone: request.phone.filter(|p| !p.trim().is_empty()),
                password_hash: hash_password(&request.password)?,
                role: role.as_str().to_string(),
                doctor_id,
                patient_id,
            })
            .await
            .map_err(|e| match map_repo_error(e) {
                ServiceError::Conflict(_) => ServiceError::Conflict("Email already registered".to_string()),
                other => other,
            });

        match record {
            Ok(record) => {
                log_registration(&request.email, role, true, None);
                conversions::convert_to_domain_user(record).map_err(ServiceError::RepositoryError)
            }
            Err(e) => {
                log_registration(&request.email, role, false, Some(&e.to_string()));
                Err(e)
            }
        }
    }

    /// Check credentials. Every failure is reported as [`ServiceError::InvalidCredentials`].
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let email = email.trim().to_lowercase();

        let record = self
            .repository
            .get_by_email(&email)
            .await
            .map_err(map_repo_error)?
            .ok_or(ServiceError::InvalidCredentials)?;

        match verify_password(password, &record.password_hash) {
            Ok(true) => conversions::convert_to_domain_user(record).map_err(ServiceError::RepositoryError),
            Ok(false) => Err(ServiceError::InvalidCredentials),
            Err(e) => {
                warn!("Stored password hash for user {} is unreadable: {}", record.id, e);
                Err(ServiceError::InvalidCredentials)
            }
        }
    }

    pub async fn get(&self, id: i64) -> Result<User, ServiceError> {
        let record = self
            .repository
            .get_by_id(id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))?;

        conversions::convert_to_domain_user(record).map_err(ServiceError::RepositoryError)
    }

    /// Patients assigned to the acting doctor
    pub async fn patients_of_doctor(&self, actor: &UserInfo) -> Result<Vec<User>, ServiceError> {
        if actor.role != Role::Doctor {
            return Err(ServiceError::Forbidden("Only doctors have assigned patients".to_string()));
        }

        self.repository
            .patients_of_doctor(actor.user_id)
            .await
            .map_err(map_repo_error)?
            .into_iter()
            .map(|r| conversions::convert_to_domain_user(r).map_err(ServiceError::RepositoryError))
            .collect()
    }

    /// Delete the actor's account and everything recorded for it
    pub async fn delete_account(&self, actor: &UserInfo, confirmation: &str) -> Result<(), ServiceError> {
        if confirmation != DELETE_CONFIRMATION {
            return Err(ServiceError::ValidationError(format!(
                "Type {} to confirm account deletion",
                DELETE_CONFIRMATION
            )));
        }

        let removed = self
            .repository
            .delete_with_related(actor.user_id)
            .await
            .map_err(map_repo_error)?;

        if !removed {
            return Err(ServiceError::NotFound(format!("User {} not found", actor.user_id)));
        }

        log_account_deletion(&actor.user_id.to_string());
        Ok(())
    }

    async fn ensure_demo_user(
        &self,
        (email, password): (&str, &str),
        name: &str,
        role: Role,
        doctor_id: Option<i64>,
        patient_id: Option<i64>,
        created: &mut Vec<String>,
    ) -> Result<i64, ServiceError> {
        if let Some(existing) = self.repository.get_by_email(email).await.map_err(map_repo_error)? {
            return Ok(existing.id);
        }

        let record = self
            .repository
            .create(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                phone: None,
                password_hash: hash_password(password)?,
                role: role.as_str().to_string(),
                doctor_id,
                patient_id,
            })
            .await
            .map_err(map_repo_error)?;

        created.push(email.to_string());
        Ok(record.id)
    }

    /// Create the demo doctor, patient and caregiver if they are missing.
    ///
    /// Returns the emails that were created by this call.
    pub async fn seed_demo_users(&self) -> Result<Vec<String>, ServiceError> {
        let mut created = Vec::new();

        let doctor_id = self
            .ensure_demo_user(DEMO_DOCTOR, "Dr. Demo", Role::Doctor, None, None, &mut created)
            .await?;
        let patient_id = self
            .ensure_demo_user(DEMO_PATIENT, "Demo Patient", Role::Patient, Some(doctor_id), None, &mut created)
            .await?;
        self.ensure_demo_user(DEMO_CAREGIVER, "Demo Caregiver", Role::Caregiver, None, Some(patient_id), &mut created)
            .await?;

        if !created.is_empty() {
            info!("Seeded demo users: {:?}", created);
        }
        Ok(created)
    }
}
