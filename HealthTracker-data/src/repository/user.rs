use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

use crate::database::DatabasePool;
use crate::models::user::{NewUser, UserRecord};
use super::errors::RepositoryError;

const USER_COLUMNS: &str =
    "id, name, email, phone, password_hash, role, doctor_id, patient_id, created_at";

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Insert a new account; a duplicate email yields [`RepositoryError::Conflict`]
    async fn create(&self, user: NewUser) -> Result<UserRecord, RepositoryError>;

    /// Find an account by (lower-cased) email
    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// Find an account by id
    async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepositoryError>;

    /// All patients assigned to a doctor
    async fn patients_of_doctor(&self, doctor_id: i64) -> Result<Vec<UserRecord>, RepositoryError>;

    /// Delete an account with its medications, fitness, goals and symptoms.
    /// Returns false when the account did not exist.
    async fn delete_with_related(&self, user_id: i64) -> Result<bool, RepositoryError>;
}

/// SQLite-backed user repository
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: DatabasePool,
}

impl UserRepository {
    /// Create a repository over an existing pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
        Ok(UserRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            password_hash: row.get(4)?,
            role: row.get(5)?,
            doctor_id: row.get(6)?,
            patient_id: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, user: NewUser) -> Result<UserRecord, RepositoryError> {
        debug!("Creating user account: email={}, role={}", user.email, user.role);

        let conn = self.pool.sqlite()?;
        let created_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO users (name, email, phone, password_hash, role, doctor_id, patient_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.name,
                user.email,
                user.phone,
                user.password_hash,
                user.role,
                user.doctor_id,
                user.patient_id,
                created_at,
            ],
        ).map_err(|e| RepositoryError::from_insert(e, "Email"))?;

        Ok(UserRecord {
            id: conn.last_insert_rowid(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
            role: user.role,
            doctor_id: user.doctor_id,
            patient_id: user.patient_id,
            created_at,
        })
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let conn = self.pool.sqlite()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                params![email],
                Self::map_row,
            )
            .optional()?;

        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepositoryError> {
        let conn = self.pool.sqlite()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;

        Ok(user)
    }

    async fn patients_of_doctor(&self, doctor_id: i64) -> Result<Vec<UserRecord>, RepositoryError> {
        let conn = self.pool.sqlite()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users WHERE role = 'patient' AND doctor_id = ?1 ORDER BY name",
            USER_COLUMNS
        ))?;

        let patients = stmt
            .query_map(params![doctor_id], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(patients)
    }

    async fn delete_with_related(&self, user_id: i64) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.sqlite()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM medications WHERE user_id = ?1", params![user_id])?;
        tx.execute("DELETE FROM fitness_data WHERE user_id = ?1", params![user_id])?;
        tx.execute("DELETE FROM goals WHERE user_id = ?1", params![user_id])?;
        tx.execute("DELETE FROM symptoms WHERE user_id = ?1", params![user_id])?;
        let removed = tx.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;

        tx.commit()?;

        if removed > 0 {
            info!("Deleted user {} and related records", user_id);
        }
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_in_memory_pool;

    fn new_user(email: &str, role: &str, doctor_id: Option<i64>) -> NewUser {
        NewUser {
            name: "Test".to_string(),
            email: email.to_string(),
            phone: None,
            password_hash: "salt:hash".to_string(),
            role: role.to_string(),
            doctor_id,
            patient_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = UserRepository::new(create_in_memory_pool().unwrap());
        let created = repo.create(new_user("a@example.com", "patient", None)).await.unwrap();

        let by_email = repo.get_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@example.com");

        assert!(repo.get_by_email("missing@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let repo = UserRepository::new(create_in_memory_pool().unwrap());
        repo.create(new_user("dup@example.com", "doctor", None)).await.unwrap();

        let err = repo.create(new_user("dup@example.com", "patient", None)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_patients_of_doctor_filters_role_and_assignment() {
        let repo = UserRepository::new(create_in_memory_pool().unwrap());
        let doctor = repo.create(new_user("doc@example.com", "doctor", None)).await.unwrap();
        repo.create(new_user("p1@example.com", "patient", Some(doctor.id))).await.unwrap();
        repo.create(new_user("p2@example.com", "patient", None)).await.unwrap();
        repo.create(new_user("c1@example.com", "caregiver", Some(doctor.id))).await.unwrap();

        let patients = repo.patients_of_doctor(doctor.id).await.unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].email, "p1@example.com");
    }

    #[tokio::test]
    async fn test_delete_with_related_removes_rows() {
        let pool = create_in_memory_pool().unwrap();
        let repo = UserRepository::new(pool.clone());
        let user = repo.create(new_user("gone@example.com", "patient", None)).await.unwrap();

        {
            let conn = pool.sqlite().unwrap();
            conn.execute(
                "INSERT INTO medications (user_id, med_name, schedule, created_at) VALUES (?1, 'Aspirin', 'daily', 'now')",
                params![user.id],
            ).unwrap();
        }

        assert!(repo.delete_with_related(user.id).await.unwrap());
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());

        let conn = pool.sqlite().unwrap();
        let meds: i64 = conn
            .query_row("SELECT COUNT(*) FROM medications WHERE user_id = ?1", params![user.id], |r| r.get(0))
            .unwrap();
        assert_eq!(meds, 0);
        drop(conn);

        assert!(!repo.delete_with_related(user.id).await.unwrap());
    }
}
