use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use health_tracker_data::repository::FitnessRepositoryTrait;

use crate::auth::UserInfo;
use crate::entities::conversions;
use crate::entities::fitness::DEFAULT_FITNESS_DATE;
use crate::entities::{FitnessEntry, FitnessRecord, ImportSummary};
use crate::services::access::AccessControl;
use crate::services::errors::{map_repo_error, validate, ServiceError};

const CSV_COLUMNS: [&str; 9] = [
    "user_id", "date", "steps", "calories", "heart_rate", "bmi", "sleep", "exercise", "bp",
];

/// Self-reported fitness data
#[derive(Clone)]
pub struct FitnessService {
    repository: Arc<dyn FitnessRepositoryTrait>,
    access: AccessControl,
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

impl FitnessService {
    pub fn new(repository: Arc<dyn FitnessRepositoryTrait>, access: AccessControl) -> Self {
        Self { repository, access }
    }

    /// Append a record for the acting patient
    pub async fn record(
        &self,
        actor: &UserInfo,
        patient_id: i64,
        entry: FitnessEntry,
    ) -> Result<FitnessRecord, ServiceError> {
        self.access.ensure_self(actor, patient_id)?;
        validate(&entry)?;

        let stored = self
            .repository
            .add(patient_id, conversions::convert_to_data_fitness(&entry, &today()))
            .await
            .map_err(map_repo_error)?;

        debug!("Recorded fitness entry {} for user {}", stored.id, patient_id);
        Ok(conversions::convert_to_domain_fitness(stored))
    }

    /// Overwrite the newest record, creating one when none exists
    pub async fn update_latest(
        &self,
        actor: &UserInfo,
        patient_id: i64,
        entry: FitnessEntry,
    ) -> Result<FitnessRecord, ServiceError> {
        self.access.ensure_self(actor, patient_id)?;
        validate(&entry)?;

        let stored = self
            .repository
            .upsert_latest(patient_id, conversions::convert_to_data_fitness(&entry, &today()))
            .await
            .map_err(map_repo_error)?;

        Ok(conversions::convert_to_domain_fitness(stored))
    }

    /// Newest record, or an all-zero record when nothing was logged
    pub async fn latest(&self, actor: &UserInfo, patient_id: i64) -> Result<FitnessRecord, ServiceError> {
        self.access.ensure_can_read(actor, patient_id).await?;
        self.own_latest(patient_id).await
    }

    /// Caller's own newest record, whatever their role
    pub async fn own_latest(&self, user_id: i64) -> Result<FitnessRecord, ServiceError> {
        let latest = self
            .repository
            .latest(user_id)
            .await
            .map_err(map_repo_error)?
            .map(conversions::convert_to_domain_fitness)
            .unwrap_or_else(|| FitnessRecord::empty(user_id));

        Ok(latest)
    }

    pub async fn history(
        &self,
        actor: &UserInfo,
        patient_id: i64,
        limit: usize,
    ) -> Result<Vec<FitnessRecord>, ServiceError> {
        self.access.ensure_can_read(actor, patient_id).await?;

        let records = self
            .repository
            .list_for_user(patient_id, limit)
            .await
            .map_err(map_repo_error)?
            .into_iter()
            .map(conversions::convert_to_domain_fitness)
            .collect();

        Ok(records)
    }

    /// Import comma-separated rows for the acting patient.
    ///
    /// Every row is parsed and validated before anything is written.
    pub async fn import_csv(&self, actor: &UserInfo, csv_text: &str) -> Result<ImportSummary, ServiceError> {
        self.access.ensure_self(actor, actor.user_id)?;

        let rows = parse_fitness_csv(csv_text, actor.user_id)?;

        for (line, user_id, entry) in &rows {
            if *user_id != actor.user_id {
                return Err(ServiceError::Forbidden(format!(
                    "Row {} belongs to user {}; only your own data can be imported",
                    line, user_id
                )));
            }
            validate(entry).map_err(|e| match e {
                ServiceError::ValidationError(msg) => ServiceError::ValidationError(format!("Row {}: {}", line, msg)),
                other => other,
            })?;
        }

        for (_, user_id, entry) in &rows {
            self.repository
                .add(*user_id, conversions::convert_to_data_fitness(entry, DEFAULT_FITNESS_DATE))
                .await
                .map_err(map_repo_error)?;
        }

        info!("Imported {} fitness rows for user {}", rows.len(), actor.user_id);
        Ok(ImportSummary { imported: rows.len() })
    }
}

fn parse_field<T: std::str::FromStr>(value: &str, column: &str, line: usize) -> Result<T, ServiceError> {
    value.trim().parse::<T>().map_err(|_| {
        ServiceError::ValidationError(format!("Row {}: invalid value '{}' for {}", line, value.trim(), column))
    })
}

/// Parse CSV text into `(line number, user id, entry)` rows.
///
/// Unknown columns are ignored; missing or empty cells fall back to
/// `default_user`, [`DEFAULT_FITNESS_DATE`] and zero.
pub fn parse_fitness_csv(csv_text: &str, default_user: i64) -> Result<Vec<(usize, i64, FitnessEntry)>, ServiceError> {
    let mut lines = csv_text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (_, header) = lines
        .next()
        .ok_or_else(|| ServiceError::ValidationError("CSV is empty".to_string()))?;

    let columns: Vec<String> = header
        .split(',')
        .map(|c| c.trim().trim_matches('"').to_lowercase())
        .collect();

    if !columns.iter().any(|c| CSV_COLUMNS.contains(&c.as_str())) {
        return Err(ServiceError::ValidationError(format!(
            "CSV header must name at least one of: {}",
            CSV_COLUMNS.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for (line, text) in lines {
        let mut user_id = default_user;
        let mut entry = FitnessEntry {
            bmi: 0.0,
            steps: 0,
            sleep: 0.0,
            calories: 0,
            heart_rate: 0,
            exercise: 0.0,
            bp: 0,
            date: Some(DEFAULT_FITNESS_DATE.to_string()),
        };

        for (column, raw) in columns.iter().zip(text.split(',')) {
            let value = raw.trim().trim_matches('"');
            if value.is_empty() {
                continue;
            }

            match column.as_str() {
                "user_id" => user_id = parse_field(value, column, line)?,
                "date" => entry.date = Some(value.to_string()),
                "steps" => entry.steps = parse_field(value, column, line)?,
                "calories" => entry.calories = parse_field(value, column, line)?,
                "heart_rate" => entry.heart_rate = parse_field(value, column, line)?,
                "bmi" => entry.bmi = parse_field(value, column, line)?,
                "sleep" => entry.sleep = parse_field(value, column, line)?,
                "exercise" => entry.exercise = parse_field(value, column, line)?,
                "bp" => entry.bp = parse_field(value, column, line)?,
                _ => {}
            }
        }

        rows.push((line, user_id, entry));
    }

    Ok(rows)
}
