use std::sync::Arc;

use tracing::debug;

use health_tracker_data::repository::FitnessRepositoryTrait;

use crate::entities::conversions;
use crate::entities::{AnalyticsSummary, FitnessRecord};
use crate::services::errors::{map_repo_error, ServiceError};

/// Daily calorie target used by the summary
pub const DEFAULT_CALORIE_TARGET: f64 = 2000.0;

/// Number of recent records analysed when no limit is given
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

const NO_DATA: &str = "No data available.";

fn mean(records: &[FitnessRecord], metric: impl Fn(&FitnessRecord) -> i64) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let total = records.iter().fold(0i64, |acc, r| acc.saturating_add(metric(r)));
    Some(total as f64 / records.len() as f64)
}

/// Mean step count; 0 for an empty history
pub fn average_steps(records: &[FitnessRecord]) -> f64 {
    mean(records, |r| r.steps).unwrap_or(0.0)
}

/// Compare mean calories against `target`
pub fn calories_vs_target(records: &[FitnessRecord], target: f64) -> &'static str {
    match mean(records, |r| r.calories) {
        None => NO_DATA,
        Some(avg) if avg > target => "Above target",
        Some(avg) if avg < target => "Below target",
        Some(_) => "On track",
    }
}

/// Classify mean heart rate as Low (< 60), Normal (60 to 100) or High
pub fn heart_rate_status(records: &[FitnessRecord]) -> &'static str {
    match mean(records, |r| r.heart_rate) {
        None => NO_DATA,
        Some(avg) if avg < 60.0 => "Low",
        Some(avg) if avg <= 100.0 => "Normal",
        Some(_) => "High",
    }
}

/// Summarise a slice of records
pub fn summarize(records: &[FitnessRecord]) -> AnalyticsSummary {
    AnalyticsSummary {
        records: records.len(),
        average_steps: average_steps(records),
        calories_status: calories_vs_target(records, DEFAULT_CALORIE_TARGET).to_string(),
        heart_rate_status: heart_rate_status(records).to_string(),
    }
}

/// Analytics over a user's stored fitness history
#[derive(Clone)]
pub struct AnalyticsService {
    fitness: Arc<dyn FitnessRepositoryTrait>,
}

impl AnalyticsService {
    pub fn new(fitness: Arc<dyn FitnessRepositoryTrait>) -> Self {
        Self { fitness }
    }

    /// Summary over the newest `limit` records of `user_id`
    pub async fn summary(&self, user_id: i64, limit: usize) -> Result<AnalyticsSummary, ServiceError> {
        let records: Vec<FitnessRecord> = self
            .fitness
            .list_for_user(user_id, limit)
            .await
            .map_err(map_repo_error)?
            .into_iter()
            .map(conversions::convert_to_domain_fitness)
            .collect();

        debug!("Computing analytics for user {} over {} records", user_id, records.len());
        Ok(summarize(&records))
    }
}
