use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use health_tracker_data::repository::{FitnessRepositoryTrait, MedicationRepositoryTrait};

use crate::entities::conversions;
use crate::entities::{FitnessRecord, Medication, WorkflowOutcome};
use crate::services::errors::{map_repo_error, ServiceError};
use crate::services::interactions::{check_med_interaction, InteractionService};
use crate::services::report::build_report;
use crate::services::risk::predict_risk;

/// Fetch -> check interactions -> predict risk -> report, for one user
#[derive(Clone)]
pub struct HealthWorkflow {
    medications: Arc<dyn MedicationRepositoryTrait>,
    fitness: Arc<dyn FitnessRepositoryTrait>,
    interactions: Option<InteractionService>,
}

impl HealthWorkflow {
    pub fn new(
        medications: Arc<dyn MedicationRepositoryTrait>,
        fitness: Arc<dyn FitnessRepositoryTrait>,
    ) -> Self {
        Self {
            medications,
            fitness,
            interactions: None,
        }
    }

    /// Also consult the reference interaction table
    pub fn with_reference(mut self, interactions: InteractionService) -> Self {
        self.interactions = Some(interactions);
        self
    }

    async fn fetch(&self, user_id: i64) -> Result<(Vec<Medication>, FitnessRecord), ServiceError> {
        let medications = self
            .medications
            .list_for_user(user_id)
            .await
            .map_err(map_repo_error)?
            .into_iter()
            .map(conversions::convert_to_domain_medication)
            .collect();

        let fitness = self
            .fitness
            .latest(user_id)
            .await
            .map_err(map_repo_error)?
            .map(conversions::convert_to_domain_fitness)
            .unwrap_or_else(|| FitnessRecord::empty(user_id));

        Ok((medications, fitness))
    }

    async fn check_interactions(&self, medications: &[Medication]) -> Result<Vec<String>, ServiceError> {
        let names: Vec<&str> = medications.iter().map(|m| m.med_name.as_str()).collect();

        match &self.interactions {
            Some(service) => service.check_with_reference(&names).await,
            None => Ok(check_med_interaction(&names)),
        }
    }

    pub async fn run(&self, user_id: i64) -> Result<WorkflowOutcome, ServiceError> {
        let (medications, fitness) = self.fetch(user_id).await?;
        debug!("Workflow fetched {} medications for user {}", medications.len(), user_id);

        let conflicts = self.check_interactions(&medications).await?;
        let risk = predict_risk(&fitness);

        let report = build_report(
            user_id,
            medications.clone(),
            fitness.clone(),
            conflicts.clone(),
            Some(risk.clone()),
            Utc::now(),
        );

        info!(
            "Workflow completed for user {}: risk={}, conflicts={}",
            user_id,
            risk.level,
            conflicts.len()
        );

        Ok(WorkflowOutcome {
            medications,
            fitness,
            conflicts,
            risk,
            report,
        })
    }
}
