use std::sync::Arc;

use health_tracker_data::database::DatabasePool;
use health_tracker_data::repository::{
    FitnessRepository, FitnessRepositoryTrait, GoalRepository, MedicationRepository, MedicationRepositoryTrait,
    ReferenceRepository, SymptomRepository, UserRepository,
};
use health_tracker_domain::services::{
    AccessControl, AnalyticsService, ChatContext, FitnessService, GoalService, HealthWorkflow, InteractionService,
    LlmClient, MedicationService, MedicineService, ResponseCache, SymptomService, UserService,
};

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: DatabasePool,
    pub access: AccessControl,
    pub users: UserService,
    pub medications: MedicationService,
    pub fitness: FitnessService,
    pub analytics: AnalyticsService,
    pub workflow: HealthWorkflow,
    pub chat: ChatContext,
    pub goals: Arc<GoalService<GoalRepository>>,
    pub symptoms: SymptomService,
    pub medicines: Arc<MedicineService<ReferenceRepository>>,
    pub interactions: InteractionService,
}

impl AppState {
    /// Wire every repository and service onto one pool
    pub fn new(pool: DatabasePool) -> Self {
        let users = Arc::new(UserRepository::new(pool.clone()));
        let medications: Arc<dyn MedicationRepositoryTrait> = Arc::new(MedicationRepository::new(pool.clone()));
        let fitness: Arc<dyn FitnessRepositoryTrait> = Arc::new(FitnessRepository::new(pool.clone()));
        let reference = Arc::new(ReferenceRepository::new(pool.clone()));

        let access = AccessControl::new(users.clone());
        let interactions = InteractionService::new(reference);

        Self {
            pool: pool.clone(),
            access: access.clone(),
            users: UserService::new(users),
            medications: MedicationService::new(medications.clone(), access.clone()),
            fitness: FitnessService::new(fitness.clone(), access.clone()),
            analytics: AnalyticsService::new(fitness.clone()),
            workflow: HealthWorkflow::new(medications.clone(), fitness.clone()).with_reference(interactions.clone()),
            chat: ChatContext::new(medications, fitness.clone()),
            goals: Arc::new(GoalService::new(GoalRepository::new(pool.clone()), fitness)),
            symptoms: SymptomService::new(Arc::new(SymptomRepository::new(pool.clone())), access),
            medicines: Arc::new(MedicineService::new(ReferenceRepository::new(pool))),
            interactions,
        }
    }

    pub fn with_chat_cache(mut self, cache: ResponseCache) -> Self {
        self.chat = self.chat.with_cache(cache);
        self
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.chat = self.chat.with_llm(llm);
        self
    }

    /// Use an LLM backend when one is configured in the environment
    pub fn with_llm_from_env(mut self) -> Self {
        self.chat = self.chat.with_llm_from_env();
        self
    }
}
