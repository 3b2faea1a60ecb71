// Domain services
// Business rules for users, medications, fitness data, analytics and the chatbot

pub mod access;
pub mod analytics;
pub mod chat;
pub mod errors;
pub mod fitness;
pub mod goals;
pub mod interactions;
pub mod medications;
pub mod medicines;
pub mod report;
pub mod risk;
pub mod symptoms;
pub mod users;
pub mod workflow;

pub use access::AccessControl;
pub use analytics::AnalyticsService;
pub use chat::{ChatContext, LlmClient, LlmConfig, OpenAiCompatibleClient, ResponseCache};
pub use errors::ServiceError;
pub use fitness::FitnessService;
pub use goals::GoalService;
pub use interactions::{check_med_interaction, InteractionService};
pub use medications::MedicationService;
pub use medicines::MedicineService;
pub use report::build_report;
pub use risk::predict_risk;
pub use symptoms::SymptomService;
pub use users::UserService;
pub use workflow::HealthWorkflow;
