// Domain entities and value objects
pub mod conversions;
pub mod fitness;
pub mod goal;
pub mod medication;
pub mod report;
pub mod symptom;
pub mod user;

// Re-export common types for easier imports
pub use fitness::{FitnessEntry, FitnessRecord, ImportSummary};
pub use goal::{GoalProgress, Goals, GoalsRequest};
pub use medication::{InteractionCheckRequest, InteractionCheckResponse, Medication, MedicationRequest, Medicine};
pub use report::{AnalyticsSummary, HealthReport, RiskAssessment, RiskLevel, WorkflowOutcome};
pub use symptom::{Severity, Symptom, SymptomRequest};
pub use user::{LoginRequest, RegistrationRequest, Role, User};
