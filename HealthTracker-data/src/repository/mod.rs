// Repository module structure
pub mod errors;
mod fitness;
mod goal;
mod medication;
mod reference;
mod symptom;
mod user;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use fitness::{FitnessRepository, FitnessRepositoryTrait};
pub use goal::{GoalRepository, GoalRepositoryTrait};
pub use medication::{MedicationRepository, MedicationRepositoryTrait};
pub use reference::{ReferenceRepository, ReferenceRepositoryTrait};
pub use symptom::{SymptomRepository, SymptomRepositoryTrait};
pub use user::{UserRepository, UserRepositoryTrait};

// Re-export mocks for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub mod mocks {
    pub use super::fitness::tests::MockFitnessRepository;
    pub use super::medication::tests::MockMedicationRepository;
}
