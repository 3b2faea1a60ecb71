//! Storage models mirroring the SQLite tables.

pub mod fitness;
pub mod goal;
pub mod medication;
pub mod medicine;
pub mod symptom;
pub mod user;

pub use fitness::{FitnessRecord, NewFitnessRecord};
pub use goal::GoalRecord;
pub use medication::{MedicationRecord, NewMedication};
pub use medicine::{InteractionRecord, MedicineRecord};
pub use symptom::{NewSymptom, SymptomRecord};
pub use user::{NewUser, UserRecord};
