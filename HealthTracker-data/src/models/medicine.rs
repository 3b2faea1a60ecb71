use serde::{Deserialize, Serialize};

/// Reference entry from the seeded medicines table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicineRecord {
    pub id: i64,
    pub name: String,
    pub use_case: String,
    pub side_effects: String,
    pub precautions: String,
}

/// Reference drug pair with a human-readable caution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionRecord {
    pub id: i64,
    pub med1: String,
    pub med2: String,
    pub description: String,
}
