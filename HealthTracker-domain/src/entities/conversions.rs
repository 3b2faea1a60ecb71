//! Conversion functions between domain entities and data models.
//!
//! Functions follow the pattern `convert_to_[target_layer]_[model_name]`.

use health_tracker_data::models as data;

use super::fitness::{FitnessEntry, FitnessRecord};
use super::medication::{Medication, Medicine};
use super::symptom::{Severity, Symptom};
use super::user::{Role, User};

/// Convert a stored account into the public domain view.
///
/// The `role` column is constrained by the schema, so an unknown value means the
/// row was written outside this application; it is reported as an error.
pub fn convert_to_domain_user(record: data::UserRecord) -> Result<User, String> {
    let role: Role = record.role.parse()?;

    Ok(User {
        id: record.id,
        name: record.name,
        email: record.email,
        phone: record.phone,
        role,
        doctor_id: record.doctor_id,
        patient_id: record.patient_id,
        created_at: record.created_at,
    })
}

pub fn convert_to_domain_medication(record: data::MedicationRecord) -> Medication {
    Medication {
        id: record.id,
        user_id: record.user_id,
        med_name: record.med_name,
        schedule: record.schedule,
        notes: record.notes,
        created_by: record.created_by,
        created_at: record.created_at,
    }
}

pub fn convert_to_domain_fitness(record: data::FitnessRecord) -> FitnessRecord {
    FitnessRecord {
        id: record.id,
        user_id: record.user_id,
        bmi: record.bmi,
        steps: record.steps,
        sleep: record.sleep,
        calories: record.calories,
        heart_rate: record.heart_rate,
        exercise: record.exercise,
        bp: record.bp,
        date: record.date,
    }
}

/// Convert a validated entry into the storage input, defaulting the date to `default_date`
pub fn convert_to_data_fitness(entry: &FitnessEntry, default_date: &str) -> data::NewFitnessRecord {
    data::NewFitnessRecord {
        bmi: entry.bmi,
        steps: entry.steps,
        sleep: entry.sleep,
        calories: entry.calories,
        heart_rate: entry.heart_rate,
        exercise: entry.exercise,
        bp: entry.bp,
        date: entry
            .date
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| default_date.to_string()),
    }
}

pub fn convert_to_domain_symptom(record: data::SymptomRecord) -> Result<Symptom, String> {
    let severity: Severity = record.severity.parse()?;

    Ok(Symptom {
        id: record.id,
        user_id: record.user_id,
        symptom: record.symptom,
        severity,
        recorded_at: record.recorded_at,
    })
}

pub fn convert_to_domain_medicine(record: data::MedicineRecord) -> Medicine {
    Medicine {
        name: record.name,
        use_case: record.use_case,
        side_effects: record.side_effects,
        precautions: record.precautions,
    }
}
