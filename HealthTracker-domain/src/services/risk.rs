use crate::entities::{FitnessRecord, RiskAssessment, RiskLevel};

/// Classify risk from the latest heart rate and step count.
///
/// Rules are checked from most to least severe and the first match wins.
pub fn predict_risk(fitness: &FitnessRecord) -> RiskAssessment {
    let heart_rate = fitness.heart_rate;
    let steps = fitness.steps;

    let (level, reason) = if heart_rate >= 120 || steps < 1000 {
        (RiskLevel::High, "Very high heart rate or very low activity")
    } else if heart_rate >= 100 || steps < 3000 {
        (RiskLevel::Medium, "Elevated heart rate or low activity")
    } else {
        (RiskLevel::Low, "Normal vitals and activity")
    };

    RiskAssessment {
        level,
        reason: reason.to_string(),
    }
}
