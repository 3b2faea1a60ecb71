use chrono::{DateTime, Utc};

use crate::entities::{FitnessRecord, HealthReport, Medication, RiskAssessment};

/// Assemble the plain-text health report.
///
/// `now` is passed in so the header line is deterministic under test.
pub fn build_report(
    user_id: i64,
    medications: Vec<Medication>,
    fitness: FitnessRecord,
    conflicts: Vec<String>,
    risk: Option<RiskAssessment>,
    now: DateTime<Utc>,
) -> HealthReport {
    let risk = risk.unwrap_or_else(RiskAssessment::unknown);

    let mut lines = vec![
        format!("Report for user {} - {}", user_id, now.format("%Y-%m-%d %H:%M")),
        format!("Risk level: {} ({})", risk.level, risk.reason),
    ];

    if conflicts.is_empty() {
        lines.push("No medication conflicts detected.".to_string());
    } else {
        lines.push("Medication Conflicts:".to_string());
        lines.extend(conflicts.iter().map(|c| format!(" - {}", c)));
    }

    lines.push(format!(
        "Latest fitness: steps={}, calories={}, hr={}",
        fitness.steps, fitness.calories, fitness.heart_rate
    ));

    HealthReport {
        summary: lines.join("\n"),
        medications,
        fitness,
        conflicts,
        risk,
    }
}
