use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use health_tracker_data::repository::ReferenceRepositoryTrait;

use crate::entities::InteractionCheckRequest;
use crate::services::errors::{map_repo_error, validate, ServiceError};

/// Drug pairs with a known adverse interaction
pub const KNOWN_INTERACTIONS: [(&str, &str); 3] = [
    ("warfarin", "aspirin"),
    ("amoxicillin", "methotrexate"),
    ("ibuprofen", "aspirin"),
];

/// Flag known interacting pairs and duplicate entries in a medication list.
///
/// Matching is case-insensitive. Pair messages use the pair's canonical order
/// from [`KNOWN_INTERACTIONS`]; every repeat of an earlier name adds one
/// duplicate message, in input order.
pub fn check_med_interaction<S: AsRef<str>>(medications: &[S]) -> Vec<String> {
    let names: Vec<String> = medications
        .iter()
        .map(|m| m.as_ref().trim().to_lowercase())
        .collect();

    let mut conflicts: Vec<String> = KNOWN_INTERACTIONS
        .iter()
        .filter(|(a, b)| names.iter().any(|n| n == a) && names.iter().any(|n| n == b))
        .map(|(a, b)| format!("Interaction detected between '{}' and '{}'", a, b))
        .collect();

    let mut seen = HashSet::new();
    for name in &names {
        if !seen.insert(name.as_str()) {
            conflicts.push(format!("Duplicate medication entry: '{}'", name));
        }
    }

    conflicts
}

fn is_known_pair(a: &str, b: &str) -> bool {
    KNOWN_INTERACTIONS
        .iter()
        .any(|(x, y)| (*x == a && *y == b) || (*x == b && *y == a))
}

/// Interaction checks backed by the seeded reference tables
#[derive(Clone)]
pub struct InteractionService {
    reference: Arc<dyn ReferenceRepositoryTrait>,
}

impl InteractionService {
    pub fn new(reference: Arc<dyn ReferenceRepositoryTrait>) -> Self {
        Self { reference }
    }

    /// Run [`check_med_interaction`], then look every remaining distinct pair
    /// up in the reference interaction table
    pub async fn check_with_reference<S: AsRef<str> + Sync>(&self, medications: &[S]) -> Result<Vec<String>, ServiceError> {
        let mut conflicts = check_med_interaction(medications);

        let mut distinct: Vec<String> = Vec::new();
        for name in medications.iter().map(|m| m.as_ref().trim().to_lowercase()) {
            if !name.is_empty() && !distinct.contains(&name) {
                distinct.push(name);
            }
        }

        for (i, first) in distinct.iter().enumerate() {
            for second in &distinct[i + 1..] {
                if is_known_pair(first, second) {
                    continue;
                }

                let hit = self
                    .reference
                    .find_interaction(first, second)
                    .await
                    .map_err(map_repo_error)?;

                if let Some(hit) = hit {
                    debug!("Reference interaction found: {} / {}", hit.med1, hit.med2);
                    conflicts.push(format!(
                        "Reference interaction between '{}' and '{}': {}",
                        first, second, hit.description
                    ));
                }
            }
        }

        Ok(conflicts)
    }

    /// Validate a caller-supplied list, then run [`Self::check_with_reference`]
    pub async fn check_request(&self, request: &InteractionCheckRequest) -> Result<Vec<String>, ServiceError> {
        validate(request)?;
        self.check_with_reference(request.medications.as_slice()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_tracker_data::database::create_in_memory_pool;
    use health_tracker_data::repository::ReferenceRepository;

    #[test]
    fn test_empty_list_has_no_conflicts() {
        assert!(check_med_interaction::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_pair_detected_in_either_order() {
        let expected = vec!["Interaction detected between 'warfarin' and 'aspirin'".to_string()];

        assert_eq!(check_med_interaction(&["Warfarin", "Aspirin"]), expected);
        assert_eq!(check_med_interaction(&["aspirin", "WARFARIN"]), expected);
    }

    #[test]
    fn test_multiple_pairs_follow_table_order() {
        let conflicts = check_med_interaction(&["aspirin", "ibuprofen", "warfarin"]);
        assert_eq!(
            conflicts,
            vec![
                "Interaction detected between 'warfarin' and 'aspirin'".to_string(),
                "Interaction detected between 'ibuprofen' and 'aspirin'".to_string(),
            ]
        );
    }

    #[test]
    fn test_every_repeat_is_reported_in_input_order() {
        let conflicts = check_med_interaction(&["Metformin", "paracetamol", "metformin", "Paracetamol", "metformin"]);
        assert_eq!(
            conflicts,
            vec![
                "Duplicate medication entry: 'metformin'".to_string(),
                "Duplicate medication entry: 'paracetamol'".to_string(),
                "Duplicate medication entry: 'metformin'".to_string(),
            ]
        );
    }

    #[test]
    fn test_triple_entry_yields_two_duplicates() {
        let conflicts = check_med_interaction(&["a", "a", "a"]);
        assert_eq!(conflicts, vec!["Duplicate medication entry: 'a'".to_string(); 2]);
    }

    #[test]
    fn test_unrelated_medications_are_clean() {
        assert!(check_med_interaction(&["metformin", "amlodipine"]).is_empty());
    }

    #[tokio::test]
    async fn test_reference_hits_are_added() {
        let reference = Arc::new(ReferenceRepository::new(create_in_memory_pool().unwrap()));
        let service = InteractionService::new(reference);

        let conflicts = service.check_with_reference(&["Paracetamol", "Aspirin"]).await.unwrap();
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].starts_with("Reference interaction between 'paracetamol' and 'aspirin': "));
    }

    #[tokio::test]
    async fn test_reference_lookup_skips_pairs_already_reported() {
        let reference = Arc::new(ReferenceRepository::new(create_in_memory_pool().unwrap()));
        let service = InteractionService::new(reference);

        // ibuprofen/aspirin is seeded as a reference row too
        let conflicts = service.check_with_reference(&["ibuprofen", "aspirin"]).await.unwrap();
        assert_eq!(conflicts, vec!["Interaction detected between 'ibuprofen' and 'aspirin'".to_string()]);
    }

    #[tokio::test]
    async fn test_request_size_is_bounded() {
        let reference = Arc::new(ReferenceRepository::new(create_in_memory_pool().unwrap()));
        let service = InteractionService::new(reference);

        let empty = InteractionCheckRequest { medications: vec![] };
        assert!(matches!(service.check_request(&empty).await, Err(ServiceError::ValidationError(_))));

        let too_many = InteractionCheckRequest {
            medications: (0..51).map(|i| format!("med-{}", i)).collect(),
        };
        assert!(matches!(service.check_request(&too_many).await, Err(ServiceError::ValidationError(_))));

        let ok = InteractionCheckRequest {
            medications: vec!["warfarin".to_string(), "aspirin".to_string()],
        };
        assert_eq!(service.check_request(&ok).await.unwrap().len(), 1);
    }
}
