// Testing utilities for crates built on the domain layer
// Only available when the "mock" feature is enabled

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

// Re-export useful test mocks from the data layer
pub use health_tracker_data::repository::mocks::{MockFitnessRepository, MockMedicationRepository};

use crate::services::chat::LlmClient;
use crate::services::errors::ServiceError;

/// [`LlmClient`] that replies with a fixed answer (or error) and counts calls
pub struct ScriptedLlmClient {
    reply: Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedLlmClient {
    /// Always answer `reply`
    pub fn answering(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with an external service error carrying `message`
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of completions requested so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, _system_prompt: &str, _user_message: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(ServiceError::External)
    }
}
