use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Question for the health assistant
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 1000, message = "Query must be between 1 and 1000 characters"))]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
}

/// Confirmation required to delete an account
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteAccountRequest {
    /// Must be exactly `DELETE`
    pub confirmation: String,
}
