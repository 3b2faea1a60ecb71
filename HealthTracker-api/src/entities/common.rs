use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Plain confirmation message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Query parameters for history endpoints
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Maximum number of records, newest first (default: 30, max: 365)
    pub limit: Option<usize>,
}

impl HistoryQuery {
    pub const DEFAULT_LIMIT: usize = 30;
    pub const MAX_LIMIT: usize = 365;

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT)
    }
}
