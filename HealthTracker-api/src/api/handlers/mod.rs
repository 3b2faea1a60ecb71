pub mod account;
pub mod auth;
pub mod chat;
pub mod error;
pub mod fitness;
pub mod goals;
pub mod health;
pub mod medications;
pub mod medicines;
pub mod reports;
pub mod symptoms;

// Tests module
#[cfg(test)]
mod tests;

// Re-export handlers for easier imports
pub use error::ErrorResponse;
pub use health::health_check;
