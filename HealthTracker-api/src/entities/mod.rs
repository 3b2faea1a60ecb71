// Public entities for the HealthTracker API
// Request and response bodies that only exist at the HTTP boundary

// Auth entities
pub mod auth;

// Common entities for error handling and queries
pub mod common;

// Chatbot and account entities
pub mod chat;
