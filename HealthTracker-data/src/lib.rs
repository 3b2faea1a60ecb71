// HealthTracker Data
// This crate handles SQLite access for users, medications, fitness and reference data

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
