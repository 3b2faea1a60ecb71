//! Domain layer health check functionality

use std::collections::HashMap;

use health_tracker_data::database::{self, DatabasePool};

/// System health status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

impl SystemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemStatus::Healthy => "healthy",
            SystemStatus::Degraded => "degraded",
            SystemStatus::Unhealthy => "unhealthy",
        }
    }
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    pub components: HashMap<String, HealthComponent>,
}

/// Probe a pool with a trivial query
pub fn check_pool(pool: &DatabasePool) -> HealthComponent {
    let probe = pool
        .sqlite()
        .map_err(|e| e.to_string())
        .and_then(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(|e| e.to_string())
        });

    match probe {
        Ok(1) => HealthComponent {
            status: ComponentStatus::Healthy,
            details: None,
        },
        Ok(other) => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some(format!("Unexpected probe result {}", other)),
        },
        Err(e) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(format!("Database connection error: {}", e)),
        },
    }
}

/// Combine component states into a report
pub fn system_health(components: HashMap<String, HealthComponent>) -> SystemHealth {
    let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
        SystemStatus::Unhealthy
    } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
        SystemStatus::Degraded
    } else {
        SystemStatus::Healthy
    };

    SystemHealth { status, components }
}

/// Health of the global database pool
pub async fn get_system_health() -> SystemHealth {
    let db_component = match database::get_db_pool() {
        Ok(pool) => {
            let mut component = check_pool(&pool);
            if component.details.is_none() {
                component.details = database::get_connection_info();
            }
            component
        }
        Err(e) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(e.to_string()),
        },
    };

    system_health(HashMap::from([("database".to_string(), db_component)]))
}
