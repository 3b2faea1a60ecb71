//! Database connection module for the HealthTracker application
//!
//! SQLite is the only supported backend. A file-backed pool is created once at
//! start-up; an in-memory pool can be built on demand for tests and as a
//! fallback store when no file database is available.

use std::env;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use once_cell::sync::OnceCell;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{debug, info, error, warn};

use super::migrations::run_sqlite_migrations;

/// Global database pool used throughout the application
static DB_POOL: OnceCell<DatabasePool> = OnceCell::new();

/// Default location of the SQLite file
pub const DEFAULT_SQLITE_PATH: &str = "data/healthcare.db";

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite database (file-based)
    Sqlite,
}

impl DatabaseType {
    /// Convert from string to database type
    pub fn parse(s: &str) -> Result<Self, DatabaseError> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Database connection pool
#[derive(Debug, Clone)]
pub enum DatabasePool {
    /// SQLite connection pool
    SQLite(Arc<r2d2::Pool<SqliteConnectionManager>>),
}

impl DatabasePool {
    /// Check out a SQLite connection from the pool
    pub fn sqlite(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, DatabaseError> {
        match self {
            DatabasePool::SQLite(pool) => pool.get().map_err(DatabaseError::SqlitePoolError),
        }
    }
}

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// SQLite connection pool error
    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    /// Database pool already initialized
    #[error("Database pool is already initialized")]
    PoolAlreadyInitialized,

    /// Database pool not initialized
    #[error("Database pool is not initialized")]
    PoolNotInitialized,

    /// Unsupported database type
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    /// Migration error
    #[error("Database migration error: {0}")]
    MigrationError(String),

    /// Generic database error
    #[error("Database error: {0}")]
    GenericError(String),
}

impl From<String> for DatabaseError {
    fn from(error: String) -> Self {
        DatabaseError::GenericError(error)
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database type
    pub db_type: DatabaseType,
    /// Path to SQLite database file
    pub sqlite_path: Option<String>,
    /// Connection pool size
    pub pool_size: u32,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: Some(DEFAULT_SQLITE_PATH.to_string()),
            pool_size: 5,
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let db_type_str = env::var("DB_TYPE").unwrap_or_else(|_| "sqlite".to_string());
        let db_type = DatabaseType::parse(&db_type_str)?;

        let sqlite_path = env::var("DB_SQLITE_PATH").ok();
        match sqlite_path {
            Some(ref path) => info!("Using SQLite database at: {}", path),
            None => info!("No DB_SQLITE_PATH provided, will use default path: {}", DEFAULT_SQLITE_PATH),
        }

        let pool_size = env::var("DB_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(5);

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        info!("Database configuration: pool_size={}, max_connections={}, timeout={}s",
            pool_size, max_connections, timeout_seconds);

        Ok(DatabaseConfig {
            db_type,
            sqlite_path,
            pool_size,
            max_connections,
            timeout_seconds,
        })
    }
}

/// Initialize the global database connection pool and run migrations
pub fn initialize_database_pool() -> Result<(), DatabaseError> {
    if DB_POOL.get().is_some() {
        // Test binaries share one process; a second initialisation is not an error there
        if env::var("DB_POOL_RESET").is_ok() {
            info!("Test environment detected - reusing the existing database pool");
            return Ok(());
        }
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    let config = DatabaseConfig::from_env()?;

    info!("Initializing database pool with type: {:?}", config.db_type);

    let pool = match config.db_type {
        DatabaseType::Sqlite => initialize_sqlite_pool(&config)?,
    };

    run_migrations(&pool)?;

    match DB_POOL.set(pool) {
        Ok(_) => Ok(()),
        Err(_) if env::var("DB_POOL_RESET").is_ok() => Ok(()),
        Err(_) => Err(DatabaseError::PoolAlreadyInitialized),
    }
}

/// Get the database connection pool
pub fn get_db_pool() -> Result<DatabasePool, DatabaseError> {
    DB_POOL.get()
        .cloned()
        .ok_or(DatabaseError::PoolNotInitialized)
}

/// Initialize SQLite connection pool
fn initialize_sqlite_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    use rusqlite::OpenFlags;
    use std::fs;
    use std::path::Path;

    let sqlite_path = config.sqlite_path.clone()
        .unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string());

    info!("Initializing SQLite database at: {}", sqlite_path);

    if let Some(parent) = Path::new(&sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create directory: {}, falling back to in-memory database", e);
                return create_in_memory_pool();
            }
        }
    }

    let manager = SqliteConnectionManager::file(&sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    match r2d2::Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.pool_size.min(config.max_connections)))
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager) {
            Ok(pool) => {
                info!("SQLite connection pool created successfully");
                Ok(DatabasePool::SQLite(Arc::new(pool)))
            },
            Err(e) => {
                error!("Failed to create SQLite connection pool: {}", e);
                warn!("Falling back to in-memory SQLite database");
                create_in_memory_pool()
            }
        }
}

/// Build a migrated in-memory SQLite pool.
///
/// Every in-memory connection is its own database, so the pool holds exactly
/// one connection. Callers must not hold a checked-out connection across
/// another repository call.
pub fn create_in_memory_pool() -> Result<DatabasePool, DatabaseError> {
    debug!("Initializing in-memory SQLite database");

    let manager = SqliteConnectionManager::memory();
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .connection_timeout(Duration::from_secs(5))
        .build(manager)?;

    let pool = DatabasePool::SQLite(Arc::new(pool));
    run_migrations(&pool)?;

    Ok(pool)
}

/// Run database migrations against a pool
pub fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    debug!("Running database migrations");

    let conn = pool.sqlite()?;
    run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)?;

    Ok(())
}

/// Get information about the current database connection
pub fn get_connection_info() -> Option<String> {
    let pool = DB_POOL.get()?;

    match pool {
        DatabasePool::SQLite(pool) => match pool.get() {
            Ok(conn) => {
                let location = match conn.query_row(
                    "PRAGMA database_list",
                    [],
                    |row| row.get::<_, String>(2),
                ) {
                    Ok(path) if path.is_empty() || path == ":memory:" => "SQLite in-memory database".to_string(),
                    Ok(path) => format!("SQLite database at {}", path),
                    Err(_) => "SQLite database (path unknown)".to_string(),
                };
                drop(conn);

                let state = pool.state();
                Some(format!("{} (connections: active={}, idle={})",
                    location,
                    state.connections,
                    state.idle_connections
                ))
            },
            Err(e) => {
                error!("Failed to get SQLite connection: {}", e);
                Some(format!("SQLite connection error: {}", e))
            }
        },
    }
}
