// Idempotent start-up migrations; every statement is `IF NOT EXISTS` or `INSERT OR IGNORE`
mod sqlite;
pub use sqlite::run_migrations as run_sqlite_migrations;
