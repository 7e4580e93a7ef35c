use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the record store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Duplicate value for unique field: {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Maps Postgres unique violations (SQLSTATE 23505) to `Conflict`
    pub fn from_write(err: sqlx::Error, field: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return DatabaseError::Conflict(field.to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS "employees" (
        "id" UUID PRIMARY KEY,
        "name" TEXT NOT NULL CHECK (length(btrim("name")) > 0),
        "email" TEXT NOT NULL,
        "mobile" TEXT NOT NULL CHECK ("mobile" ~ '^[0-9]+$'),
        "designation" TEXT NOT NULL CHECK ("designation" IN ('Developer', 'Manager', 'Designer', 'Tester', 'HR')),
        "gender" TEXT NOT NULL CHECK ("gender" IN ('Male', 'Female', 'Other')),
        "course" TEXT[] NOT NULL CHECK (cardinality("course") > 0 AND "course" <@ ARRAY['BCA', 'MCA', 'BSC']::TEXT[]),
        "image" TEXT,
        "create_date" TIMESTAMPTZ NOT NULL DEFAULT now(),
        "active" BOOLEAN NOT NULL DEFAULT TRUE
    )"#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS "employees_email_key" ON "employees" (lower("email"))"#,
    r#"CREATE INDEX IF NOT EXISTS "employees_create_date_idx" ON "employees" ("create_date")"#,
];

/// Connection and schema management for the Postgres record store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool against the configured database URL
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config.url.as_deref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let url = Self::validate_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&url)
            .await?;

        info!(
            "Created database pool for {} (max {} connections)",
            Self::redacted(&url),
            config.max_connections
        );
        Ok(pool)
    }

    /// Create the employees table and its indexes if missing
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        info!("Employee schema ready");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    fn validate_url(raw: &str) -> Result<String, DatabaseError> {
        let url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => {}
            _ => return Err(DatabaseError::InvalidDatabaseUrl),
        }
        if url.path().trim_start_matches('/').is_empty() {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        Ok(url.into())
    }

    /// Connection string with the password removed, for logs
    fn redacted(raw: &str) -> String {
        match url::Url::parse(raw) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("***"));
                }
                url.into()
            }
            Err(_) => "<invalid url>".to_string(),
        }
    }
}
