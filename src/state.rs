use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::{AppConfig, StoreBackend};
use crate::database::{DatabaseError, DatabaseManager, EmployeeStore, MemoryEmployeeStore, PgEmployeeStore};
use crate::services::{EmployeeService, UploadStore};

/// Shared handles every request handler receives
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub employees: Arc<EmployeeService>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Build state for the configured store backend, creating the schema when Postgres is used
    pub async fn from_config(config: AppConfig) -> Result<Self, DatabaseError> {
        let store: Arc<dyn EmployeeStore> = match config.database.backend {
            StoreBackend::Postgres => {
                let pool = DatabaseManager::connect(&config.database).await?;
                DatabaseManager::ensure_schema(&pool).await?;
                Arc::new(PgEmployeeStore::new(pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory employee store; records are lost on restart");
                Arc::new(MemoryEmployeeStore::new())
            }
        };
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn EmployeeStore>) -> Self {
        let uploads = UploadStore::new(&config.upload);
        let employees = EmployeeService::new(store, uploads, config.list.clone());
        let auth = AuthService::new(&config.security);
        Self {
            config: Arc::new(config),
            employees: Arc::new(employees),
            auth: Arc::new(auth),
        }
    }
}
