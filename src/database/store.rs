use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::Employee;
use super::query::{EmployeeFilter, EmployeeQuery};

/// Persistence seam for employee records.
///
/// Implementations enforce email uniqueness (case-insensitive) and report a
/// clash as [`DatabaseError::Conflict`] with the field name `"email"`. Text
/// sort columns compare by byte value, so `"Carol"` sorts before `"bob"`.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn find(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, DatabaseError>;

    async fn count(&self, filter: &EmployeeFilter) -> Result<i64, DatabaseError>;

    async fn get(&self, id: Uuid) -> Result<Option<Employee>, DatabaseError>;

    async fn insert(&self, employee: Employee) -> Result<Employee, DatabaseError>;

    /// Overwrites every mutable field of an existing record. `None` if the id is gone.
    async fn replace(&self, employee: Employee) -> Result<Option<Employee>, DatabaseError>;

    /// Hard delete; false if nothing was removed
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Flips `active` in one step and returns the new value
    async fn toggle_active(&self, id: Uuid) -> Result<Option<bool>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
