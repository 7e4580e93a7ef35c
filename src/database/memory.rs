use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Employee;
use crate::database::query::{EmployeeFilter, EmployeeQuery};
use crate::database::store::EmployeeStore;

/// In-process employee store.
///
/// Records are kept in insertion order, which is the tie order for sorting.
/// Every operation holds the lock for its whole check-then-write, so the
/// email uniqueness check cannot race another writer.
#[derive(Clone, Default)]
pub struct MemoryEmployeeStore {
    records: Arc<RwLock<Vec<Employee>>>,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken(records: &[Employee], email: &str, except: Option<Uuid>) -> bool {
        records
            .iter()
            .any(|e| Some(e.id) != except && e.email.eq_ignore_ascii_case(email))
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn find(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, DatabaseError> {
        let records = self.records.read().await;
        let mut matching: Vec<&Employee> = records.iter().filter(|e| query.filter.matches(e)).collect();
        // stable sort keeps insertion order for ties
        matching.sort_by(|a, b| query.compare(a, b));

        let offset = usize::try_from(query.offset).unwrap_or(0);
        let limit = usize::try_from(query.limit).unwrap_or(0);
        Ok(matching.into_iter().skip(offset).take(limit).cloned().collect())
    }

    async fn count(&self, filter: &EmployeeFilter) -> Result<i64, DatabaseError> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|e| filter.matches(e)).count() as i64)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Employee>, DatabaseError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|e| e.id == id).cloned())
    }

    async fn insert(&self, employee: Employee) -> Result<Employee, DatabaseError> {
        let mut records = self.records.write().await;
        if Self::email_taken(&records, &employee.email, None) {
            return Err(DatabaseError::Conflict("email".to_string()));
        }
        if records.iter().any(|e| e.id == employee.id) {
            return Err(DatabaseError::Conflict("id".to_string()));
        }
        records.push(employee.clone());
        Ok(employee)
    }

    async fn replace(&self, employee: Employee) -> Result<Option<Employee>, DatabaseError> {
        let mut records = self.records.write().await;
        if Self::email_taken(&records, &employee.email, Some(employee.id)) {
            return Err(DatabaseError::Conflict("email".to_string()));
        }
        let Some(slot) = records.iter_mut().find(|e| e.id == employee.id) else {
            return Ok(None);
        };
        let create_date = slot.create_date;
        *slot = Employee { create_date, ..employee };
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|e| e.id != id);
        Ok(records.len() != before)
    }

    async fn toggle_active(&self, id: Uuid) -> Result<Option<bool>, DatabaseError> {
        let mut records = self.records.write().await;
        Ok(records.iter_mut().find(|e| e.id == id).map(|e| {
            e.active = !e.active;
            e.active
        }))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
