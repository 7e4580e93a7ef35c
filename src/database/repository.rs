use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Employee, EmployeeRow};
use crate::database::query::{EmployeeFilter, EmployeeQuery};
use crate::database::query_builder::QueryBuilder;
use crate::database::store::EmployeeStore;
use crate::filter::FilterData;

const TABLE: &str = "employees";

/// Postgres-backed employee store
#[derive(Clone)]
pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_employee(row: EmployeeRow) -> Result<Employee, DatabaseError> {
    let id = row.id;
    Employee::try_from(row).map_err(|e| DatabaseError::CorruptRecord(format!("employee {}: {}", id, e)))
}

#[async_trait]
impl EmployeeStore for PgEmployeeStore {
    async fn find(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, DatabaseError> {
        QueryBuilder::<EmployeeRow>::new(TABLE)?
            .filter(query.to_filter_data())?
            .select_all(&self.pool)
            .await?
            .into_iter()
            .map(into_employee)
            .collect()
    }

    async fn count(&self, filter: &EmployeeFilter) -> Result<i64, DatabaseError> {
        let filter_data = FilterData {
            where_clause: filter.to_where(),
            ..Default::default()
        };
        QueryBuilder::<EmployeeRow>::new(TABLE)?
            .filter(filter_data)?
            .count(&self.pool)
            .await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Employee>, DatabaseError> {
        let row = sqlx::query_as::<_, EmployeeRow>(r#"SELECT * FROM "employees" WHERE "id" = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(into_employee).transpose()
    }

    async fn insert(&self, employee: Employee) -> Result<Employee, DatabaseError> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"INSERT INTO "employees"
                ("id", "name", "email", "mobile", "designation", "gender", "course", "image", "create_date", "active")
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING *"#,
        )
        .bind(employee.id)
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.mobile)
        .bind(employee.designation.as_str())
        .bind(employee.gender.as_str())
        .bind(employee.course.to_strings())
        .bind(&employee.image)
        .bind(employee.create_date)
        .bind(employee.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "email"))?;
        into_employee(row)
    }

    async fn replace(&self, employee: Employee) -> Result<Option<Employee>, DatabaseError> {
        // id and create_date are immutable
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"UPDATE "employees" SET
                "name" = $2, "email" = $3, "mobile" = $4, "designation" = $5,
                "gender" = $6, "course" = $7, "image" = $8, "active" = $9
               WHERE "id" = $1
               RETURNING *"#,
        )
        .bind(employee.id)
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.mobile)
        .bind(employee.designation.as_str())
        .bind(employee.gender.as_str())
        .bind(employee.course.to_strings())
        .bind(&employee.image)
        .bind(employee.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "email"))?;
        row.map(into_employee).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query(r#"DELETE FROM "employees" WHERE "id" = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle_active(&self, id: Uuid) -> Result<Option<bool>, DatabaseError> {
        let active = sqlx::query_scalar::<_, bool>(
            r#"UPDATE "employees" SET "active" = NOT "active" WHERE "id" = $1 RETURNING "active""#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(active)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
