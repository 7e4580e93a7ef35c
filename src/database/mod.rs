pub mod manager;
pub mod memory;
pub mod models;
pub mod query;
pub mod query_builder;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryEmployeeStore;
pub use models::Employee;
pub use query::{EmployeeFilter, EmployeeQuery};
pub use repository::PgEmployeeStore;
pub use store::EmployeeStore;
