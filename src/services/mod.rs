pub mod employee_service;
pub mod upload_service;

pub use employee_service::{EmployeeError, EmployeeForm, EmployeePage, EmployeeService, ListParams, PageWindow};
pub use upload_service::{UploadError, UploadStore, UploadedFile};
