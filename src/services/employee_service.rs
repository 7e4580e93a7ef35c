use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::config::ListConfig;
use crate::database::{DatabaseError, Employee, EmployeeFilter, EmployeeQuery, EmployeeStore};
use crate::services::upload_service::{UploadError, UploadStore, UploadedFile};
use crate::types::{CourseSet, Designation, Gender, SortDirection, SortField};

#[derive(Debug, Error)]
pub enum EmployeeError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: BTreeMap<String, String>,
    },

    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    #[error("Employee not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Raw list parameters as they arrive on the query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
}

/// Effective page window after clamping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
}

impl PageWindow {
    /// Unparsable or non-positive `page` becomes 1; unparsable or non-positive
    /// `limit` becomes the configured default; `limit` is capped at the maximum.
    pub fn resolve(page: Option<&str>, limit: Option<&str>, config: &ListConfig) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let requested = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(config.default_limit);
        let limit = if requested > config.max_limit {
            if config.debug_logging {
                tracing::warn!("Limit {} exceeds max {}, capping to max", requested, config.max_limit);
            }
            config.max_limit
        } else {
            requested
        };

        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePage {
    pub employees: Vec<Employee>,
    pub total_employees: i64,
    pub total_active_employees: i64,
    pub page: i64,
    pub limit: i64,
}

/// Form fields of a create or update request. `None` means the field was not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub designation: Option<String>,
    pub gender: Option<String>,
    pub course: Option<Vec<String>>,
}

#[derive(Debug, Validate)]
struct ContactDetails {
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    email: String,
    #[validate(length(min = 10, message = "Mobile number must be at least 10 digits"))]
    mobile: String,
}

const FORM_FIELDS: [&str; 6] = ["name", "email", "mobile", "designation", "gender", "course"];

/// Per-field messages, first message per field wins
#[derive(Debug, Default)]
struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    fn absorb(&mut self, errors: validator::ValidationErrors) {
        for (field, errs) in errors.field_errors() {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("{} is invalid", field));
            self.add(&field, message);
        }
    }

    fn into_result(self) -> Result<(), EmployeeError> {
        if self.0.is_empty() {
            return Ok(());
        }
        let message = FORM_FIELDS
            .iter()
            .filter_map(|f| self.0.get(*f).cloned())
            .collect::<Vec<_>>()
            .join("; ");
        Err(EmployeeError::Validation { message, field_errors: self.0 })
    }
}

/// Fully validated field values of an employee
#[derive(Debug, Clone)]
struct EmployeeFields {
    name: String,
    email: String,
    mobile: String,
    designation: Designation,
    gender: Gender,
    course: CourseSet,
}

impl EmployeeFields {
    /// Overlay `form` on `base` (if any) and validate the result
    fn resolve(form: EmployeeForm, base: Option<&Employee>) -> Result<Self, EmployeeError> {
        let mut errors = FieldErrors::default();

        let mut text = |field: &str, label: &str, value: Option<String>, current: Option<&str>| -> String {
            match value.or_else(|| current.map(str::to_string)) {
                Some(v) => v.trim().to_string(),
                None => {
                    errors.add(field, format!("{} is required", label));
                    String::new()
                }
            }
        };
        let name = text("name", "Name", form.name, base.map(|b| b.name.as_str()));
        let email = text("email", "Email", form.email, base.map(|b| b.email.as_str())).to_lowercase();
        let mobile = text("mobile", "Mobile", form.mobile, base.map(|b| b.mobile.as_str()));

        let designation = match (form.designation, base) {
            (Some(v), _) => v.parse::<Designation>().map_err(|e| errors.add("designation", format!("{}", e))).ok(),
            (None, Some(b)) => Some(b.designation),
            (None, None) => {
                errors.add("designation", "Designation is required");
                None
            }
        };
        let gender = match (form.gender, base) {
            (Some(v), _) => v.parse::<Gender>().map_err(|e| errors.add("gender", format!("{}", e))).ok(),
            (None, Some(b)) => Some(b.gender),
            (None, None) => {
                errors.add("gender", "Gender is required");
                None
            }
        };
        let course = match (form.course, base) {
            (Some(values), _) => match CourseSet::parse(&values) {
                Ok(set) if set.is_empty() => {
                    errors.add("course", "At least one course is required");
                    None
                }
                Ok(set) => Some(set),
                Err(e) => {
                    errors.add("course", e.to_string());
                    None
                }
            },
            (None, Some(b)) => Some(b.course.clone()),
            (None, None) => {
                errors.add("course", "Course is required");
                None
            }
        };

        let contact = ContactDetails { name, email, mobile };
        if !contact.mobile.chars().all(|c| c.is_ascii_digit()) {
            errors.add("mobile", "Mobile number must contain digits only");
        }
        if let Err(e) = contact.validate() {
            errors.absorb(e);
        }
        errors.into_result()?;

        match (designation, gender, course) {
            (Some(designation), Some(gender), Some(course)) => Ok(Self {
                name: contact.name,
                email: contact.email,
                mobile: contact.mobile,
                designation,
                gender,
                course,
            }),
            _ => Err(EmployeeError::Validation {
                message: "Invalid employee fields".to_string(),
                field_errors: BTreeMap::new(),
            }),
        }
    }
}

/// Employee operations over a record store and the upload directory
pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
    uploads: UploadStore,
    list: ListConfig,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EmployeeStore>, uploads: UploadStore, list: ListConfig) -> Self {
        Self { store, uploads, list }
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.store.health_check().await
    }

    pub async fn list(&self, params: &ListParams) -> Result<EmployeePage, EmployeeError> {
        let window = PageWindow::resolve(params.page.as_deref(), params.limit.as_deref(), &self.list);
        let filter = EmployeeFilter::from_search(params.search.as_deref().unwrap_or_default());
        let query = EmployeeQuery {
            filter: filter.clone(),
            sort: SortField::from_param(params.sort_field.as_deref()),
            direction: SortDirection::from_param(params.sort_order.as_deref()),
            offset: window.offset(),
            limit: window.limit,
        };
        let active_filter = filter.active_only();

        let (employees, total_employees, total_active_employees) = tokio::try_join!(
            self.store.find(&query),
            self.store.count(&filter),
            self.store.count(&active_filter),
        )?;

        tracing::debug!(
            page = window.page,
            limit = window.limit,
            returned = employees.len(),
            total = total_employees,
            "Listed employees"
        );

        Ok(EmployeePage {
            employees,
            total_employees,
            total_active_employees,
            page: window.page,
            limit: window.limit,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Employee, EmployeeError> {
        let uuid = parse_id(id)?;
        self.store
            .get(uuid)
            .await?
            .ok_or_else(|| EmployeeError::NotFound(id.to_string()))
    }

    pub async fn create(&self, form: EmployeeForm, image: Option<UploadedFile>) -> Result<Employee, EmployeeError> {
        let fields = EmployeeFields::resolve(form, None)?;
        let email = fields.email.clone();

        let image_path = match &image {
            Some(file) => Some(self.uploads.save(file).await?),
            None => None,
        };

        let employee = Employee {
            id: Uuid::new_v4(),
            name: fields.name,
            email: fields.email,
            mobile: fields.mobile,
            designation: fields.designation,
            gender: fields.gender,
            course: fields.course,
            image: image_path.clone(),
            create_date: Utc::now(),
            active: true,
        };

        match self.store.insert(employee).await {
            Ok(created) => {
                tracing::info!(id = %created.id, "Employee created");
                Ok(created)
            }
            Err(e) => {
                if let Some(path) = &image_path {
                    self.uploads.remove(path).await;
                }
                Err(map_write_error(e, &email))
            }
        }
    }

    pub async fn update(
        &self,
        id: &str,
        form: EmployeeForm,
        image: Option<UploadedFile>,
    ) -> Result<Employee, EmployeeError> {
        let uuid = parse_id(id)?;
        let existing = self
            .store
            .get(uuid)
            .await?
            .ok_or_else(|| EmployeeError::NotFound(id.to_string()))?;

        let fields = EmployeeFields::resolve(form, Some(&existing))?;

        let new_image = match &image {
            Some(file) => Some(self.uploads.save(file).await?),
            None => None,
        };

        let candidate = Employee {
            name: fields.name,
            email: fields.email.clone(),
            mobile: fields.mobile,
            designation: fields.designation,
            gender: fields.gender,
            course: fields.course,
            // the previous file is left in place when replaced
            image: new_image.clone().or(existing.image),
            ..existing
        };

        let result = self.store.replace(candidate).await;
        if !matches!(result, Ok(Some(_))) {
            if let Some(path) = &new_image {
                self.uploads.remove(path).await;
            }
        }

        match result {
            Ok(Some(updated)) => {
                tracing::info!(id = %updated.id, replaced_image = new_image.is_some(), "Employee updated");
                Ok(updated)
            }
            Ok(None) => Err(EmployeeError::NotFound(id.to_string())),
            Err(e) => Err(map_write_error(e, &fields.email)),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), EmployeeError> {
        let uuid = parse_id(id)?;
        if !self.store.delete(uuid).await? {
            return Err(EmployeeError::NotFound(id.to_string()));
        }
        tracing::info!(id = %uuid, "Employee deleted");
        Ok(())
    }

    pub async fn toggle_active(&self, id: &str) -> Result<bool, EmployeeError> {
        let uuid = parse_id(id)?;
        tracing::info!(id = %uuid, "Toggling active status");
        let active = self
            .store
            .toggle_active(uuid)
            .await?
            .ok_or_else(|| EmployeeError::NotFound(id.to_string()))?;
        Ok(active)
    }
}

/// Ids that do not parse cannot resolve to a record
fn parse_id(id: &str) -> Result<Uuid, EmployeeError> {
    Uuid::parse_str(id.trim()).map_err(|_| EmployeeError::NotFound(id.to_string()))
}

fn map_write_error(err: DatabaseError, email: &str) -> EmployeeError {
    match err {
        DatabaseError::Conflict(field) if field == "email" => EmployeeError::DuplicateEmail(email.to_string()),
        other => EmployeeError::Database(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadConfig;
    use crate::database::MemoryEmployeeStore;
    use crate::types::Course;

    fn list_config() -> ListConfig {
        ListConfig { default_limit: 10, max_limit: 100, debug_logging: false }
    }

    fn service(dir: &std::path::Path) -> EmployeeService {
        let uploads = UploadStore::new(&UploadConfig {
            dir: dir.to_path_buf(),
            mount: "uploads".to_string(),
            max_bytes: 1024,
        });
        EmployeeService::new(Arc::new(MemoryEmployeeStore::new()), uploads, list_config())
    }

    fn form(name: &str, email: &str) -> EmployeeForm {
        EmployeeForm {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            mobile: Some("9876543210".to_string()),
            designation: Some("Developer".to_string()),
            gender: Some("Female".to_string()),
            course: Some(vec!["BCA".to_string(), "MCA".to_string()]),
        }
    }

    fn params(page: &str, limit: &str) -> ListParams {
        ListParams { page: Some(page.into()), limit: Some(limit.into()), ..Default::default() }
    }

    #[test]
    fn page_window_clamps_bad_input() {
        let config = list_config();
        assert_eq!(PageWindow::resolve(None, None, &config), PageWindow { page: 1, limit: 10 });
        assert_eq!(PageWindow::resolve(Some("0"), Some("-5"), &config), PageWindow { page: 1, limit: 10 });
        assert_eq!(PageWindow::resolve(Some("abc"), Some("x"), &config), PageWindow { page: 1, limit: 10 });
        assert_eq!(PageWindow::resolve(Some("3"), Some("500"), &config), PageWindow { page: 3, limit: 100 });
        assert_eq!(PageWindow { page: 3, limit: 20 }.offset(), 40);
        assert_eq!(PageWindow { page: i64::MAX, limit: 100 }.offset(), i64::MAX);
    }

    #[tokio::test]
    async fn create_normalizes_and_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(tmp.path());

        let created = svc.create(form("  Asha Rao ", "Asha@Example.COM"), None).await.unwrap();
        assert_eq!(created.name, "Asha Rao");
        assert_eq!(created.email, "asha@example.com");
        assert!(created.active);
        assert!(created.image.is_none());
        assert!(created.course.contains(Course::Mca));

        let fetched = svc.get(&created.id.to_string()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_reports_every_invalid_field() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(tmp.path());

        let bad = EmployeeForm {
            name: Some("".into()),
            email: Some("not-an-email".into()),
            mobile: Some("12ab".into()),
            designation: Some("CEO".into()),
            gender: None,
            course: Some(vec![]),
        };
        match svc.create(bad, None).await.unwrap_err() {
            EmployeeError::Validation { message, field_errors } => {
                assert_eq!(field_errors.len(), 6);
                assert_eq!(field_errors["mobile"], "Mobile number must contain digits only");
                assert!(message.starts_with("Name is required"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_and_upload_discarded() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(tmp.path());
        svc.create(form("A", "same@example.com"), None).await.unwrap();

        let image = UploadedFile { file_name: "a.png".into(), content_type: None, bytes: b"img".to_vec() };
        let err = svc.create(form("B", "SAME@example.com"), Some(image)).await.unwrap_err();
        assert!(matches!(err, EmployeeError::DuplicateEmail(ref e) if e == "same@example.com"));

        let leftover = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(leftover, 0);
    }

    #[tokio::test]
    async fn update_merges_partial_forms() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(tmp.path());
        let created = svc.create(form("A", "a@example.com"), None).await.unwrap();
        let id = created.id.to_string();

        let image = UploadedFile { file_name: "face.jpg".into(), content_type: None, bytes: b"jpg".to_vec() };
        let patch = EmployeeForm { designation: Some("Manager".into()), ..Default::default() };
        let updated = svc.update(&id, patch, Some(image)).await.unwrap();

        assert_eq!(updated.designation, Designation::Manager);
        assert_eq!(updated.name, "A");
        assert_eq!(updated.create_date, created.create_date);
        assert!(updated.image.as_deref().unwrap().starts_with("uploads/"));

        let patch = EmployeeForm { mobile: Some("123".into()), ..Default::default() };
        assert!(matches!(svc.update(&id, patch, None).await, Err(EmployeeError::Validation { .. })));
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids_are_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(tmp.path());
        let missing = Uuid::new_v4().to_string();

        assert!(matches!(svc.get("not-a-uuid").await, Err(EmployeeError::NotFound(_))));
        assert!(matches!(svc.delete(&missing).await, Err(EmployeeError::NotFound(_))));
        assert!(matches!(svc.toggle_active(&missing).await, Err(EmployeeError::NotFound(_))));
        assert!(matches!(
            svc.update(&missing, EmployeeForm::default(), None).await,
            Err(EmployeeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_counts_totals_and_active() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(tmp.path());
        for i in 0..3 {
            svc.create(form(&format!("Emp {}", i), &format!("e{}@example.com", i)), None).await.unwrap();
        }
        let first = svc.list(&params("1", "2")).await.unwrap();
        assert_eq!(first.employees.len(), 2);
        // oldest first by default
        assert_eq!(first.employees[0].name, "Emp 0");

        assert!(!svc.toggle_active(&first.employees[0].id.to_string()).await.unwrap());

        let second = svc.list(&params("2", "2")).await.unwrap();
        assert_eq!(second.employees.len(), 1);
        assert_eq!(second.employees[0].name, "Emp 2");
        assert_eq!(second.total_employees, 3);
        assert_eq!(second.total_active_employees, 2);
        assert_eq!((second.page, second.limit), (2, 2));
    }
}
