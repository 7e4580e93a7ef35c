use axum::extract::multipart::{Field, Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;

use crate::error::ApiError;
use crate::services::{EmployeeForm, UploadedFile};

/// Decoded multipart body of a create or update request
#[derive(Debug, Default)]
pub struct EmployeeMultipart {
    pub form: EmployeeForm,
    pub image: Option<UploadedFile>,
}

/// Reads the employee form fields and optional `image` file part.
///
/// `course` may repeat (also sent as `course[]`). A file part with no name or
/// no bytes counts as no file. Unknown fields are ignored.
pub async fn read_employee_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<EmployeeMultipart, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let mut parsed = EmployeeMultipart::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => parsed.image = read_file(field).await?.or(parsed.image),
            "course" | "course[]" => {
                let value = field.text().await.map_err(multipart_error)?;
                parsed.form.course.get_or_insert_with(Vec::new).push(value);
            }
            "name" => parsed.form.name = Some(field.text().await.map_err(multipart_error)?),
            "email" => parsed.form.email = Some(field.text().await.map_err(multipart_error)?),
            "mobile" => parsed.form.mobile = Some(field.text().await.map_err(multipart_error)?),
            "designation" => parsed.form.designation = Some(field.text().await.map_err(multipart_error)?),
            "gender" => parsed.form.gender = Some(field.text().await.map_err(multipart_error)?),
            other => tracing::debug!("Ignoring form field {:?}", other),
        }
    }

    Ok(parsed)
}

async fn read_file(field: Field<'_>) -> Result<Option<UploadedFile>, ApiError> {
    let file_name = field.file_name().map(str::to_string).filter(|n| !n.is_empty());
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(multipart_error)?;

    Ok(match file_name {
        Some(file_name) if !bytes.is_empty() => Some(UploadedFile { file_name, content_type, bytes: bytes.to_vec() }),
        _ => None,
    })
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::field_error("image", "File too large");
    }
    ApiError::bad_request(err.body_text())
}
