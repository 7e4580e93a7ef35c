use anyhow::{bail, Context};
use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use crate::database::Employee;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeList {
    pub employees: Vec<Employee>,
    pub total_employees: i64,
    pub total_active_employees: i64,
    pub page: i64,
    pub limit: i64,
}

/// Query options for `GET /employees`
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
}

impl ListOptions {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(field) = &self.sort_field {
            query.push(("sortField", field.clone()));
        }
        if let Some(order) = &self.sort_order {
            query.push(("sortOrder", order.clone()));
        }
        query
    }
}

/// Text fields of a create or update; `None` fields are not sent
#[derive(Debug, Clone, Default)]
pub struct EmployeeFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub designation: Option<String>,
    pub gender: Option<String>,
    pub courses: Vec<String>,
}

impl EmployeeFields {
    async fn into_form(self, image: Option<&Path>) -> anyhow::Result<multipart::Form> {
        let mut form = multipart::Form::new();
        let text_fields = [
            ("name", self.name),
            ("email", self.email),
            ("mobile", self.mobile),
            ("designation", self.designation),
            ("gender", self.gender),
        ];
        for (key, value) in text_fields {
            if let Some(value) = value {
                form = form.text(key, value);
            }
        }
        for course in self.courses {
            form = form.text("course", course);
        }
        if let Some(path) = image {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read image {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            form = form.part("image", multipart::Part::bytes(bytes).file_name(file_name));
        }
        Ok(form)
    }
}

fn http_client() -> anyhow::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")
}

/// Unauthenticated access: login and health
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self { base_url: base_url.into(), http: http_client()? })
    }

    pub async fn login(&self, username: &str, password: &str) -> anyhow::Result<LoginResponse> {
        let request = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&serde_json::json!({ "username": username, "password": password }));
        send_json(request).await
    }

    pub async fn health(&self) -> anyhow::Result<Value> {
        send_json(self.http.get(format!("{}/health", self.base_url))).await
    }

    /// Attach a token to get access to the protected routes
    pub fn authenticate(self, token: impl Into<String>) -> AuthenticatedClient {
        AuthenticatedClient { base_url: self.base_url, token: token.into(), http: self.http }
    }
}

/// A server URL plus bearer token; every employee call goes through one of these
pub struct AuthenticatedClient {
    base_url: String,
    token: String,
    http: Client,
}

impl AuthenticatedClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> anyhow::Result<Self> {
        Ok(ApiClient::new(base_url)?.authenticate(token))
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(format!("{}{}", self.base_url, path)).bearer_auth(&self.token)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(format!("{}{}", self.base_url, path)).bearer_auth(&self.token)
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.http.put(format!("{}{}", self.base_url, path)).bearer_auth(&self.token)
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(format!("{}{}", self.base_url, path)).bearer_auth(&self.token)
    }

    pub async fn whoami(&self) -> anyhow::Result<Value> {
        send_json(self.get("/auth/whoami")).await
    }

    pub async fn list_employees(&self, options: &ListOptions) -> anyhow::Result<EmployeeList> {
        send_json(self.get("/employees").query(&options.to_query())).await
    }

    pub async fn get_employee(&self, id: &str) -> anyhow::Result<Employee> {
        send_json(self.get(&format!("/employees/{}", id))).await
    }

    pub async fn create_employee(&self, fields: EmployeeFields, image: Option<&Path>) -> anyhow::Result<Employee> {
        #[derive(Deserialize)]
        struct Created {
            employee: Employee,
        }
        let form = fields.into_form(image).await?;
        let created: Created = send_json(self.post("/employees").multipart(form)).await?;
        Ok(created.employee)
    }

    pub async fn update_employee(
        &self,
        id: &str,
        fields: EmployeeFields,
        image: Option<&Path>,
    ) -> anyhow::Result<Employee> {
        let form = fields.into_form(image).await?;
        send_json(self.put(&format!("/employees/{}", id)).multipart(form)).await
    }

    pub async fn delete_employee(&self, id: &str) -> anyhow::Result<String> {
        let body: Value = send_json(self.delete(&format!("/employees/{}", id))).await?;
        Ok(message_of(&body).unwrap_or("Employee deleted").to_string())
    }

    /// Returns the new `active` value
    pub async fn toggle_active(&self, id: &str) -> anyhow::Result<bool> {
        let body: Value = send_json(self.put(&format!("/employees/{}/active", id))).await?;
        body.get("active")
            .and_then(Value::as_bool)
            .context("response did not include the active flag")
    }
}

fn message_of(body: &Value) -> Option<&str> {
    body.get("message").and_then(Value::as_str)
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> anyhow::Result<T> {
    let response = request.send().await.context("request failed")?;
    decode(response).await
}

async fn decode<T: DeserializeOwned>(response: Response) -> anyhow::Result<T> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.context("invalid response body");
    }

    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = message_of(&body).unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed"));
    match status {
        StatusCode::UNAUTHORIZED => bail!("{} (run `roster auth login` to get a new token)", message),
        _ => bail!("{} ({})", message, status.as_u16()),
    }
}
