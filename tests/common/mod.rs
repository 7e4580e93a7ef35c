#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;

use roster_api::config::{sha256_hex, AppConfig, StoreBackend};
use roster_api::database::MemoryEmployeeStore;
use roster_api::{app, AppState};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "test-password";

/// In-process server on an OS-assigned port, backed by the memory store and a temp upload dir
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub upload_dir: PathBuf,
    _uploads: TempDir,
}

pub fn test_config(upload_dir: PathBuf) -> AppConfig {
    let mut config = AppConfig::development();
    config.database.backend = StoreBackend::Memory;
    config.upload.dir = upload_dir;
    config.upload.max_bytes = 64 * 1024;
    config.list.max_limit = 50;
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.security.admin_username = ADMIN_USER.to_string();
    config.security.admin_password_sha256 = sha256_hex(ADMIN_PASSWORD);
    config
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let uploads = tempfile::tempdir().context("failed to create upload dir")?;
        let upload_dir = uploads.path().join("uploads");
        let config = test_config(upload_dir.clone());
        let state = AppState::with_store(config, Arc::new(MemoryEmployeeStore::new()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app(state)).await.expect("test server failed");
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            upload_dir,
            _uploads: uploads,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self) -> Result<String> {
        let res = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": ADMIN_USER, "password": ADMIN_PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body = res.json::<Value>().await?;
        body["token"].as_str().map(str::to_string).context("login response has no token")
    }

    /// Server plus a valid bearer token
    pub async fn spawn_authenticated() -> Result<(Self, String)> {
        let server = Self::spawn().await?;
        let token = server.login().await?;
        Ok((server, token))
    }

    pub async fn create(&self, token: &str, form: Form) -> Result<reqwest::Response> {
        Ok(self.client.post(self.url("/employees")).bearer_auth(token).multipart(form).send().await?)
    }

    /// Create and return the employee JSON, failing unless the server answered 201
    pub async fn create_employee(&self, token: &str, name: &str, email: &str) -> Result<Value> {
        let res = self.create(token, employee_form(name, email)).await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create failed with {}: {}", status, body);
        Ok(body["employee"].clone())
    }

    pub async fn get_json(&self, token: &str, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.get(self.url(path)).bearer_auth(token).send().await?;
        let status = res.status();
        Ok((status, res.json::<Value>().await?))
    }

    pub async fn update(&self, token: &str, id: &str, form: Form) -> Result<(StatusCode, Value)> {
        let res = self
            .client
            .put(self.url(&format!("/employees/{}", id)))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let status = res.status();
        Ok((status, res.json::<Value>().await?))
    }

    pub async fn toggle(&self, token: &str, id: &str) -> Result<(StatusCode, Value)> {
        let res = self
            .client
            .put(self.url(&format!("/employees/{}/active", id)))
            .bearer_auth(token)
            .send()
            .await?;
        let status = res.status();
        Ok((status, res.json::<Value>().await?))
    }
}

/// A complete, valid create form
pub fn employee_form(name: &str, email: &str) -> Form {
    Form::new()
        .text("name", name.to_string())
        .text("email", email.to_string())
        .text("mobile", "9876543210")
        .text("designation", "Developer")
        .text("gender", "Female")
        .text("course", "BCA")
}

pub fn image_part(file_name: &str, bytes: &[u8]) -> Part {
    Part::bytes(bytes.to_vec())
        .file_name(file_name.to_string())
        .mime_str("image/png")
        .expect("valid mime type")
}
