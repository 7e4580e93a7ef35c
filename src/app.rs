use axum::{
    extract::{DefaultBodyLimit, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::{Environment, SecurityConfig};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Headroom on top of the upload limit for the text fields and multipart framing
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn app(state: AppState) -> Router {
    let body_limit = state.config.upload.max_bytes.saturating_add(FORM_OVERHEAD_BYTES);
    let uploads_mount = format!("/{}", state.employees.uploads().mount());
    let uploads_dir = state.employees.uploads().dir().to_path_buf();

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected
        .merge(protected_routes(state.clone(), body_limit))
        // Uploaded images are served without auth
        .nest_service(&uploads_mount, ServeDir::new(uploads_dir))
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.environment, &state.config.security)),
        )
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(public::auth::login_post))
}

fn protected_routes(state: AppState, body_limit: usize) -> Router<AppState> {
    use protected::employees;

    Router::new()
        .route(
            "/employees",
            get(employees::collection_get).post(employees::collection_post),
        )
        .route(
            "/employees/:id",
            get(employees::record_get)
                .put(employees::record_put)
                .delete(employees::record_delete),
        )
        .route("/employees/:id/active", put(employees::active_put))
        .route("/auth/whoami", get(protected::auth::whoami_get))
        .layer(DefaultBodyLimit::max(body_limit))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

/// Permissive in development; otherwise only the configured origins
fn cors_layer(environment: &Environment, security: &SecurityConfig) -> CorsLayer {
    if matches!(environment, Environment::Development) || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{}': {}", o, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let uploads = format!("/{}/:file (public)", state.employees.uploads().mount());

    Json(json!({
        "name": "Roster API",
        "version": version,
        "description": "Employee record management backend",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "login": "/auth/login (public - token acquisition)",
            "whoami": "/auth/whoami (protected)",
            "employees": "/employees[/:id[/active]] (protected)",
            "uploads": uploads,
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.employees.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": "unavailable"
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::MemoryEmployeeStore;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let mut config = AppConfig::development();
        config.upload.dir = std::env::temp_dir().join("roster-api-router-test");
        app(AppState::with_store(config, Arc::new(MemoryEmployeeStore::new())))
    }

    #[tokio::test]
    async fn health_is_public() {
        let res = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn employee_routes_reject_missing_token() {
        for (method, uri) in [
            ("GET", "/employees"),
            ("POST", "/employees"),
            ("GET", "/employees/abc"),
            ("PUT", "/employees/abc/active"),
            ("GET", "/auth/whoami"),
        ] {
            let res = test_app()
                .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        }
    }

    #[tokio::test]
    async fn unknown_routes_are_not_gated() {
        let res = test_app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
