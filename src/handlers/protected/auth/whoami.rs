use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::middleware::AuthUser;

/// GET /auth/whoami - Identity and expiry of the presented token
pub async fn whoami_get(Extension(user): Extension<AuthUser>) -> Json<Value> {
    Json(json!({
        "username": user.username,
        "expiresAt": user.expires_at,
    }))
}
