//! Authentication route handlers for admin.
//!
//! Email and password login. Logout discards the whole session.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{
    RequireAdminAuth, clear_current_admin, login_rate_limiter, set_current_admin,
};
use crate::models::{AdminUser, CurrentAdmin};
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Login body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login).layer(login_rate_limiter()))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// POST /api/admin/auth/login
#[instrument(skip_all, fields(email = %body.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AdminUser>> {
    let admin = AdminAuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    set_current_admin(&session, &CurrentAdmin::from(&admin))
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store session: {e}")))?;

    tracing::info!(admin_id = %admin.id, role = %admin.role, "Admin logged in");
    Ok(Json(admin))
}

/// POST /api/admin/auth/logout
async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_admin(&session)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to clear session: {e}")))?;
    clear_sentry_user();
    Ok(Json(json!({ "message": "Logged out" })))
}

/// The logged-in admin, re-read so role changes show up.
///
/// GET /api/admin/auth/me
async fn me(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(current): RequireAdminAuth,
) -> Result<Json<AdminUser>> {
    if let Some(admin) = AdminAuthService::new(state.pool())
        .get_admin(current.id)
        .await?
    {
        return Ok(Json(admin));
    }

    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!("Failed to clear stale admin session: {e}");
    }
    Err(AppError::Unauthorized("Admin login required".to_string()))
}
