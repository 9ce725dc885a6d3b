//! Customer authentication routes.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Registration body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Forgot-password body.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset-password body.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

const RESET_REQUESTED: &str =
    "If an account exists for that email, a password reset link has been sent";

/// Create an account and log in.
///
/// POST /api/auth/register
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = AuthService::new(state.pool())
        .register(&body.name, &body.email, &body.password)
        .await?;
    start_session(&session, &user).await?;

    tracing::info!(user_id = %user.id, "Customer registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in with email and password.
///
/// POST /api/auth/login
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;
    start_session(&session, &user).await?;

    tracing::info!(user_id = %user.id, "Customer logged in");
    Ok(Json(user))
}

/// POST /api/auth/logout
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to clear session: {e}")))?;
    clear_sentry_user();
    Ok(Json(json!({ "message": "Logged out" })))
}

/// The logged-in customer.
///
/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Json<User>> {
    if let Some(user) = AuthService::new(state.pool()).get_user(current.id).await? {
        return Ok(Json(user));
    }

    // Account deleted while the session was alive.
    if let Err(e) = clear_current_user(&session).await {
        tracing::warn!("Failed to clear stale session: {e}");
    }
    Err(AppError::Unauthorized("Authentication required".to_string()))
}

/// Email a password reset link.
///
/// Answers the same whether or not the account exists.
///
/// POST /api/auth/forgot-password
#[instrument(skip(state, body))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ForgotPasswordRequest>,
) -> Result<Json<Value>> {
    let issued = AuthService::new(state.pool())
        .start_password_reset(&body.email)
        .await?;

    match (issued, state.email().cloned()) {
        (Some((user, token)), Some(email)) => {
            tokio::spawn(async move {
                if let Err(e) = email
                    .send_password_reset(user.email.as_str(), &user.name, &token)
                    .await
                {
                    tracing::error!(user_id = %user.id, "Failed to send password reset email: {e}");
                }
            });
        }
        (Some((user, _)), None) => {
            tracing::warn!(user_id = %user.id, "Password reset requested but email is not configured");
        }
        (None, _) => {}
    }

    Ok(Json(json!({ "message": RESET_REQUESTED })))
}

/// Set a new password with a reset token.
///
/// POST /api/auth/reset-password
#[instrument(skip(state, body))]
pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ResetPasswordRequest>,
) -> Result<Json<Value>> {
    let user_id = AuthService::new(state.pool())
        .reset_password(&body.token, &body.password)
        .await?;

    tracing::info!(%user_id, "Password reset");
    Ok(Json(json!({ "message": "Password has been reset" })))
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user))
        .await
        .map_err(|e| AppError::Internal(format!("Failed to set session: {e}")))
}
