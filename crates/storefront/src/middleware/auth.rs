//! Authentication extractors.
//!
//! The logged-in customer is stored in the session under
//! [`session_keys::CURRENT_USER`]. Handlers take [`RequireAuth`] to demand a
//! login or [`OptionalAuth`] to branch on one.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use clothesline_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a logged-in customer.
///
/// Rejects with a JSON 401 when there is no session or no user in it.
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> String {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl RequireAuth {
    /// Reject unless the logged-in user is `owner`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when acting on another user's data.
    pub fn ensure_owner(&self, owner: UserId) -> Result<(), AppError> {
        if self.0.id == owner {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have access to this resource".to_string(),
            ))
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAuth(user) = OptionalAuth::from_request_parts(parts, state)
            .await
            .unwrap_or(OptionalAuth(None));
        let user = user.ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        set_sentry_user(&user.id, Some(user.email.as_str()));
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current customer.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self(None));
        };
        let user = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .inspect_err(|e| tracing::warn!("Failed to read session: {e}"))
            .ok()
            .flatten();

        Ok(Self(user))
    }
}

/// Store the logged-in user in the session.
///
/// Rotates the session id first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Log out by discarding the whole session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;
    use clothesline_core::Email;

    use super::*;

    fn user(id: i32) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            name: "Jane".to_string(),
            email: Email::parse("jane@example.com").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_require_auth_without_session_is_unauthorized() {
        let (mut parts, ()) = Request::new(()).into_parts();
        let rejection = RequireAuth::from_request_parts(&mut parts, &()).await.err().unwrap();
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_optional_auth_without_session_is_none() {
        let (mut parts, ()) = Request::new(()).into_parts();
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(user.is_none());
    }

    #[test]
    fn test_ensure_owner() {
        let auth = RequireAuth(user(7));
        assert!(auth.ensure_owner(UserId::new(7)).is_ok());
        let err = auth.ensure_owner(UserId::new(8)).unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }
}
