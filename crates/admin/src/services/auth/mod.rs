//! Admin authentication service.
//!
//! Email and password login for back-office accounts. Accounts are created
//! from the command line, never through the HTTP API.

mod error;

pub use error::AdminAuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use clothesline_core::{AdminRole, AdminUserId, Email};

use crate::db::{AdminUserRepository, RepositoryError};
use crate::models::AdminUser;

/// Minimum admin password length.
const MIN_PASSWORD_LENGTH: usize = 12;

const MAX_PASSWORD_LENGTH: usize = 128;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: AdminUserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: AdminUserRepository::new(pool),
        }
    }

    /// Check an email and password and record the login.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` if the email is unknown or
    /// the password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;

        let (admin, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;
        self.users.touch_last_login(admin.id).await?;

        Ok(admin)
    }

    /// Look up an admin by id.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::Repository` if the lookup fails.
    pub async fn get_admin(&self, id: AdminUserId) -> Result<Option<AdminUser>, AdminAuthError> {
        Ok(self.users.get_by_id(id).await?)
    }

    /// Create a back-office account.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::MissingName`, `AdminAuthError::InvalidEmail` or
    /// `AdminAuthError::WeakPassword` for bad input, and
    /// `AdminAuthError::UserAlreadyExists` if the email is taken.
    pub async fn create_admin(
        &self,
        email: &str,
        name: &str,
        role: AdminRole,
        password: &str,
    ) -> Result<AdminUser, AdminAuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AdminAuthError::MissingName);
        }
        let email = Email::parse(email)?;
        let password_hash = hash_password(password)?;

        self.users
            .create(&email, name, role, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AdminAuthError::UserAlreadyExists,
                other => AdminAuthError::Repository(other),
            })
    }
}

/// Validate and hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AdminAuthError::WeakPassword` if the password is too short or too
/// long.
pub fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(AdminAuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(AdminAuthError::WeakPassword(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AdminAuthError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AdminAuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_short_admin_password_rejected() {
        assert!(matches!(
            hash_password("eleven char"),
            Err(AdminAuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("a long admin secret").unwrap();
        assert!(verify_password("a long admin secret", &hash).is_ok());
        assert!(matches!(
            verify_password("a long admin guess!", &hash),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }
}
