//! Back-office account types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clothesline_core::{AdminUserId, Email};

pub use clothesline_core::AdminRole;

/// A back-office account. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
