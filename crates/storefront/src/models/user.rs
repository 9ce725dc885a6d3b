//! Customer account types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clothesline_core::{Email, UserId};

/// A registered customer.
///
/// The password hash is never part of this type; it is loaded separately by
/// the login path only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
