//! Customer queries submitted through the contact form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CustomerQueryId, Email, EmailError, QueryStatus, UserId};

/// Maximum accepted message length in characters.
pub const MAX_MESSAGE_LEN: usize = 5000;

/// A stored customer query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerQuery {
    pub id: CustomerQueryId,
    /// Set when the query was sent by a signed-in customer.
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
    pub status: QueryStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Validation failures for a new query.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("message must be at most {MAX_MESSAGE_LEN} characters")]
    MessageTooLong,

    #[error(transparent)]
    Email(#[from] EmailError),
}

/// A contact form submission before it is stored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomerQuery {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

/// A validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidQuery {
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
}

impl NewCustomerQuery {
    /// Trim fields and check they are present.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` if the name, email or message is missing, the
    /// email is malformed, or the message is too long.
    pub fn validate(self) -> Result<ValidQuery, QueryError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(QueryError::Missing("name"));
        }
        if self.email.trim().is_empty() {
            return Err(QueryError::Missing("email"));
        }
        let email = Email::parse(&self.email)?;
        let message = self.message.trim();
        if message.is_empty() {
            return Err(QueryError::Missing("message"));
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(QueryError::MessageTooLong);
        }
        let subject = match self.subject.trim() {
            "" => "General enquiry",
            s => s,
        };
        Ok(ValidQuery {
            name: name.to_owned(),
            email,
            subject: subject.to_owned(),
            message: message.to_owned(),
        })
    }
}
