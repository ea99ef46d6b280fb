use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single anonymous message as persisted in the store document.
///
/// Field names match the flat JSON layout on disk; `timestamp_utc` is
/// RFC 3339 in UTC.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoredMessage {
    pub message: String,
    pub sensitivity: String,
    pub delivery: String,
    pub timestamp_utc: DateTime<Utc>,
}

/// Form body of `POST /submit-message`.
#[derive(Debug, Deserialize, Validate)]
pub struct MessageSubmission {
    #[serde(rename = "user-code")]
    pub user_code: String,
    #[serde(rename = "anon-message")]
    #[validate(length(min = 1, message = "Message cannot be empty."))]
    pub anon_message: String,
    pub sensitivity: String,
    pub delivery: String,
}

/// Form body of `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(rename = "user-code")]
    pub user_code: String,
}
