use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{is_blank, ValidationError};

/// The logged-in account, as returned by `GET /api/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn member_since(&self) -> String {
        self.created_at.format("%b %d, %Y").to_string()
    }
}

/// Body of `PUT /api/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.username) || is_blank(&self.email) {
            return Err(ValidationError::new("Username and email are required"));
        }
        Ok(())
    }
}
