//! Login and registration payloads.

use serde::{Deserialize, Serialize};

use super::{is_blank, ValidationError};

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.username) || self.password.is_empty() {
            return Err(ValidationError::new("Please fill in all fields"));
        }
        Ok(())
    }
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl Registration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.username) || self.password.is_empty() || is_blank(&self.email) {
            return Err(ValidationError::new("All fields are required."));
        }
        Ok(())
    }
}

/// `data` of a successful login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub token: String,
}
