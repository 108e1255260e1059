use tracing::warn;

use crate::api::ApiClient;
use crate::api::ApiError;
use crate::models::Registration;

use super::{Notice, Outcome, Route, Transition};

const DEFAULT_SUCCESS_MESSAGE: &str = "Registration successful!";

#[derive(Debug, Clone, Default)]
pub struct RegisterScreen {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterScreen {
    /// On success the form is cleared and the user is sent to login.
    pub async fn submit(&mut self, client: &ApiClient) -> Outcome {
        let registration = Registration {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            email: self.email.trim().to_string(),
        };

        match client.register(&registration).await {
            Ok(message) => {
                *self = Self::default();
                let message = if message.trim().is_empty() {
                    DEFAULT_SUCCESS_MESSAGE.to_string()
                } else {
                    message
                };
                Outcome::to(Transition::Navigate(Route::Login)).with_notice(Notice::success(message))
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                Outcome::stay().with_notice(Self::failure_notice(&e))
            }
        }
    }

    fn failure_notice(err: &ApiError) -> Notice {
        match err {
            ApiError::Validation(e) => Notice::titled_error("Validation Error", e.message()),
            ApiError::Server { status: 400, message } => {
                Notice::error(format!("Validation Error: {}", message))
            }
            ApiError::Server { status: 404, .. } => {
                Notice::error("Route not found. Please check the API URL or endpoint.")
            }
            ApiError::Server { status: 500, .. } => {
                Notice::error("Server Error. Please try again later.")
            }
            ApiError::Server { .. } => {
                Notice::error("Registration failed. Please check your inputs and try again.")
            }
            ApiError::Network(_) => Notice::error("Network error. Please check your connection."),
            other => Notice::error(other.user_message()),
        }
    }
}
