use tracing::info;

use crate::api::ApiClient;
use crate::models::Credentials;

use super::{Outcome, Route, Transition};

#[derive(Debug, Clone, Default)]
pub struct LoginScreen {
    pub username: String,
    pub password: String,
}

impl LoginScreen {
    /// Pre-fill the username, e.g. with the last one used.
    pub fn new(username: Option<String>) -> Self {
        Self {
            username: username.unwrap_or_default(),
            password: String::new(),
        }
    }

    pub async fn submit(&mut self, client: &ApiClient) -> Outcome {
        let credentials = Credentials::new(self.username.trim(), self.password.clone());
        match client.login(&credentials).await {
            Ok(_) => {
                info!(username = %credentials.username, "Login succeeded");
                self.password.clear();
                Outcome::to(Transition::Reset(Route::Home))
            }
            // Login failures never redirect; the user is already here
            Err(e) => Outcome::error(e.user_message()),
        }
    }

    pub fn go_to_register(&self) -> Outcome {
        Outcome::to(Transition::Navigate(Route::Register))
    }
}
