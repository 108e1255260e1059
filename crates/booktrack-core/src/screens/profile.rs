use tracing::warn;

use crate::api::ApiClient;
use crate::models::{ProfileUpdate, UserProfile};

use super::{Action, Notice, Outcome, Route, Transition};

const VIEW_PROFILE: Action = Action::new("view your profile", "load profile");
const UPDATE_PROFILE: Action = Action::new("update your profile", "update profile");

/// Account details, profile editing, and logout.
#[derive(Debug, Clone, Default)]
pub struct ProfileScreen {
    profile: Option<UserProfile>,
    pub username: String,
    pub email: String,
    error: Option<String>,
}

impl ProfileScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Inline error shown in place of the profile.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn show(&mut self, profile: UserProfile) {
        self.username = profile.username.clone();
        self.email = profile.email.clone();
        self.profile = Some(profile);
        self.error = None;
    }

    pub async fn load(&mut self, client: &ApiClient) -> Outcome {
        match client.fetch_profile().await {
            Ok(profile) => {
                self.show(profile);
                Outcome::stay()
            }
            Err(e) if e.requires_login() => Outcome::from_error(&e, VIEW_PROFILE),
            Err(e) => {
                warn!(error = %e, "Failed to load profile");
                self.error = Some("Failed to load profile".to_string());
                Outcome::stay()
            }
        }
    }

    pub async fn update(&mut self, client: &ApiClient) -> Outcome {
        let update = ProfileUpdate {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
        };
        match client.update_profile(&update).await {
            Ok(profile) => {
                self.show(profile);
                Outcome::stay().with_notice(Notice::success("Profile updated"))
            }
            Err(e) if e.requires_login() => Outcome::from_error(&e, UPDATE_PROFILE),
            Err(e) => {
                warn!(error = %e, "Failed to update profile");
                Outcome::error(format!("Failed to update profile: {}", e.user_message()))
            }
        }
    }

    pub fn logout(&mut self, client: &ApiClient) -> Outcome {
        match client.logout() {
            Ok(()) => {
                *self = Self::default();
                Outcome::to(Transition::Reset(Route::Login))
            }
            Err(e) => Outcome::error(e.user_message()),
        }
    }
}
