//! UI-agnostic view-models for each screen of the app.
//!
//! A front end owns one of these per visible screen, binds its input widgets
//! to the public form fields, and calls an action when the user submits. Every
//! action returns an [`Outcome`]: where to navigate next and what, if anything,
//! to show in an alert.
//!
//! Actions take `&mut self`, so a screen can never have two of its own
//! submissions in flight at once. Form fields are only cleared after the
//! server has confirmed the change.

pub mod book_detail;
pub mod home;
pub mod login;
pub mod profile;
pub mod register;
pub mod splash;

#[cfg(test)]
pub(crate) mod testing;

pub use book_detail::BookDetailScreen;
pub use home::{BookRow, HomeScreen};
pub use login::LoginScreen;
pub use profile::ProfileScreen;
pub use register::RegisterScreen;
pub use splash::SplashScreen;

use crate::api::ApiError;
use crate::models::Book;

/// A place in the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Splash,
    Login,
    Register,
    /// Main tabs, book list first.
    Home,
    Profile,
    BookDetail(Book),
}

/// How the navigation stack changes after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Navigate(Route),
    /// Replace the whole stack, e.g. after login or logout.
    Reset(Route),
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// An alert to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: "Success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::titled_error("Error", message)
    }

    pub fn titled_error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// How an action reads in error notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Action {
    /// Completes "You must be logged in to ...".
    pub(crate) gated: &'static str,
    /// Completes "Failed to ...: <reason>".
    pub(crate) failed: &'static str,
}

impl Action {
    pub(crate) const fn new(gated: &'static str, failed: &'static str) -> Self {
        Self { gated, failed }
    }
}

/// Result of a screen action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub transition: Transition,
    pub notice: Option<Notice>,
}

impl Outcome {
    pub fn stay() -> Self {
        Self {
            transition: Transition::Stay,
            notice: None,
        }
    }

    pub fn to(transition: Transition) -> Self {
        Self {
            transition,
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    /// Stay put and show an error.
    pub fn error(message: impl Into<String>) -> Self {
        Self::stay().with_notice(Notice::error(message))
    }

    /// Map a failed authenticated action to an outcome.
    pub(crate) fn from_error(err: &ApiError, action: Action) -> Self {
        match err {
            ApiError::Validation(e) => Self::error(e.message()),
            ApiError::Unauthenticated => Self::to(Transition::Reset(Route::Login))
                .with_notice(Notice::error(format!("You must be logged in to {}", action.gated))),
            e if e.requires_login() => Self::to(Transition::Reset(Route::Login)).with_notice(
                Notice::error(format!("Your session has expired. {}", e.user_message())),
            ),
            e => Self::error(format!("Failed to {}: {}", action.failed, e.user_message())),
        }
    }

    pub fn is_error(&self) -> bool {
        self.notice.as_ref().is_some_and(Notice::is_error)
    }
}
