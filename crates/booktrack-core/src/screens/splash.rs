use tracing::warn;

use crate::auth::Session;

use super::{Notice, Outcome, Route, Transition};

/// First screen on launch: decides between login and the main view.
pub struct SplashScreen;

impl SplashScreen {
    pub fn resolve(session: &Session) -> Outcome {
        match session.restore() {
            Ok(Some(_)) => Outcome::to(Transition::Reset(Route::Home)),
            Ok(None) => Outcome::to(Transition::Reset(Route::Login)),
            Err(e) => {
                warn!(error = %e, "Could not read saved session");
                Outcome::to(Transition::Reset(Route::Login))
                    .with_notice(Notice::error("Could not access saved login on this device"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryTokenStore, TokenStore};

    #[test]
    fn test_no_token_goes_to_login() {
        let out = SplashScreen::resolve(&Session::in_memory());
        assert_eq!(out.transition, Transition::Reset(Route::Login));
        assert!(out.notice.is_none());
    }

    #[test]
    fn test_saved_token_goes_home() {
        let store = MemoryTokenStore::new();
        store.set_token("abc").unwrap();
        let session = Session::new(store);
        let out = SplashScreen::resolve(&session);
        assert_eq!(out.transition, Transition::Reset(Route::Home));
        assert!(session.is_active());
    }
}
