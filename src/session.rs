//! Auth collaborator: who is signed in, if anyone.

use crate::config::UserConfig;
use crate::error::SessionError;
use crate::photo::OwnerId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: OwnerId,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_loading: bool,
}

/// Session provider consulted by the shell once per frame.
pub trait AuthProvider {
    fn state(&self) -> AuthState;

    /// Resolve any pending session work. Called before every frame.
    fn refresh(&mut self);

    fn login(&mut self) -> Result<(), SessionError>;

    fn logout(&mut self);
}

/// Single local user described by the `[user]` config section.
///
/// Starts out loading. The first `refresh` restores the previous session
/// when `remember_session` is set, otherwise it waits for an explicit login.
pub struct LocalAuth {
    config: UserConfig,
    user: Option<User>,
    is_loading: bool,
}

impl LocalAuth {
    pub fn new(config: UserConfig) -> Self {
        Self {
            config,
            user: None,
            is_loading: true,
        }
    }

    fn configured_user(&self) -> Option<User> {
        self.config.email.as_ref().map(|email| User {
            id: OwnerId::new(self.config.id.clone()),
            email: email.clone(),
        })
    }
}

impl AuthProvider for LocalAuth {
    fn state(&self) -> AuthState {
        AuthState {
            user: self.user.clone(),
            is_loading: self.is_loading,
        }
    }

    fn refresh(&mut self) {
        if self.is_loading {
            self.is_loading = false;
            if self.config.remember_session {
                self.user = self.configured_user();
                if let Some(ref user) = self.user {
                    tracing::info!("Restored session for {}", user.email);
                }
            }
        }
    }

    fn login(&mut self) -> Result<(), SessionError> {
        let user = self.configured_user().ok_or(SessionError::NotConfigured)?;
        tracing::info!("Signed in as {}", user.email);
        self.user = Some(user);
        self.is_loading = false;
        Ok(())
    }

    fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!("Signed out {}", user.email);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(email: Option<&str>, remember_session: bool) -> UserConfig {
        UserConfig {
            id: "u-1".to_string(),
            email: email.map(str::to_string),
            remember_session,
        }
    }

    #[test]
    fn test_starts_loading_then_restores() {
        let mut auth = LocalAuth::new(config(Some("me@example.com"), true));
        assert!(auth.state().is_loading);
        assert!(auth.state().user.is_none());

        auth.refresh();
        let state = auth.state();
        assert!(!state.is_loading);
        assert_eq!(state.user.unwrap().id, OwnerId::new("u-1"));
    }

    #[test]
    fn test_without_remembered_session_waits_for_login() {
        let mut auth = LocalAuth::new(config(Some("me@example.com"), false));
        auth.refresh();
        assert!(auth.state().user.is_none());

        auth.login().unwrap();
        assert_eq!(auth.state().user.unwrap().email, "me@example.com");

        auth.logout();
        assert!(auth.state().user.is_none());
        auth.refresh();
        assert!(auth.state().user.is_none());
    }

    #[test]
    fn test_login_without_user_fails() {
        let mut auth = LocalAuth::new(config(None, true));
        auth.refresh();
        assert!(auth.state().user.is_none());
        assert!(matches!(auth.login(), Err(SessionError::NotConfigured)));
    }
}
