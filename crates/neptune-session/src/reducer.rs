//! Auth events and the pure transition function.
//!
//! Every credential change goes through [`reduce`]. Storage writes are not
//! performed here; each event names the [`StorageEffect`] the session store
//! applies after the transition.

use crate::credential::{Credential, UserIdentity};

/// Event driving the auth state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// A login request was submitted.
    LoginRequested,

    /// The server accepted the credentials.
    LoginSucceeded { identity: UserIdentity, token: String },

    /// The login request failed (rejected or unreachable server). Any
    /// earlier session is dropped along with the in-memory token.
    LoginFailed { error: String },

    /// Logout finished locally. Emitted whatever the remote call returned.
    LogoutCompleted,
}

/// Durable storage side effect attached to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageEffect {
    /// Write the new credential under the session key.
    Persist,
    /// Delete the session key.
    Remove,
}

impl AuthEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LoginRequested => "LOGIN_REQUEST",
            Self::LoginSucceeded { .. } => "LOGIN_SUCCESS",
            Self::LoginFailed { .. } => "LOGIN_ERROR",
            Self::LogoutCompleted => "LOGOUT_COMPLETED",
        }
    }

    pub const fn storage_effect(&self) -> Option<StorageEffect> {
        match self {
            Self::LoginSucceeded { .. } => Some(StorageEffect::Persist),
            Self::LoginFailed { .. } | Self::LogoutCompleted => Some(StorageEffect::Remove),
            Self::LoginRequested => None,
        }
    }
}

/// Compute the credential that follows `event`.
pub fn reduce(state: &Credential, event: &AuthEvent) -> Credential {
    match event {
        AuthEvent::LoginRequested => Credential {
            pending: true,
            ..state.clone()
        },
        AuthEvent::LoginSucceeded { identity, token } => Credential {
            identity: Some(identity.clone()),
            token: Some(token.clone()),
            pending: false,
            last_error: None,
        },
        AuthEvent::LoginFailed { error } => Credential {
            identity: None,
            token: None,
            pending: false,
            last_error: Some(error.clone()),
        },
        AuthEvent::LogoutCompleted => Credential::anonymous(),
    }
}
