//! Async login/logout flows.

use crate::api::AuthApi;
use crate::credential::{AuthPhase, Credential};
use crate::gate::Access;
use crate::reducer::AuthEvent;
use crate::storage::KeyValueStore;
use crate::store::SessionStore;

/// Drives the session store against the remote auth endpoint.
///
/// Taking `&mut self` for each flow means at most one login or logout is in
/// flight per session.
#[derive(Debug)]
pub struct SessionController<A, S> {
    api: A,
    store: SessionStore<S>,
}

impl<A: AuthApi, S: KeyValueStore> SessionController<A, S> {
    /// Create a controller, rehydrating any persisted credential.
    pub fn new(api: A, storage: S) -> Self {
        Self {
            api,
            store: SessionStore::rehydrate(storage),
        }
    }

    pub fn with_store(api: A, store: SessionStore<S>) -> Self {
        Self { api, store }
    }

    pub fn credential(&self) -> &Credential {
        self.store.credential()
    }

    pub fn phase(&self) -> AuthPhase {
        self.store.phase()
    }

    pub fn access(&self) -> Access {
        self.store.access()
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Log in. The outcome is reported through the returned credential:
    /// a token on success, `last_error` on failure.
    pub async fn login(&mut self, email: &str, password: &str) -> &Credential {
        self.store.dispatch(AuthEvent::LoginRequested);

        let event = match self.api.login(email, password).await {
            Ok(response) => {
                tracing::info!(user_id = ?response.user.id(), "Logged in");
                AuthEvent::LoginSucceeded {
                    identity: response.user,
                    token: response.token,
                }
            }
            Err(error) => {
                tracing::warn!(%error, "Login failed");
                AuthEvent::LoginFailed {
                    error: error.user_message(),
                }
            }
        };

        self.store.dispatch(event)
    }

    /// Log out. Always ends anonymous with the persisted entry removed; the
    /// remote revocation is best effort and its failure is not surfaced.
    pub async fn logout(&mut self) -> &Credential {
        if let Some(token) = self.store.credential().token.clone()
            && let Err(error) = self.api.logout(&token).await
        {
            tracing::debug!(%error, "Remote logout failed, completing locally");
        }
        tracing::info!("Logged out");
        self.store.dispatch(AuthEvent::LogoutCompleted)
    }

    /// Drop the session without contacting the server.
    pub fn clear(&mut self) -> &Credential {
        self.store.clear()
    }
}
