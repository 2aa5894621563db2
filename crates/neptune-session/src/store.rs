//! Session store: the credential plus its durable storage.
//!
//! The store is the only owner of the credential. It runs events through
//! the pure reducer and then applies the storage effect the event names.
//! Storage failures are logged and swallowed; they never change the
//! outcome of a transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credential::{AuthPhase, Credential, UserIdentity};
use crate::gate::{Access, gate};
use crate::reducer::{AuthEvent, StorageEffect, reduce};
use crate::storage::KeyValueStore;

/// Storage key the credential is persisted under.
pub const SESSION_KEY: &str = "authentication";

/// Version of the persisted credential layout.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// On-disk form of an authenticated credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedCredential {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub identity: Option<UserIdentity>,
    pub token: String,
}

impl PersistedCredential {
    fn from_credential(credential: &Credential) -> Option<Self> {
        let token = credential.token.clone()?;
        Some(Self {
            version: CURRENT_SCHEMA_VERSION,
            saved_at: Utc::now(),
            identity: credential.identity.clone(),
            token,
        })
    }

    fn into_credential(self) -> Credential {
        Credential {
            identity: self.identity,
            token: Some(self.token),
            pending: false,
            last_error: None,
        }
    }
}

/// Owns the session credential and applies storage side effects.
#[derive(Debug)]
pub struct SessionStore<S> {
    credential: Credential,
    storage: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Start with an empty credential, ignoring anything persisted.
    pub fn new(storage: S) -> Self {
        Self {
            credential: Credential::anonymous(),
            storage,
        }
    }

    /// Start from the persisted credential, if a valid one exists.
    ///
    /// Absent, unreadable, malformed or future-version entries all yield an
    /// anonymous session.
    pub fn rehydrate(storage: S) -> Self {
        let credential = load_credential(&storage).unwrap_or_default();
        tracing::debug!(phase = %credential.phase(), "Rehydrated session");
        Self {
            credential,
            storage,
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn phase(&self) -> AuthPhase {
        self.credential.phase()
    }

    pub fn access(&self) -> Access {
        gate(&self.credential)
    }

    pub fn authorization_header(&self) -> Option<String> {
        self.credential.authorization_header()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply `event` and its storage effect.
    pub fn dispatch(&mut self, event: AuthEvent) -> &Credential {
        self.credential = reduce(&self.credential, &event);
        tracing::debug!(event = event.name(), phase = %self.credential.phase(), "Auth transition");

        match event.storage_effect() {
            Some(StorageEffect::Persist) => self.persist(),
            Some(StorageEffect::Remove) => self.forget(),
            None => {}
        }
        &self.credential
    }

    /// Drop the session locally without contacting the server.
    pub fn clear(&mut self) -> &Credential {
        self.dispatch(AuthEvent::LogoutCompleted)
    }

    fn persist(&self) {
        let Some(record) = PersistedCredential::from_credential(&self.credential) else {
            return;
        };
        let result = serde_json::to_string(&record)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.storage
                    .set(SESSION_KEY, &json)
                    .map_err(|e| e.to_string())
            });
        if let Err(error) = result {
            tracing::warn!(%error, "Failed to persist session credential");
        }
    }

    fn forget(&self) {
        if let Err(error) = self.storage.remove(SESSION_KEY) {
            tracing::warn!(%error, "Failed to remove persisted session credential");
        }
    }
}

fn load_credential<S: KeyValueStore>(storage: &S) -> Option<Credential> {
    let raw = match storage.get(SESSION_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(error) => {
            tracing::warn!(%error, "Could not read persisted session, starting anonymous");
            return None;
        }
    };

    let record: PersistedCredential = match serde_json::from_str(&raw) {
        Ok(record) => record,
        Err(error) => {
            tracing::warn!(%error, "Persisted session is malformed, starting anonymous");
            return None;
        }
    };

    if record.version > CURRENT_SCHEMA_VERSION {
        tracing::warn!(
            found = record.version,
            max_supported = CURRENT_SCHEMA_VERSION,
            "Persisted session has an unsupported version, starting anonymous"
        );
        return None;
    }

    Some(record.into_credential())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, StorageError};
    use crate::storage::MemoryStore;
    use serde_json::json;

    /// Storage that fails every operation.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(StorageError::Unavailable {
                reason: "disk on fire".to_string(),
            })
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(StorageError::Unavailable {
                reason: "disk on fire".to_string(),
            })
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(StorageError::Unavailable {
                reason: "disk on fire".to_string(),
            })
        }
    }

    fn success() -> AuthEvent {
        AuthEvent::LoginSucceeded {
            identity: UserIdentity::from_json(json!({"id": 4, "email": "a@b.c"})).unwrap(),
            token: "tok".to_string(),
        }
    }

    #[test]
    fn test_success_persists() {
        let mut store = SessionStore::new(MemoryStore::new());
        store.dispatch(AuthEvent::LoginRequested);
        store.dispatch(success());

        let raw = store.storage().get(SESSION_KEY).unwrap().unwrap();
        let record: PersistedCredential = serde_json::from_str(&raw).unwrap();
        assert_eq!(record.token, "tok");
        assert_eq!(record.version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_failure_does_not_persist() {
        let mut store = SessionStore::new(MemoryStore::new());
        store.dispatch(AuthEvent::LoginRequested);
        store.dispatch(AuthEvent::LoginFailed {
            error: "Invalid".to_string(),
        });

        assert!(store.storage().is_empty());
        assert_eq!(store.credential().last_error.as_deref(), Some("Invalid"));
    }

    #[test]
    fn test_rehydrate_round_trip() {
        let storage = MemoryStore::new();
        {
            let mut store = SessionStore::new(&storage);
            store.dispatch(success());
        }

        let store = SessionStore::rehydrate(&storage);
        assert_eq!(store.phase(), AuthPhase::Authenticated);
        assert_eq!(store.credential().token.as_deref(), Some("tok"));
        assert_eq!(
            store.credential().identity.as_ref().and_then(UserIdentity::id),
            Some(4)
        );
        assert!(!store.credential().pending);
    }

    #[test]
    fn test_rehydrate_malformed_entry() {
        let storage = MemoryStore::new();
        storage.set(SESSION_KEY, "{not json").unwrap();

        let store = SessionStore::rehydrate(storage);
        assert_eq!(store.credential(), &Credential::anonymous());
    }

    #[test]
    fn test_rehydrate_entry_without_token() {
        let storage = MemoryStore::new();
        storage
            .set(SESSION_KEY, r#"{"requesting": true, "user": null}"#)
            .unwrap();

        let store = SessionStore::rehydrate(storage);
        assert_eq!(store.phase(), AuthPhase::Anonymous);
        assert!(!store.credential().pending);
    }

    #[test]
    fn test_rehydrate_future_version() {
        let storage = MemoryStore::new();
        storage
            .set(
                SESSION_KEY,
                r#"{"version": 99, "saved_at": "2024-01-01T00:00:00Z", "identity": null, "token": "t"}"#,
            )
            .unwrap();

        let store = SessionStore::rehydrate(storage);
        assert_eq!(store.phase(), AuthPhase::Anonymous);
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let mut store = SessionStore::rehydrate(BrokenStore);
        assert_eq!(store.phase(), AuthPhase::Anonymous);

        store.dispatch(success());
        assert_eq!(store.phase(), AuthPhase::Authenticated);

        store.clear();
        assert_eq!(store.credential(), &Credential::anonymous());
    }
}
