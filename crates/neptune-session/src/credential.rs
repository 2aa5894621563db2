//! Session credential and user identity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authenticated user record as returned by the login endpoint.
///
/// The record is kept verbatim so nothing the server sends is lost; typed
/// accessors cover the attributes the console reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserIdentity(Map<String, Value>);

impl UserIdentity {
    /// Wrap a JSON object. Returns `None` for any other JSON value.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    pub fn email(&self) -> Option<&str> {
        self.0.get("email").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Id of the hospital client this user administers, if any.
    pub fn admin_client_id(&self) -> Option<i64> {
        self.0
            .get("admin_client")
            .and_then(|client| client.get("id"))
            .and_then(Value::as_i64)
    }

    /// Raw attribute access.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Coarse lifecycle phase derived from a [`Credential`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

impl AuthPhase {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
        }
    }
}

impl std::fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The session credential.
///
/// A token is present exactly when the session is authenticated. `pending`
/// is only set while a login request is in flight.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Credential {
    pub identity: Option<UserIdentity>,
    pub token: Option<String>,
    pub pending: bool,
    pub last_error: Option<String>,
}

impl Credential {
    /// An empty, anonymous credential.
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Derive the lifecycle phase. A held token wins over a pending flag.
    pub fn phase(&self) -> AuthPhase {
        if self.token.is_some() {
            AuthPhase::Authenticated
        } else if self.pending {
            AuthPhase::Authenticating
        } else {
            AuthPhase::Anonymous
        }
    }

    /// Value for the `Authorization` header of admin requests.
    pub fn authorization_header(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Token {token}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_accessors() {
        let identity = UserIdentity::from_json(json!({
            "id": 7,
            "email": "admin@example.com",
            "name": "Ada",
            "admin_client": {"id": 3, "name": "General Hospital"}
        }))
        .unwrap();

        assert_eq!(identity.id(), Some(7));
        assert_eq!(identity.email(), Some("admin@example.com"));
        assert_eq!(identity.name(), Some("Ada"));
        assert_eq!(identity.admin_client_id(), Some(3));
    }

    #[test]
    fn test_identity_rejects_non_object() {
        assert!(UserIdentity::from_json(json!("admin")).is_none());
        assert!(UserIdentity::from_json(json!(null)).is_none());
    }

    #[test]
    fn test_identity_without_client() {
        let identity = UserIdentity::from_json(json!({"id": 1, "admin_client": null})).unwrap();
        assert_eq!(identity.admin_client_id(), None);
    }

    #[test]
    fn test_phase_derivation() {
        let mut credential = Credential::anonymous();
        assert_eq!(credential.phase(), AuthPhase::Anonymous);

        credential.pending = true;
        assert_eq!(credential.phase(), AuthPhase::Authenticating);

        credential.pending = false;
        credential.token = Some("abc".to_string());
        assert_eq!(credential.phase(), AuthPhase::Authenticated);
        assert_eq!(credential.authorization_header().as_deref(), Some("Token abc"));
    }
}
