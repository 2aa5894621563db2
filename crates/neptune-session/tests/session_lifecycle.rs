use std::sync::Mutex;

use neptune_session::{
    Access, AuthApi, AuthApiError, AuthPhase, Credential, FileStore, KeyValueStore, LoginResponse,
    MemoryStore, SESSION_KEY, SessionController, UserIdentity,
};
use serde_json::json;

/// Auth endpoint double with scripted answers.
struct ScriptedAuth {
    login_result: Result<LoginResponse, AuthApiError>,
    logout_result: Result<(), AuthApiError>,
    logout_calls: Mutex<Vec<String>>,
}

impl ScriptedAuth {
    fn accepting() -> Self {
        Self {
            login_result: Ok(LoginResponse {
                user: UserIdentity::from_json(json!({
                    "id": 12,
                    "email": "admin@hospital.org",
                    "admin_client": {"id": 5}
                }))
                .unwrap(),
                token: "abc123".to_string(),
            }),
            logout_result: Ok(()),
            logout_calls: Mutex::new(Vec::new()),
        }
    }

    fn rejecting(detail: &str) -> Self {
        Self {
            login_result: Err(AuthApiError::Rejected {
                detail: detail.to_string(),
            }),
            ..Self::accepting()
        }
    }

    fn failing_logout() -> Self {
        Self {
            logout_result: Err(AuthApiError::Network("connection reset".to_string())),
            ..Self::accepting()
        }
    }
}

impl AuthApi for ScriptedAuth {
    async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse, AuthApiError> {
        self.login_result.clone()
    }

    async fn logout(&self, token: &str) -> Result<(), AuthApiError> {
        self.logout_calls.lock().unwrap().push(token.to_string());
        self.logout_result.clone()
    }
}

#[tokio::test]
async fn accepted_login_authenticates_and_persists() {
    let storage = MemoryStore::new();
    let mut controller = SessionController::new(ScriptedAuth::accepting(), &storage);
    assert_eq!(controller.access(), Access::Denied);

    let credential = controller.login("admin@hospital.org", "secret").await.clone();

    assert_eq!(credential.token.as_deref(), Some("abc123"));
    assert_eq!(
        credential.identity.as_ref().and_then(UserIdentity::admin_client_id),
        Some(5)
    );
    assert!(!credential.pending);
    assert!(credential.last_error.is_none());
    assert_eq!(controller.access(), Access::Granted);
    assert!(storage.get(SESSION_KEY).unwrap().is_some());
}

#[tokio::test]
async fn rejected_login_surfaces_detail_without_persisting() {
    let storage = MemoryStore::new();
    let mut controller = SessionController::new(ScriptedAuth::rejecting("Invalid"), &storage);

    let credential = controller.login("admin@hospital.org", "wrong").await.clone();

    assert_eq!(
        credential,
        Credential {
            identity: None,
            token: None,
            pending: false,
            last_error: Some("Invalid".to_string()),
        }
    );
    assert!(storage.is_empty());
}

#[tokio::test]
async fn failed_login_after_session_does_not_resurrect_on_restart() {
    let storage = MemoryStore::new();
    SessionController::new(ScriptedAuth::accepting(), &storage)
        .login("admin@hospital.org", "secret")
        .await;

    let mut controller = SessionController::new(ScriptedAuth::rejecting("Invalid"), &storage);
    assert_eq!(controller.phase(), AuthPhase::Authenticated);
    let credential = controller.login("admin@hospital.org", "wrong").await.clone();
    assert!(credential.token.is_none());
    assert_eq!(credential.last_error.as_deref(), Some("Invalid"));

    let restarted = SessionController::new(ScriptedAuth::accepting(), &storage);
    assert_eq!(restarted.phase(), AuthPhase::Anonymous);
    assert!(restarted.store().authorization_header().is_none());
    assert!(storage.get(SESSION_KEY).unwrap().is_none());
}

#[tokio::test]
async fn network_failure_on_login_is_recoverable() {
    let storage = MemoryStore::new();
    let api = ScriptedAuth {
        login_result: Err(AuthApiError::Network("timed out".to_string())),
        ..ScriptedAuth::accepting()
    };
    let mut controller = SessionController::new(api, &storage);

    let credential = controller.login("a@b.c", "pw").await;
    assert_eq!(credential.phase(), AuthPhase::Anonymous);
    assert!(credential.last_error.is_some());
}

#[tokio::test]
async fn logout_always_completes_even_when_remote_fails() {
    let storage = MemoryStore::new();
    let mut controller = SessionController::new(ScriptedAuth::failing_logout(), &storage);
    controller.login("admin@hospital.org", "secret").await;
    assert!(storage.get(SESSION_KEY).unwrap().is_some());

    let credential = controller.logout().await.clone();

    assert!(credential.token.is_none());
    assert!(credential.identity.is_none());
    assert_eq!(storage.get(SESSION_KEY).unwrap(), None);
    assert_eq!(
        controller.api().logout_calls.lock().unwrap().as_slice(),
        ["abc123".to_string()]
    );
}

#[tokio::test]
async fn logout_without_session_skips_remote_call() {
    let storage = MemoryStore::new();
    let mut controller = SessionController::new(ScriptedAuth::accepting(), &storage);

    controller.logout().await;

    assert!(controller.api().logout_calls.lock().unwrap().is_empty());
    assert_eq!(controller.phase(), AuthPhase::Anonymous);
}

#[tokio::test]
async fn session_survives_restart_with_file_store() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut controller =
            SessionController::new(ScriptedAuth::accepting(), FileStore::new(dir.path()));
        controller.login("admin@hospital.org", "secret").await;
    }

    let restarted = SessionController::new(ScriptedAuth::accepting(), FileStore::new(dir.path()));
    assert_eq!(restarted.phase(), AuthPhase::Authenticated);
    assert_eq!(
        restarted.store().authorization_header().as_deref(),
        Some("Token abc123")
    );
}
