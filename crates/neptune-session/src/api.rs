//! Remote auth collaborator.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::credential::UserIdentity;
use crate::error::AuthApiError;

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserIdentity,
    pub token: String,
}

/// Server endpoints the session depends on.
pub trait AuthApi {
    /// Exchange email and password for a user record and token.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginResponse, AuthApiError>> + Send;

    /// Revoke `token` on the server.
    fn logout(&self, token: &str) -> impl Future<Output = Result<(), AuthApiError>> + Send;
}
