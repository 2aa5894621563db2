//! Access decisions for protected views.

use crate::credential::Credential;

/// What a protected view should do for the current credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// A token is held; render the view.
    Granted,
    /// A login is in flight; show a busy state.
    Pending,
    /// No session; redirect to the login page.
    Denied,
}

/// Decide access from a credential. Only one of token or pending drives the
/// decision, with the token taking precedence.
pub fn gate(credential: &Credential) -> Access {
    if credential.token.is_some() {
        Access::Granted
    } else if credential.pending {
        Access::Pending
    } else {
        Access::Denied
    }
}
