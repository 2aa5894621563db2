//! Session credential lifecycle for the Neptune console.
//!
//! This crate owns the authentication state machine that gates every
//! protected view of the console, and the durable storage the credential is
//! persisted to between runs.
//!
//! # States
//!
//! ```text
//!              login()                 LoginSucceeded
//! Anonymous ───────────► Authenticating ───────────────► Authenticated
//!     ▲                        │                              │
//!     │      LoginFailed       │                              │
//!     └────────────────────────┘                              │
//!     │                  LogoutCompleted (always)             │
//!     └───────────────────────────────────────────────────────┘
//! ```
//!
//! # Architecture
//!
//! - `credential.rs` - Credential, user identity and derived phase
//! - `reducer.rs` - Auth events and the pure transition function
//! - `storage/` - Key-value storage (file-backed and in-memory)
//! - `store.rs` - Session store: reducer + storage side effects + rehydration
//! - `api.rs` - Remote auth collaborator trait
//! - `controller.rs` - Async login/logout flows over an [`AuthApi`]
//! - `gate.rs` - Access decisions for protected views
//! - `error.rs` - Error types with user-friendly messages

mod api;
mod controller;
mod credential;
mod error;
mod gate;
mod reducer;
mod storage;
mod store;

pub use api::{AuthApi, LoginResponse};
pub use controller::SessionController;
pub use credential::{AuthPhase, Credential, UserIdentity};
pub use error::{AuthApiError, Result, StorageError};
pub use gate::{Access, gate};
pub use reducer::{AuthEvent, StorageEffect, reduce};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{CURRENT_SCHEMA_VERSION, PersistedCredential, SESSION_KEY, SessionStore};
