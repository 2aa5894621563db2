//! HTTP implementation of the Neptune collaborator traits.
//!
//! [`NeptuneClient`] implements [`neptune_session::AuthApi`],
//! [`neptune_catalog::CatalogApi`] and [`neptune_catalog::DashboardApi`] on top
//! of `reqwest`. Transport and status failures are first classified as
//! [`ClientError`] and then narrowed to the error type each trait expects.

pub mod client;
pub mod config;
pub mod error;

pub use client::NeptuneClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{ClientError, Result};
