//! Neptune API client.

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use neptune_catalog::{
    AccountRecord, BulkInventory, CatalogApi, DashboardApi, DeviceItem, DeviceRecord, LookupError,
    Marketshare, ProductDiscounts, RebatableEntry, RebateTargetKind, SavingsMonth,
};
use neptune_session::{AuthApi, AuthApiError, LoginResponse};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("neptune-console/", env!("CARGO_PKG_VERSION"));

/// Error payload returned by the server on rejected requests.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    non_field_errors: Vec<String>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        self.detail
            .or_else(|| self.non_field_errors.into_iter().next())
    }
}

/// HTTP client for the auth and staff endpoints.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct NeptuneClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl NeptuneClient {
    /// Creates a client for the configured server.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got {:?}",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Attach the session token sent with staff requests.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a JSON resource with the session token.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, token_header(token));
        }
        let response = request.send().await?;
        handle_response(response).await
    }

    async fn staff<T: DeserializeOwned>(
        &self,
        path: &str,
        resource: &str,
    ) -> std::result::Result<T, LookupError> {
        self.get_json(path).await.map_err(|error| {
            tracing::warn!(%error, resource, "Lookup request failed");
            error.into_lookup_error(resource)
        })
    }
}

fn token_header(token: &str) -> String {
    format!("Token {token}")
}

/// Checks the status and parses the JSON body.
async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(response.url().path().to_string()));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = status
            .is_client_error()
            .then(|| serde_json::from_str::<ErrorBody>(&body).ok())
            .flatten()
            .and_then(ErrorBody::message);
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Unauthorized(detail));
        }
        return Err(match detail {
            Some(detail) => ClientError::Rejected { detail },
            None => ClientError::Http {
                status: status.as_u16(),
                body,
            },
        });
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

impl AuthApi for NeptuneClient {
    async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<LoginResponse, AuthApiError> {
        let url = self.url("/api/admin/login");
        tracing::debug!(%url, "POST");

        let body = serde_json::json!({ "email": email, "password": password });
        let result = match self.client.post(&url).json(&body).send().await {
            Ok(response) => handle_response(response).await,
            Err(error) => Err(error.into()),
        };
        result.map_err(ClientError::into_auth_error)
    }

    async fn logout(&self, token: &str) -> std::result::Result<(), AuthApiError> {
        let url = self.url("/api/logout");
        tracing::debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, token_header(token))
            .send()
            .await
            .map_err(|e| ClientError::from(e).into_auth_error())?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(AuthApiError::Network(format!("logout returned {status}")))
        }
    }
}

impl CatalogApi for NeptuneClient {
    async fn devices_for_client(
        &self,
        client_id: i64,
    ) -> std::result::Result<Vec<DeviceRecord>, LookupError> {
        self.staff(&format!("/api/staff/clients/{client_id}/devices"), "devices")
            .await
    }

    async fn items_for_device(
        &self,
        device_id: i64,
    ) -> std::result::Result<Vec<DeviceItem>, LookupError> {
        self.staff(&format!("/api/staff/devices/{device_id}/items"), "device items")
            .await
    }

    async fn discounts_for_client(
        &self,
        client_id: i64,
    ) -> std::result::Result<Vec<ProductDiscounts>, LookupError> {
        self.staff(&format!("/api/staff/clients/{client_id}/discounts"), "discounts")
            .await
    }

    async fn accounts_for_client(
        &self,
        client_id: i64,
    ) -> std::result::Result<Vec<AccountRecord>, LookupError> {
        self.staff(&format!("/api/staff/clients/{client_id}/accounts"), "accounts")
            .await
    }

    async fn rebatable_entries(
        &self,
        manufacturer_id: i64,
        kind: RebateTargetKind,
    ) -> std::result::Result<Vec<RebatableEntry>, LookupError> {
        self.staff(
            &format!(
                "/api/staff/manufacturers/{manufacturer_id}/{}",
                kind.path_segment()
            ),
            "rebatable entries",
        )
        .await
    }
}

impl DashboardApi for NeptuneClient {
    async fn marketshare(&self, client_id: i64) -> std::result::Result<Marketshare, LookupError> {
        self.staff(&format!("/api/admin/clients/{client_id}/marketshare"), "marketshare")
            .await
    }

    async fn savings(
        &self,
        client_id: i64,
        year: Option<i32>,
    ) -> std::result::Result<Vec<SavingsMonth>, LookupError> {
        let path = match year {
            Some(year) => format!("/api/admin/clients/{client_id}/savings/{year}"),
            None => format!("/api/admin/clients/{client_id}/savings"),
        };
        self.staff(&path, "savings").await
    }

    async fn bulk_inventory(
        &self,
        client_id: i64,
    ) -> std::result::Result<BulkInventory, LookupError> {
        self.staff(&format!("/api/admin/clients/{client_id}/bulk"), "bulk inventory")
            .await
    }
}
