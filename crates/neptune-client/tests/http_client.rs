//! Exercises the client against a one-shot local HTTP server.

use neptune_catalog::{
    Amount, BulkInventory, CatalogApi, DashboardApi, LookupError, RebateTargetKind,
};
use neptune_client::{ClientConfig, NeptuneClient};
use neptune_session::{AuthApi, AuthApiError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one canned response and hand back the raw request.
async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });
    (base_url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let read = socket.read(&mut chunk).await.unwrap();
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);

        let text = String::from_utf8_lossy(&buffer);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buffer.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

fn client(base_url: &str) -> NeptuneClient {
    NeptuneClient::new(&ClientConfig::new(base_url)).unwrap()
}

#[tokio::test]
async fn login_posts_credentials_and_parses_user() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"user": {"id": 3, "email": "a@h.org", "admin_client": {"id": 5}}, "token": "abc123"}"#,
    )
    .await;

    let response = client(&base_url).login("a@h.org", "pw").await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(response.token, "abc123");
    assert_eq!(response.user.admin_client_id(), Some(5));
    assert!(request.starts_with("POST /api/admin/login HTTP/1.1"));
    assert!(request.contains(r#""email":"a@h.org""#));
}

#[tokio::test]
async fn rejected_login_carries_server_detail() {
    let (base_url, server) = serve_once(
        "400 Bad Request",
        r#"{"detail": "Unable to log in with provided credentials."}"#,
    )
    .await;

    let error = client(&base_url).login("a@h.org", "bad").await.unwrap_err();
    server.await.unwrap();

    assert_eq!(
        error,
        AuthApiError::Rejected {
            detail: "Unable to log in with provided credentials.".to_string()
        }
    );
}

#[tokio::test]
async fn forbidden_login_carries_server_detail() {
    let (base_url, server) =
        serve_once("403 Forbidden", r#"{"detail": "Invalid email/password."}"#).await;

    let error = client(&base_url).login("a@h.org", "bad").await.unwrap_err();
    server.await.unwrap();

    assert_eq!(
        error,
        AuthApiError::Rejected {
            detail: "Invalid email/password.".to_string()
        }
    );
}

#[tokio::test]
async fn forbidden_staff_request_is_unauthorized() {
    let (base_url, server) = serve_once(
        "403 Forbidden",
        r#"{"detail": "Authentication credentials were not provided."}"#,
    )
    .await;

    let error = client(&base_url).devices_for_client(5).await.unwrap_err();
    server.await.unwrap();

    assert_eq!(
        error,
        LookupError::Unauthorized {
            resource: "devices".to_string()
        }
    );
}

#[tokio::test]
async fn logout_sends_token_header() {
    let (base_url, server) = serve_once("204 No Content", "").await;

    client(&base_url).logout("abc123").await.unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("POST /api/logout"));
    assert!(
        request
            .to_ascii_lowercase()
            .contains("authorization: token abc123")
    );
}

#[tokio::test]
async fn staff_requests_use_session_token() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"[{"id": 1, "name": "A", "specialty": "Cardiac", "category": "Lead", "manufacturer": "Medtronic", "product": 9}]"#,
    )
    .await;

    let devices = client(&base_url)
        .with_token(Some("abc123".to_string()))
        .devices_for_client(5)
        .await
        .unwrap();
    let request = server.await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].product, Some(9));
    assert!(request.starts_with("GET /api/staff/clients/5/devices"));
    assert!(
        request
            .to_ascii_lowercase()
            .contains("authorization: token abc123")
    );
}

#[tokio::test]
async fn item_lookup_parses_cost_types() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"[{"id": 7, "identifier": "SN1", "cost_type": 2}, {"identifier": "SN2", "cost_type": null}]"#,
    )
    .await;

    let items = client(&base_url).items_for_device(4).await.unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("GET /api/staff/devices/4/items"));
    assert_eq!(items[0].cost_type, Some(2));
    assert_eq!(items[1].cost_type, None);
}

#[tokio::test]
async fn rebate_targets_use_kind_segment() {
    let (base_url, server) = serve_once("200 OK", r#"[{"id": 2, "name": "Leads"}]"#).await;

    let entries = client(&base_url)
        .rebatable_entries(8, RebateTargetKind::Category)
        .await
        .unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("GET /api/staff/manufacturers/8/category"));
    assert_eq!(entries[0].name, "Leads");
}

#[tokio::test]
async fn missing_device_maps_to_not_found() {
    let (base_url, server) = serve_once("404 Not Found", r#"{"detail": "Not found."}"#).await;

    let error = client(&base_url).items_for_device(99).await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(error, LookupError::NotFound { .. }));
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let (base_url, server) = serve_once("200 OK", r#"{"unexpected": true}"#).await;

    let error = client(&base_url).accounts_for_client(5).await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(error, LookupError::InvalidResponse { .. }));
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let error = client(&base_url).login("a@h.org", "pw").await.unwrap_err();

    assert!(error.is_retryable());
}

#[tokio::test]
async fn savings_for_year_use_year_segment() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"[{"month": 1, "savings": "30.00", "spend": "300.00", "percent": "10.00"}]"#,
    )
    .await;

    let months = client(&base_url).savings(5, Some(2023)).await.unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("GET /api/admin/clients/5/savings/2023 HTTP/1.1"));
    assert_eq!(months[0].savings, Amount(30.0));
}

#[tokio::test]
async fn bulk_inventory_parses_counters() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"available": 7, "expiring60": 2, "expiring30": 1, "expired": 3}"#,
    )
    .await;

    let inventory = client(&base_url).bulk_inventory(5).await.unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("GET /api/admin/clients/5/bulk HTTP/1.1"));
    assert_eq!(
        inventory,
        BulkInventory {
            available: 7,
            expiring60: 2,
            expiring30: 1,
            expired: 3,
        }
    );
}
