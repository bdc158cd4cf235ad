#![allow(dead_code)]

use cwatch_rs::CryptowatchClient;
use mockito::{Mock, Server, ServerGuard};

pub const ANONYMOUS_ALLOWANCE: &str = r#"{
    "cost": 0.005,
    "remaining": 9.995,
    "upgrade": "For unlimited API access, create an account at https://cryptowat.ch"
}"#;

pub const AUTHENTICATED_ALLOWANCE: &str = r#"{
    "cost": 0.002,
    "remaining": 9.998,
    "remainingPaid": 0,
    "account": "account@example.com"
}"#;

/// Wrap `result` in a `{result, allowance}` envelope.
pub fn envelope(result: &str) -> String {
    format!(r#"{{"result": {}, "allowance": {}}}"#, result, ANONYMOUS_ALLOWANCE)
}

pub fn paginated(result: &str, last: &str, has_more: bool) -> String {
    format!(
        r#"{{"result": {}, "cursor": {{"last": "{}", "hasMore": {}}}, "allowance": {}}}"#,
        result, last, has_more, ANONYMOUS_ALLOWANCE
    )
}

pub fn anonymous_client(server: &ServerGuard) -> CryptowatchClient {
    CryptowatchClient::builder()
        .without_env()
        .base_url(server.url())
        .build()
        .expect("client should build")
}

pub fn keyed_client(server: &ServerGuard, api_key: &str) -> CryptowatchClient {
    CryptowatchClient::builder()
        .without_env()
        .api_key(api_key)
        .base_url(server.url())
        .build()
        .expect("client should build")
}

pub async fn new_server() -> ServerGuard {
    Server::new_async().await
}

/// A JSON 200 for `GET path`.
pub async fn mock_json(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}
