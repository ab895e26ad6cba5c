//! Shared helpers for the HTTP-level tests.

#![allow(dead_code)]

use std::time::Duration;

use binarylane_client::{BinaryLaneClient, BinaryLaneClientConfig};
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

/// Base API URL served by the mock server.
pub fn api_url(server: &MockServer) -> String {
    format!("{}/v2", server.uri())
}

/// Client pointed at the mock server, polling actions every 10ms.
pub fn client(server: &MockServer) -> BinaryLaneClient {
    let cfg = BinaryLaneClientConfig::new(TOKEN)
        .with_api_url(api_url(server))
        .with_action_poll_interval(Duration::from_millis(10));
    BinaryLaneClient::new(cfg).expect("client should build")
}

/// `links.pages` object with a `next` link to `page`.
pub fn next_link(server: &MockServer, resource: &str, page: u32) -> serde_json::Value {
    serde_json::json!({
        "pages": {
            "next": format!("{}/{resource}?page={page}&per_page=2", api_url(server)),
            "last": format!("{}/{resource}?page=3&per_page=2", api_url(server)),
        }
    })
}
