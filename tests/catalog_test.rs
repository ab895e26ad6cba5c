//! Regions, sizes and account against a mock API.

mod common;

use binarylane_client::{BinaryLaneClient, BinaryLaneClientConfig, BinaryLaneError, ListOptions};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn regions_and_sizes_are_listed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/regions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "regions": [
                {"slug": "syd", "name": "Sydney", "sizes": ["std-min"], "available": true, "features": ["ipv6"]},
                {"slug": "mel", "name": "Melbourne", "sizes": [], "available": false, "features": []}
            ],
            "meta": {"total": 2}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/sizes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sizes": [{
                "slug": "std-min",
                "memory": 1024,
                "vcpus": 1,
                "disk": 20,
                "transfer": 1.0,
                "price_monthly": 5.0,
                "price_hourly": 0.00744,
                "regions": ["syd", "mel"],
                "available": true
            }]
        })))
        .mount(&server)
        .await;

    let client = common::client(&server);
    let regions = client
        .regions()
        .list(ListOptions::all())
        .await
        .expect("regions should load");
    let sizes = client
        .sizes()
        .list(ListOptions::all())
        .await
        .expect("sizes should load");

    assert_eq!(
        regions.iter().map(|r| r.slug.as_str()).collect::<Vec<_>>(),
        vec!["syd", "mel"]
    );
    assert!(!regions[1].available);
    assert_eq!(sizes[0].regions, vec!["syd".to_string(), "mel".to_string()]);
    assert_eq!(sizes[0].memory, 1024);
}

#[tokio::test]
async fn account_is_read_with_bearer_auth() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/account"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "account": {
                "server_limit": 25,
                "floating_ip_limit": 25,
                "volume_limit": 22,
                "email": "sammy@example.com",
                "uuid": "b6fr89dbf6d9156cace5f3c78dc9851d957381ef",
                "email_verified": true,
                "status": "active"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let account = client.account().get().await.expect("account should load");

    assert_eq!(account.server_limit, 25);
    assert_eq!(account.email, "sammy@example.com");
    assert!(account.email_verified);
    assert_eq!(account.status_message, "");
}

#[tokio::test]
async fn unauthorized_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/account"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let cfg = BinaryLaneClientConfig::new("wrong").with_api_url(common::api_url(&server));
    let client = BinaryLaneClient::new(cfg).expect("client should build");
    let err = client.account().get().await.expect_err("token is rejected");

    assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn malformed_body_is_a_json_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/regions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let client = common::client(&server);
    let err = client
        .regions()
        .list(ListOptions::all())
        .await
        .expect_err("body is not json");

    assert!(matches!(err, BinaryLaneError::Json { ref body, .. } if body == "{not json"));
}
