//! Endpoint-level tests for [`MarketplaceApi`] against a wiremock server.

use std::time::Duration;

use marketplace_tools::{MarketplaceApi, MarketplaceApiError, MarketplaceConfig, RetryPolicy};
use serde_json::json;
use ssg_common::{FulfilmentChannel, Secret};
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock,
    MockServer,
    ResponseTemplate,
};

fn test_config(server: &MockServer) -> MarketplaceConfig {
    MarketplaceConfig {
        base_url: server.uri(),
        token_url: format!("{}/token", server.uri()),
        client_id: "client-id".to_string(),
        client_secret: Secret::new("client-secret".to_string()),
        retry: RetryPolicy { max_attempts: 3, default_delay: Duration::from_millis(5) },
        poll_interval: Duration::from_millis(5),
        max_poll_wait: Duration::from_millis(250),
        ..Default::default()
    }
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 600
        })))
        .mount(server)
        .await;
}

fn inventory_body() -> serde_json::Value {
    json!({"inventory": [{"ean": "8712345678906", "regularStock": 7, "gradedStock": 1}]})
}

#[tokio::test]
async fn requests_carry_the_bearer_token() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("GET"))
        .and(path("/inventory"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inventory_body()))
        .expect(1)
        .mount(&server)
        .await;
    let api = MarketplaceApi::new(test_config(&server)).unwrap();
    let entries = api.platform_stock_page(1).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].regular_stock, 7);
    assert_eq!(entries[0].non_conforming_stock, 0);
}

#[tokio::test]
async fn rate_limited_calls_are_retried_then_succeed() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    // Two 429s, then the real response. Retry-After of 0 keeps the test fast.
    Mock::given(method("GET"))
        .and(path("/inventory"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/inventory"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inventory_body()))
        .expect(1)
        .mount(&server)
        .await;
    let api = MarketplaceApi::new(test_config(&server)).unwrap();
    let entries = api.platform_stock_page(1).await.unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn exhausting_the_retry_budget_fails_with_rate_limited() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("GET"))
        .and(path("/inventory"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;
    let api = MarketplaceApi::new(test_config(&server)).unwrap();
    match api.platform_stock_page(1).await {
        Err(MarketplaceApiError::RateLimited { attempts }) => assert_eq!(attempts, 3),
        other => panic!("Expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_retry_after_header_falls_back_to_the_policy_delay() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("GET"))
        .and(path("/inventory"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inventory_body()))
        .mount(&server)
        .await;
    let api = MarketplaceApi::new(test_config(&server)).unwrap();
    // default_delay is 5ms in the test config, so the retry happens almost immediately
    let entries = api.platform_stock_page(1).await.unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn api_errors_surface_the_detail_field() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("PUT"))
        .and(path("/offers/ofr-9/stock"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "title": "Bad Request",
            "detail": "Stock amount out of range"
        })))
        .mount(&server)
        .await;
    let api = MarketplaceApi::new(test_config(&server)).unwrap();
    match api.update_stock("ofr-9", 1500, true).await {
        Err(MarketplaceApiError::Api { status, detail }) => {
            assert_eq!(status, 400);
            assert_eq!(detail, "Stock amount out of range");
        },
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn bodyless_responses_are_a_success() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("PUT"))
        .and(path("/offers/ofr-1/stock"))
        .and(body_json(json!({"amount": 40, "managedByMerchant": true})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let api = MarketplaceApi::new(test_config(&server)).unwrap();
    api.update_stock("ofr-1", 40, true).await.unwrap();
}

#[tokio::test]
async fn merchant_fulfilment_updates_carry_the_delivery_code() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("PUT"))
        .and(path("/offers/ofr-1/fulfilment"))
        .and(body_json(json!({"method": "FBM", "deliveryCode": "STANDARD-24H"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let api = MarketplaceApi::new(test_config(&server)).unwrap();
    api.update_fulfilment("ofr-1", FulfilmentChannel::Merchant).await.unwrap();
}

#[tokio::test]
async fn platform_fulfilment_updates_omit_the_delivery_code() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("PUT"))
        .and(path("/offers/ofr-2/fulfilment"))
        .and(body_json(json!({"method": "FBP"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let api = MarketplaceApi::new(test_config(&server)).unwrap();
    api.update_fulfilment("ofr-2", FulfilmentChannel::Platform).await.unwrap();
}

#[tokio::test]
async fn token_acquisition_failure_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&server)
        .await;
    let api = MarketplaceApi::new(test_config(&server)).unwrap();
    match api.platform_stock_page(1).await {
        Err(MarketplaceApiError::Auth(msg)) => assert!(msg.contains("401")),
        other => panic!("Expected Auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn tokens_are_cached_across_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": 600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inventory_body()))
        .expect(2)
        .mount(&server)
        .await;
    let api = MarketplaceApi::new(test_config(&server)).unwrap();
    api.platform_stock_page(1).await.unwrap();
    api.platform_stock_page(2).await.unwrap();
}
