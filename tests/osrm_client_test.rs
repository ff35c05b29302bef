use std::sync::Arc;
use std::time::Duration;

use auto_shop_backend::quote::{
    DistanceSource, OsrmClient, PricingPolicy, QuoteEstimator, RoutingError, RoutingProvider,
    ShopLocation,
};
use auto_shop_backend::utils::geo::{great_circle_distance_km, Coordinate};
use httpmock::prelude::*;
use serde_json::json;

fn pickup() -> Coordinate {
    Coordinate::new(43.7, -79.4).unwrap()
}

fn shop() -> Coordinate {
    ShopLocation::default().location
}

#[tokio::test]
async fn test_route_parsed_from_osrm_response() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path_contains("/route/v1/driving/")
                .path_contains("-79.4,43.7")
                .query_param("overview", "false");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "code": "Ok",
                    "routes": [{ "distance": 25000.0, "duration": 1500.0, "weight": 1500.0 }],
                    "waypoints": []
                }));
        })
        .await;

    let client = OsrmClient::new(server.base_url(), Duration::from_secs(5));
    let leg = client.route(pickup(), shop()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(leg.distance_km, 25.0);
    assert_eq!(leg.duration_secs, 1500.0);
    assert_eq!(leg.duration_text, "25 mins");
}

#[tokio::test]
async fn test_no_route_code() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/route/v1/driving/");
            then.status(200).json_body(json!({
                "code": "NoRoute",
                "message": "Impossible route between points",
                "routes": []
            }));
        })
        .await;

    let client = OsrmClient::new(server.base_url(), Duration::from_secs(5));
    let err = client.route(pickup(), shop()).await.unwrap_err();

    match err {
        RoutingError::NoRoute(message) => assert_eq!(message, "Impossible route between points"),
        other => panic!("expected NoRoute, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_route_list() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({ "code": "Ok", "routes": [] }));
        })
        .await;

    let client = OsrmClient::new(server.base_url(), Duration::from_secs(5));
    let err = client.route(pickup(), shop()).await.unwrap_err();
    assert!(matches!(err, RoutingError::NoRoute(_)));
}

#[tokio::test]
async fn test_server_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(503).body("overloaded");
        })
        .await;

    let client = OsrmClient::new(server.base_url(), Duration::from_secs(5));
    let err = client.route(pickup(), shop()).await.unwrap_err();
    assert!(matches!(err, RoutingError::Status(503)));
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).body("<html>not json</html>");
        })
        .await;

    let client = OsrmClient::new(server.base_url(), Duration::from_secs(5));
    let err = client.route(pickup(), shop()).await.unwrap_err();
    assert!(matches!(err, RoutingError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_estimator_falls_back_when_provider_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(500);
        })
        .await;

    let estimator = QuoteEstimator::new(
        Arc::new(OsrmClient::new(server.base_url(), Duration::from_secs(5))),
        ShopLocation::default(),
        PricingPolicy::default(),
        Duration::from_secs(5),
    );
    let quote = estimator.estimate(pickup()).await;

    let expected = great_circle_distance_km(pickup(), shop());
    assert_eq!(quote.source, DistanceSource::StraightLine);
    assert!(quote.duration_text.is_none());
    assert!((quote.distance_km - expected).abs() < 1e-6);
}

#[tokio::test]
async fn test_estimator_falls_back_when_provider_is_slow() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({
                    "code": "Ok",
                    "routes": [{ "distance": 1000.0, "duration": 60.0 }]
                }));
        })
        .await;

    let estimator = QuoteEstimator::new(
        Arc::new(OsrmClient::new(server.base_url(), Duration::from_secs(10))),
        ShopLocation::default(),
        PricingPolicy::default(),
        Duration::from_millis(200),
    );
    let quote = estimator.estimate(pickup()).await;

    assert_eq!(quote.source, DistanceSource::StraightLine);
}
