mod common;

use common::{anonymous_client, envelope, mock_json, new_server};
use cwatch_rs::{CryptowatchError, Period};

#[tokio::test]
async fn test_not_found() {
    let mut server = new_server().await;
    let mock = server
        .mock("GET", "/markets/kraken/nopair/price")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "Instrument not found"}"#)
        .create_async()
        .await;

    let client = anonymous_client(&server);
    let err = client
        .get_market_price("kraken", "nopair")
        .await
        .unwrap_err();
    match &err {
        CryptowatchError::ApiResourceNotFound(details) => {
            assert_eq!(details.status, 404);
            assert_eq!(details.message, "Instrument not found");
            assert_eq!(
                details.headers.get("content-type").map(String::as_str),
                Some("application/json")
            );
        }
        other => panic!("expected ApiResourceNotFound, got {:?}", other),
    }
    assert_eq!(err.api_details().unwrap().status, 404);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limited() {
    let mut server = new_server().await;
    let mock = server
        .mock("GET", "/markets")
        .with_status(429)
        .with_body(r#"{"error": "You are out of credits"}"#)
        .create_async()
        .await;

    let client = anonymous_client(&server);
    let err = client.list_markets(None, None).await.unwrap_err();
    assert!(matches!(err, CryptowatchError::ApiRateLimit(_)), "{:?}", err);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_with_plain_body() {
    let mut server = new_server().await;
    let mock = server
        .mock("GET", "/pairs/btcusd")
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let client = anonymous_client(&server);
    let err = client.get_pair("btcusd").await.unwrap_err();
    match err {
        CryptowatchError::ApiServer(details) => {
            assert_eq!(details.status, 503);
            assert_eq!(details.message, "upstream unavailable");
        }
        other => panic!("expected ApiServer, got {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_bad_request() {
    let mut server = new_server().await;
    let mock = server
        .mock("GET", "/assets/btc")
        .with_status(400)
        .with_body(r#"{"error": "Bad request"}"#)
        .create_async()
        .await;

    let client = anonymous_client(&server);
    let err = client.get_asset("btc").await.unwrap_err();
    assert!(matches!(err, CryptowatchError::ApiRequest(_)), "{:?}", err);
    assert_eq!(err.api_details().unwrap().message, "Bad request");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_success_body() {
    let mut server = new_server().await;
    let body = envelope(r#"{"price": "not a number"}"#);
    let mock = mock_json(&mut server, "/markets/kraken/btcusd/price", &body).await;

    let client = anonymous_client(&server);
    match client.get_market_price("kraken", "btcusd").await {
        Err(CryptowatchError::ResponseStructure { payload, .. }) => assert_eq!(payload, body),
        other => panic!("expected ResponseStructure, got {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_short_trade_array_is_a_structure_error() {
    let mut server = new_server().await;
    let mock = mock_json(
        &mut server,
        "/markets/kraken/btcusd/trades",
        &envelope(r#"[[0, 1607016991, 15945.5]]"#),
    )
    .await;

    let client = anonymous_client(&server);
    let err = client
        .get_market_trades("kraken", "btcusd", None, None)
        .await
        .unwrap_err();
    assert!(
        matches!(err, CryptowatchError::ResponseStructure { .. }),
        "{:?}",
        err
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_input_fails_before_request() {
    let mut server = new_server().await;
    let mock = server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = anonymous_client(&server);

    let err = client
        .get_ohlcv("kraken", "btcusd", None, None, &[Period::from("2w")])
        .await
        .unwrap_err();
    assert!(matches!(err, CryptowatchError::InvalidPeriod(_)), "{:?}", err);

    let err = client
        .get_ohlcv("kraken", "btcusd", None, None, &[Period::from(61)])
        .await
        .unwrap_err();
    assert!(matches!(err, CryptowatchError::InvalidPeriod(_)), "{:?}", err);

    let err = client.list_assets(None, Some(5001)).await.unwrap_err();
    assert!(
        matches!(err, CryptowatchError::InvalidParameter(_)),
        "{:?}",
        err
    );

    mock.assert_async().await;
}
