mod common;

use common::{anonymous_client, envelope, new_server};
use cwatch_rs::Period;
use mockito::Matcher;
use rust_decimal::Decimal;
use std::str::FromStr;

const CANDLES: &str = r#"{
    "60": [
        [1607017020, 15940.1, 15950, 15930.2, 15945.5, 12.25, 195325.75],
        [1607017080, 15945.5, 15960, 15940, 15955, 3.5, 55842.5]
    ],
    "604800_Monday": [
        [1607299200, 18700, 19400, 18200, 19100.25, 1200.5, 22934552.5]
    ]
}"#;

#[tokio::test]
async fn test_ohlcv_by_label() {
    let mut server = new_server().await;
    let mock = server
        .mock("GET", "/markets/kraken/btcusd/ohlc")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("after".into(), "1607017000".into()),
            Matcher::UrlEncoded("periods".into(), "60,604800_Monday".into()),
        ]))
        .with_status(200)
        .with_body(envelope(CANDLES))
        .create_async()
        .await;

    let client = anonymous_client(&server);
    let periods = vec![Period::from("1w_monday"), Period::from("1m"), Period::from(60)];
    let ohlcv = client
        .get_ohlcv("kraken", "btcusd", None, Some(1607017000), &periods)
        .await
        .unwrap();

    let minutes = ohlcv.result.get("60").unwrap();
    assert_eq!(minutes.len(), 2);
    assert_eq!(ohlcv.result.get_label("1m"), Some(minutes));
    assert_eq!(minutes[0].close_time, 1607017020);
    assert_eq!(
        minutes[0].quote_volume,
        Decimal::from_str("195325.75").unwrap()
    );

    let weekly = ohlcv.result.get_label("1w_monday").unwrap();
    assert_eq!(weekly[0].close_price, Decimal::from_str("19100.25").unwrap());

    let by_label = ohlcv.result.by_label();
    assert_eq!(by_label.len(), 2);
    assert_eq!(by_label["1m"].len(), 2);
    assert_eq!(by_label["1w_monday"].len(), 1);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_ohlcv_without_periods() {
    let mut server = new_server().await;
    let mock = server
        .mock("GET", "/markets/kraken/btcusd/ohlc")
        .with_status(200)
        .with_body(envelope(r#"{"3600": []}"#))
        .create_async()
        .await;

    let client = anonymous_client(&server);
    let ohlcv = client
        .get_ohlcv("kraken", "btcusd", None, None, &[])
        .await
        .unwrap();
    assert_eq!(ohlcv.result.periods().collect::<Vec<_>>(), vec!["3600"]);
    assert!(ohlcv.result.get_label("1h").unwrap().is_empty());
    mock.assert_async().await;
}
