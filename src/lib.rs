//! `cwatch-rs`
//!
//! Typed async client for the Cryptowatch REST API: assets, pairs, markets,
//! order books, trades and OHLCV candles.
//!
//! Prices and volumes are exact [`rust_decimal::Decimal`] values decoded from
//! the JSON token text.
//!
//! ## Quickstart
//!
//! ```no_run
//! use cwatch_rs::CryptowatchClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), cwatch_rs::CryptowatchError> {
//! let client = CryptowatchClient::new()?;
//! let price = client.get_market_price("kraken", "btcusd").await?;
//! println!("kraken btcusd = {}", price.result.price);
//! # Ok(())
//! # }
//! ```
//!
//! ## OHLCV by label
//!
//! ```no_run
//! use cwatch_rs::{CryptowatchClient, Period};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), cwatch_rs::CryptowatchError> {
//! let client = CryptowatchClient::with_api_key("my-key")?;
//! let candles = client
//!     .get_ohlcv("kraken", "btcusd", None, None, &[Period::from("1h")])
//!     .await?;
//! for candle in candles.result.get_label("1h").unwrap_or_default() {
//!     println!("{} close={}", candle.close_time, candle.close_price);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod common;
pub mod conversion;
pub mod endpoints;
pub mod models;
pub mod periods;

pub use client::{API_KEY_HEADER, CryptowatchClient, CryptowatchClientBuilder};
pub use common::{
    API_KEY_ENV, ApiErrorDetails, CryptowatchError, HttpResponse, HttpTransport, ReqwestTransport,
    Settings,
};
pub use endpoints::{CRYPTOWATCH_API_BASE, Endpoint};
pub use models::*;
pub use periods::{CanonicalPeriod, Period};
