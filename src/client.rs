//! The Cryptowatch REST client.
//!
//! One method per endpoint. Each call builds the path from the endpoint
//! catalog, appends the query parameters that are set, performs a single GET and
//! decodes the body into the matching envelope. Non-success statuses are
//! classified into errors before any decoding happens; nothing is retried.

use crate::common::{
    ApiErrorDetails, CryptowatchError, DEFAULT_TIMEOUT, HttpTransport, ReqwestTransport, Settings,
};
use crate::conversion::structure;
use crate::endpoints::{CRYPTOWATCH_API_BASE, Endpoint};
use crate::models::{
    AllPrices, AllSummaries, Asset, AssetList, Exchange, ExchangeList, ExchangeMarkets, Info,
    Market, MarketList, MarketPrice, MarketSummariesParams, MarketSummary, MarketTradeList,
    OhlcvParams, OhlcvResult, OrderBook, OrderBookCalculator, OrderBookCalculatorParams,
    OrderBookLiquidity, OrderBookParams, PaginatedResponse, PaginationParams, Pair, PairList,
    QueryParams, Response, ResponseRoot, SummaryKey, TradeParams,
};
use crate::periods::Period;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-CW-API-Key";

const NO_KEY_MESSAGE: &str = "You have not set an API Key. Anonymous users are limited to \
10 Cryptowatch Credits worth of API calls per 24-hour period. See \
https://docs.cryptowat.ch/rest-api/rate-limit#api-request-pricing-structure for more information.";

/// Builder for [`CryptowatchClient`].
#[derive(Debug, Clone)]
pub struct CryptowatchClientBuilder {
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
    headers: Vec<(String, String)>,
    from_env: bool,
}

impl Default for CryptowatchClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: CRYPTOWATCH_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            headers: Vec::new(),
            from_env: true,
        }
    }
}

impl CryptowatchClientBuilder {
    /// Use this key instead of `CW_API_KEY`.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Ignore `CW_API_KEY` and `.env`.
    pub fn without_env(mut self) -> Self {
        self.from_env = false;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<CryptowatchClient, CryptowatchError> {
        let transport = ReqwestTransport::new(self.timeout)?;
        self.build_with_transport(transport)
    }

    pub fn build_with_transport<T: HttpTransport>(
        self,
        transport: T,
    ) -> Result<CryptowatchClient<T>, CryptowatchError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(CryptowatchError::Config(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }

        let api_key = match self.api_key {
            Some(key) if key.trim().is_empty() => {
                return Err(CryptowatchError::ApiKey(
                    "Please provide a valid API key".to_string(),
                ));
            }
            Some(key) => Some(key),
            None if self.from_env => Settings::from_env().api_key,
            None => None,
        };

        if api_key.is_none() {
            tracing::warn!("{}", NO_KEY_MESSAGE);
        }

        Ok(CryptowatchClient {
            transport,
            base_url: self.base_url,
            api_key,
            headers: self.headers,
        })
    }
}

pub struct CryptowatchClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    base_url: String,
    api_key: Option<String>,
    headers: Vec<(String, String)>,
}

impl CryptowatchClient {
    /// Client for the public API, keyed from `CW_API_KEY` when it is set.
    pub fn new() -> Result<Self, CryptowatchError> {
        Self::builder().build()
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, CryptowatchError> {
        Self::builder().api_key(api_key).build()
    }

    pub fn builder() -> CryptowatchClientBuilder {
        CryptowatchClientBuilder::default()
    }
}

impl<T: HttpTransport> CryptowatchClient<T> {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Replace the API key. Empty keys are rejected.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<(), CryptowatchError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CryptowatchError::ApiKey(
                "Please provide a valid API key".to_string(),
            ));
        }
        self.api_key = Some(api_key);
        Ok(())
    }

    /// Headers sent with every request.
    pub fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        headers.extend(self.headers.iter().cloned());
        if let Some(key) = &self.api_key {
            headers.push((API_KEY_HEADER.to_string(), key.clone()));
        }
        headers
    }

    /// Full request URL for an endpoint.
    pub fn build_url(
        &self,
        endpoint: Endpoint,
        path_params: &[(&str, &str)],
        params: Option<&dyn QueryParams>,
    ) -> Result<String, CryptowatchError> {
        let mut url = format!("{}{}", self.base_url, endpoint.path(path_params)?);
        let query = match params {
            Some(params) => params.to_query()?,
            None => Vec::new(),
        };
        if !query.is_empty() {
            let query: Vec<String> = query
                .iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
                .collect();
            url = format!("{}?{}", url, query.join("&"));
        }
        Ok(url)
    }

    async fn request<R: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        path_params: &[(&str, &str)],
        params: Option<&dyn QueryParams>,
    ) -> Result<R, CryptowatchError> {
        let url = self.build_url(endpoint, path_params, params)?;
        if !self.is_authenticated() {
            tracing::debug!("anonymous request to {}", url);
        }

        let response = self.transport.get(&url, &self.request_headers()).await?;
        tracing::debug!(status = response.status, url = %url, "Cryptowatch response");

        if !response.is_success() {
            return Err(CryptowatchError::from_status(ApiErrorDetails::new(
                response.status,
                response.body,
                response.headers,
            )));
        }

        structure(&response.body)
    }

    /// API status information.
    pub async fn get_info(&self) -> Result<ResponseRoot<Info>, CryptowatchError> {
        self.request(Endpoint::Root, &[], None).await
    }

    // Assets

    pub async fn list_assets(
        &self,
        cursor: Option<String>,
        limit: Option<u32>,
    ) -> Result<PaginatedResponse<AssetList>, CryptowatchError> {
        let params = PaginationParams::new(cursor, limit)?;
        self.request(Endpoint::ListAssets, &[], Some(&params)).await
    }

    pub async fn get_asset(&self, asset_code: &str) -> Result<Response<Asset>, CryptowatchError> {
        self.request(Endpoint::AssetDetail, &[("assetCode", asset_code)], None)
            .await
    }

    // Pairs

    pub async fn list_pairs(
        &self,
        cursor: Option<String>,
        limit: Option<u32>,
    ) -> Result<PaginatedResponse<PairList>, CryptowatchError> {
        let params = PaginationParams::new(cursor, limit)?;
        self.request(Endpoint::ListPairs, &[], Some(&params)).await
    }

    pub async fn get_pair(&self, pair: &str) -> Result<Response<Pair>, CryptowatchError> {
        self.request(Endpoint::PairDetail, &[("pair", pair)], None)
            .await
    }

    // Markets

    pub async fn list_markets(
        &self,
        cursor: Option<String>,
        limit: Option<u32>,
    ) -> Result<PaginatedResponse<MarketList>, CryptowatchError> {
        let params = PaginationParams::new(cursor, limit)?;
        self.request(Endpoint::ListMarkets, &[], Some(&params)).await
    }

    pub async fn get_market(
        &self,
        exchange: &str,
        pair: &str,
    ) -> Result<Response<Market>, CryptowatchError> {
        self.request(
            Endpoint::MarketDetail,
            &[("exchange", exchange), ("pair", pair)],
            None,
        )
        .await
    }

    /// Last price of one market.
    pub async fn get_market_price(
        &self,
        exchange: &str,
        pair: &str,
    ) -> Result<Response<MarketPrice>, CryptowatchError> {
        self.request(
            Endpoint::MarketPrice,
            &[("exchange", exchange), ("pair", pair)],
            None,
        )
        .await
    }

    pub async fn get_all_market_prices(
        &self,
        cursor: Option<String>,
        limit: Option<u32>,
    ) -> Result<PaginatedResponse<AllPrices>, CryptowatchError> {
        let params = PaginationParams::new(cursor, limit)?;
        self.request(Endpoint::AllMarketPrices, &[], Some(&params))
            .await
    }

    /// Most recent trades, optionally since a unix timestamp.
    pub async fn get_market_trades(
        &self,
        exchange: &str,
        pair: &str,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Response<MarketTradeList>, CryptowatchError> {
        let params = TradeParams::new(since, limit)?;
        self.request(
            Endpoint::MarketTrades,
            &[("exchange", exchange), ("pair", pair)],
            Some(&params),
        )
        .await
    }

    /// 24h summary of a market: last, high and low price, change, volume and quote volume.
    pub async fn get_market_summary(
        &self,
        exchange: &str,
        pair: &str,
    ) -> Result<Response<MarketSummary>, CryptowatchError> {
        self.request(
            Endpoint::MarketSummary,
            &[("exchange", exchange), ("pair", pair)],
            None,
        )
        .await
    }

    pub async fn get_all_market_summaries(
        &self,
        cursor: Option<String>,
        limit: Option<u32>,
        key_by: Option<SummaryKey>,
    ) -> Result<Response<AllSummaries>, CryptowatchError> {
        let params = MarketSummariesParams::new(cursor, limit, key_by)?;
        self.request(Endpoint::AllMarketSummaries, &[], Some(&params))
            .await
    }

    // Order books

    pub async fn get_market_order_book(
        &self,
        exchange: &str,
        pair: &str,
        depth: Option<u32>,
        span: Option<f64>,
        limit: Option<u32>,
    ) -> Result<Response<OrderBook>, CryptowatchError> {
        let params = OrderBookParams::new(depth, span, limit)?;
        self.request(
            Endpoint::MarketOrderBook,
            &[("exchange", exchange), ("pair", pair)],
            Some(&params),
        )
        .await
    }

    /// Liquidity sums at several basis point levels of the order book.
    pub async fn get_market_order_book_liquidity(
        &self,
        exchange: &str,
        pair: &str,
    ) -> Result<Response<OrderBookLiquidity>, CryptowatchError> {
        self.request(
            Endpoint::MarketOrderBookLiquidity,
            &[("exchange", exchange), ("pair", pair)],
            None,
        )
        .await
    }

    /// Live quote from the order book for buying and selling `amount`.
    pub async fn calculate_quote(
        &self,
        exchange: &str,
        pair: &str,
        amount: f64,
    ) -> Result<Response<OrderBookCalculator>, CryptowatchError> {
        let params = OrderBookCalculatorParams::new(amount)?;
        self.request(
            Endpoint::MarketOrderBookCalculator,
            &[("exchange", exchange), ("pair", pair)],
            Some(&params),
        )
        .await
    }

    /// OHLCV candles. The result is keyed by period seconds whatever form the
    /// periods were given in; see [`OhlcvResult::get_label`].
    pub async fn get_ohlcv(
        &self,
        exchange: &str,
        pair: &str,
        before: Option<i64>,
        after: Option<i64>,
        periods: &[Period],
    ) -> Result<Response<OhlcvResult>, CryptowatchError> {
        let params = OhlcvParams::new(before, after, periods)?;
        self.request(
            Endpoint::MarketOhlc,
            &[("exchange", exchange), ("pair", pair)],
            Some(&params),
        )
        .await
    }

    // Exchanges

    pub async fn list_exchanges(&self) -> Result<Response<ExchangeList>, CryptowatchError> {
        self.request(Endpoint::ListExchanges, &[], None).await
    }

    pub async fn get_exchange(
        &self,
        exchange: &str,
    ) -> Result<Response<Exchange>, CryptowatchError> {
        self.request(Endpoint::ExchangeDetail, &[("exchange", exchange)], None)
            .await
    }

    pub async fn list_exchange_markets(
        &self,
        exchange: &str,
    ) -> Result<Response<ExchangeMarkets>, CryptowatchError> {
        self.request(Endpoint::ExchangeMarkets, &[("exchange", exchange)], None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CryptowatchClient {
        CryptowatchClient::builder()
            .without_env()
            .build()
            .unwrap()
    }

    #[test]
    fn test_anonymous_client_has_no_key_header() {
        let client = client();
        assert!(!client.is_authenticated());
        assert!(
            client
                .request_headers()
                .iter()
                .all(|(name, _)| name != API_KEY_HEADER)
        );
    }

    #[test]
    fn test_api_key_header() {
        let client = CryptowatchClient::builder()
            .without_env()
            .api_key("secret")
            .header("User-Agent", "cwatch-test")
            .build()
            .unwrap();
        assert!(client.is_authenticated());
        let headers = client.request_headers();
        assert!(headers.contains(&(API_KEY_HEADER.to_string(), "secret".to_string())));
        assert!(headers.contains(&("User-Agent".to_string(), "cwatch-test".to_string())));
    }

    #[test]
    fn test_set_api_key() {
        let mut client = client();
        assert!(matches!(
            client.set_api_key(""),
            Err(CryptowatchError::ApiKey(_))
        ));
        assert!(!client.is_authenticated());

        client.set_api_key("abc").unwrap();
        assert_eq!(client.api_key(), Some("abc"));
    }

    #[test]
    fn test_empty_key_rejected_at_build() {
        let result = CryptowatchClient::builder().without_env().api_key(" ").build();
        assert!(matches!(result, Err(CryptowatchError::ApiKey(_))));
    }

    #[test]
    fn test_base_url() {
        let client = CryptowatchClient::builder()
            .without_env()
            .base_url("http://127.0.0.1:8080/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8080");

        let result = CryptowatchClient::builder()
            .without_env()
            .base_url("api.cryptowat.ch")
            .build();
        assert!(matches!(result, Err(CryptowatchError::Config(_))));
    }

    #[test]
    fn test_build_url() {
        let client = client();
        let params = TradeParams::new(Some(1607016991), Some(100)).unwrap();
        let url = client
            .build_url(
                Endpoint::MarketTrades,
                &[("exchange", "kraken"), ("pair", "btcusd")],
                Some(&params),
            )
            .unwrap();
        assert_eq!(
            url,
            "https://api.cryptowat.ch/markets/kraken/btcusd/trades?since=1607016991&limit=100"
        );

        let empty = TradeParams::new(None, None).unwrap();
        let url = client
            .build_url(Endpoint::ListExchanges, &[], Some(&empty))
            .unwrap();
        assert_eq!(url, "https://api.cryptowat.ch/exchanges");
    }

    #[test]
    fn test_build_url_encodes_periods() {
        let client = client();
        let periods: Vec<Period> = vec!["1m".into(), "1w_monday".into()];
        let params = OhlcvParams::new(None, None, &periods).unwrap();
        let url = client
            .build_url(
                Endpoint::MarketOhlc,
                &[("exchange", "kraken"), ("pair", "btcusd")],
                Some(&params),
            )
            .unwrap();
        assert_eq!(
            url,
            "https://api.cryptowat.ch/markets/kraken/btcusd/ohlc?periods=60%2C604800_Monday"
        );
    }

    #[test]
    fn test_missing_path_parameter() {
        let client = client();
        assert!(matches!(
            client.build_url(Endpoint::MarketPrice, &[("exchange", "kraken")], None),
            Err(CryptowatchError::MissingParameter(_))
        ));
    }
}
