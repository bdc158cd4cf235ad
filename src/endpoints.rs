//! Static catalog of Cryptowatch REST endpoints.

use crate::common::CryptowatchError;

pub const CRYPTOWATCH_API_BASE: &str = "https://api.cryptowat.ch";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Root,
    ListAssets,
    AssetDetail,
    ListPairs,
    PairDetail,
    ListMarkets,
    MarketDetail,
    AllMarketPrices,
    MarketPrice,
    MarketTrades,
    MarketSummary,
    AllMarketSummaries,
    MarketOrderBook,
    MarketOrderBookLiquidity,
    MarketOrderBookCalculator,
    MarketOhlc,
    ListExchanges,
    ExchangeDetail,
    ExchangeMarkets,
}

impl Endpoint {
    pub const ALL: [Endpoint; 19] = [
        Endpoint::Root,
        Endpoint::ListAssets,
        Endpoint::AssetDetail,
        Endpoint::ListPairs,
        Endpoint::PairDetail,
        Endpoint::ListMarkets,
        Endpoint::MarketDetail,
        Endpoint::AllMarketPrices,
        Endpoint::MarketPrice,
        Endpoint::MarketTrades,
        Endpoint::MarketSummary,
        Endpoint::AllMarketSummaries,
        Endpoint::MarketOrderBook,
        Endpoint::MarketOrderBookLiquidity,
        Endpoint::MarketOrderBookCalculator,
        Endpoint::MarketOhlc,
        Endpoint::ListExchanges,
        Endpoint::ExchangeDetail,
        Endpoint::ExchangeMarkets,
    ];

    /// Path template with `{name}` placeholders.
    pub fn template(&self) -> &'static str {
        match self {
            Endpoint::Root => "/",
            Endpoint::ListAssets => "/assets",
            Endpoint::AssetDetail => "/assets/{assetCode}",
            Endpoint::ListPairs => "/pairs",
            Endpoint::PairDetail => "/pairs/{pair}",
            Endpoint::ListMarkets => "/markets",
            Endpoint::MarketDetail => "/markets/{exchange}/{pair}",
            Endpoint::AllMarketPrices => "/markets/prices",
            Endpoint::MarketPrice => "/markets/{exchange}/{pair}/price",
            Endpoint::MarketTrades => "/markets/{exchange}/{pair}/trades",
            Endpoint::MarketSummary => "/markets/{exchange}/{pair}/summary",
            Endpoint::AllMarketSummaries => "/markets/summaries",
            Endpoint::MarketOrderBook => "/markets/{exchange}/{pair}/orderbook",
            Endpoint::MarketOrderBookLiquidity => "/markets/{exchange}/{pair}/orderbook/liquidity",
            Endpoint::MarketOrderBookCalculator => {
                "/markets/{exchange}/{pair}/orderbook/calculator"
            }
            Endpoint::MarketOhlc => "/markets/{exchange}/{pair}/ohlc",
            Endpoint::ListExchanges => "/exchanges",
            Endpoint::ExchangeDetail => "/exchanges/{exchange}",
            Endpoint::ExchangeMarkets => "/markets/{exchange}",
        }
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.template();
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            names.push(&rest[start + 1..start + len]);
            rest = &rest[start + len + 1..];
        }
        names
    }

    /// Substitute every placeholder from `params`. Values are percent-encoded.
    pub fn path(&self, params: &[(&str, &str)]) -> Result<String, CryptowatchError> {
        let mut path = self.template().to_string();
        for name in self.placeholders() {
            let value = params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| {
                    CryptowatchError::MissingParameter(format!(
                        "'{}' is required by {}",
                        name,
                        self.template()
                    ))
                })?;
            path = path.replace(&format!("{{{}}}", name), &urlencoding::encode(value));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_paths_need_no_params() {
        assert_eq!(Endpoint::Root.path(&[]).unwrap(), "/");
        assert_eq!(Endpoint::AllMarketPrices.path(&[]).unwrap(), "/markets/prices");
    }

    #[test]
    fn test_substitution() {
        let path = Endpoint::MarketOrderBookLiquidity
            .path(&[("exchange", "kraken"), ("pair", "btcusd")])
            .unwrap();
        assert_eq!(path, "/markets/kraken/btcusd/orderbook/liquidity");

        let path = Endpoint::AssetDetail.path(&[("assetCode", "btc")]).unwrap();
        assert_eq!(path, "/assets/btc");
    }

    #[test]
    fn test_values_are_encoded() {
        let path = Endpoint::PairDetail.path(&[("pair", "btc/usd")]).unwrap();
        assert_eq!(path, "/pairs/btc%2Fusd");
    }

    #[test]
    fn test_missing_parameter() {
        let err = Endpoint::MarketDetail
            .path(&[("exchange", "kraken")])
            .unwrap_err();
        match err {
            CryptowatchError::MissingParameter(msg) => assert!(msg.contains("'pair'")),
            other => panic!("expected MissingParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            Endpoint::MarketOhlc.placeholders(),
            vec!["exchange", "pair"]
        );
        assert!(Endpoint::ListExchanges.placeholders().is_empty());
        assert!(Endpoint::ALL.iter().all(|e| e.template().starts_with('/')));
    }
}
