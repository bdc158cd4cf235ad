//! Domain records returned by the API.
//!
//! Every struct declares its wire names with `rename_all = "camelCase"`; the
//! array-encoded records ([`Trade`], [`OrderBookItem`], [`Candle`]) decode by
//! position instead, see `conversion::tuple`.

use crate::periods::label_for_key;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Route = String;
pub type Price = Decimal;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub revision: String,
    pub uptime: String,
    pub documentation: Route,
    pub indexes: Vec<Route>,
}

// Assets

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMember {
    pub id: u64,
    pub symbol: String,
    pub name: String,
    pub fiat: bool,
    #[serde(default)]
    pub sid: Option<String>,
    pub route: Route,
}

pub type AssetList = Vec<AssetMember>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssetMarkets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Vec<MarketMember>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<Vec<MarketMember>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: u64,
    pub symbol: String,
    pub name: String,
    pub fiat: bool,
    #[serde(default)]
    pub sid: Option<String>,
    pub markets: AssetMarkets,
}

// Pairs

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairMember {
    pub id: u64,
    pub symbol: String,
    pub base: AssetMember,
    pub quote: AssetMember,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub futures_contract_period: Option<String>,
    pub route: Route,
}

pub type PairList = Vec<PairMember>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    pub id: u64,
    pub symbol: String,
    pub base: AssetMember,
    pub quote: AssetMember,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub futures_contract_period: Option<String>,
    pub route: Route,
    pub markets: Vec<MarketMember>,
}

// Markets

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketMember {
    pub id: u64,
    pub exchange: String,
    pub pair: String,
    pub active: bool,
    pub route: Route,
}

pub type MarketList = Vec<MarketMember>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRoutes {
    pub price: Route,
    pub summary: Route,
    pub orderbook: Route,
    pub trades: Route,
    pub ohlc: Route,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub id: u64,
    pub exchange: String,
    pub pair: String,
    pub active: bool,
    pub routes: MarketRoutes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPrice {
    pub price: Price,
}

/// Keyed by `market:<exchange>:<pair>`.
pub type AllPrices = BTreeMap<String, Price>;

/// `[id, timestamp, price, amount]` on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub id: String,
    pub timestamp: i64,
    pub price: Price,
    pub amount: Decimal,
}

pub type MarketTradeList = Vec<Trade>;

// Summaries

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub percentage: Decimal,
    pub absolute: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub last: Price,
    pub high: Price,
    pub low: Price,
    pub change: PriceChange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub price: PriceSummary,
    pub volume: Decimal,
    pub volume_quote: Decimal,
}

/// Keyed by `<exchange>:<pair>` or by market id, depending on `keyBy`.
pub type AllSummaries = BTreeMap<String, MarketSummary>;

// Order books

/// `[price, amount]` on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBookItem {
    pub price: Price,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBook {
    pub asks: Vec<OrderBookItem>,
    pub bids: Vec<OrderBookItem>,
    pub seq_num: u64,
}

impl OrderBook {
    pub fn best_ask(&self) -> Option<&OrderBookItem> {
        self.asks.iter().min_by(|a, b| a.price.cmp(&b.price))
    }

    pub fn best_bid(&self) -> Option<&OrderBookItem> {
        self.bids.iter().max_by(|a, b| a.price.cmp(&b.price))
    }
}

/// Liquidity sums keyed by basis points from the mid price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityLevel {
    pub base: BTreeMap<u32, Decimal>,
    pub quote: BTreeMap<u32, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookLiquidity {
    pub bid: LiquidityLevel,
    pub ask: LiquidityLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBuy {
    pub avg_price: Price,
    pub avg_delta: Decimal,
    pub avg_delta_bps: Decimal,
    pub reach_price: Price,
    pub reach_delta: Decimal,
    pub reach_delta_bps: Decimal,
    pub spend: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSell {
    pub avg_price: Price,
    pub avg_delta: Decimal,
    pub avg_delta_bps: Decimal,
    pub reach_price: Price,
    pub reach_delta: Decimal,
    pub reach_delta_bps: Decimal,
    pub receive: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookCalculator {
    pub buy: QuoteBuy,
    pub sell: QuoteSell,
}

// OHLCV

/// `[closeTime, openPrice, highPrice, lowPrice, closePrice, volume, quoteVolume]` on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub close_time: i64,
    pub open_price: Price,
    pub high_price: Price,
    pub low_price: Price,
    pub close_price: Price,
    pub volume: Decimal,
    pub quote_volume: Decimal,
}

/// Candles keyed the way the API returns them: by period seconds (`"60"`), or
/// `"604800_Monday"` for the week-Monday period.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OhlcvResult(pub BTreeMap<String, Vec<Candle>>);

impl OhlcvResult {
    pub fn get(&self, key: &str) -> Option<&[Candle]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// Candles for a label such as `"1h"`.
    pub fn get_label(&self, label: &str) -> Option<&[Candle]> {
        let key = crate::periods::seconds_for_label(label)?.to_string();
        self.get(&key)
    }

    /// Re-key the result by period label. Keys without a known label are kept as-is.
    pub fn by_label(&self) -> BTreeMap<String, Vec<Candle>> {
        self.0
            .iter()
            .map(|(key, candles)| {
                let label = label_for_key(key).map_or_else(|| key.clone(), str::to_string);
                (label, candles.clone())
            })
            .collect()
    }

    pub fn periods(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

// Exchanges

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeMember {
    pub id: u64,
    pub symbol: String,
    pub name: String,
    pub active: bool,
    pub route: Route,
}

pub type ExchangeList = Vec<ExchangeMember>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRoutes {
    pub markets: Route,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub id: u64,
    pub symbol: String,
    pub name: String,
    pub active: bool,
    pub routes: ExchangeRoutes,
}

pub type ExchangeMarkets = Vec<MarketMember>;
