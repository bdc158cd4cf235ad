//! Query parameters, validated when constructed.
//!
//! Fields are named canonically; [`QueryParams::to_query`] translates them to
//! wire keys and leaves unset fields out entirely.

use crate::common::CryptowatchError;
use crate::conversion::to_wire_key;
use crate::periods::{Period, resolve_periods};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Upper bound of the `limit` parameter.
pub const MAX_LIMIT: u32 = 5000;

pub trait QueryParams {
    /// Flat `(wire key, value)` pairs; unset fields are omitted.
    fn to_query(&self) -> Result<Vec<(String, String)>, CryptowatchError>;
}

/// Blanket flattening of a serializable params struct.
fn flatten<T: Serialize>(params: &T) -> Result<Vec<(String, String)>, CryptowatchError> {
    let value = serde_json::to_value(params)
        .map_err(|e| CryptowatchError::InvalidParameter(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(CryptowatchError::InvalidParameter(
            "query parameters must be a struct".to_string(),
        ));
    };

    let mut pairs = Vec::with_capacity(fields.len());
    for (name, value) in fields {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(CryptowatchError::InvalidParameter(format!(
                    "`{}` must be a scalar, got {}",
                    name, other
                )));
            }
        };
        pairs.push((to_wire_key(&name), value));
    }
    Ok(pairs)
}

fn check_limit(limit: Option<u32>) -> Result<Option<u32>, CryptowatchError> {
    match limit {
        Some(limit) if limit > MAX_LIMIT => Err(CryptowatchError::InvalidParameter(format!(
            "limit must be at most {}, got {}",
            MAX_LIMIT, limit
        ))),
        other => Ok(other),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaginationParams {
    cursor: Option<String>,
    limit: Option<u32>,
}

impl PaginationParams {
    pub fn new(cursor: Option<String>, limit: Option<u32>) -> Result<Self, CryptowatchError> {
        Ok(Self {
            cursor,
            limit: check_limit(limit)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TradeParams {
    since: Option<i64>,
    limit: Option<u32>,
}

impl TradeParams {
    pub fn new(since: Option<i64>, limit: Option<u32>) -> Result<Self, CryptowatchError> {
        Ok(Self {
            since,
            limit: check_limit(limit)?,
        })
    }
}

/// How `/markets/summaries` keys its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryKey {
    Id,
    Symbols,
}

impl fmt::Display for SummaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryKey::Id => f.write_str("id"),
            SummaryKey::Symbols => f.write_str("symbols"),
        }
    }
}

impl FromStr for SummaryKey {
    type Err = CryptowatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SummaryKey::Id),
            "symbols" => Ok(SummaryKey::Symbols),
            other => Err(CryptowatchError::InvalidParameter(format!(
                "keyBy must be `id` or `symbols`, got `{}`",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarketSummariesParams {
    cursor: Option<String>,
    limit: Option<u32>,
    key_by: Option<SummaryKey>,
}

impl MarketSummariesParams {
    pub fn new(
        cursor: Option<String>,
        limit: Option<u32>,
        key_by: Option<SummaryKey>,
    ) -> Result<Self, CryptowatchError> {
        Ok(Self {
            cursor,
            limit: check_limit(limit)?,
            key_by,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderBookParams {
    depth: Option<u32>,
    span: Option<f64>,
    limit: Option<u32>,
}

impl OrderBookParams {
    pub fn new(
        depth: Option<u32>,
        span: Option<f64>,
        limit: Option<u32>,
    ) -> Result<Self, CryptowatchError> {
        if let Some(span) = span {
            if !span.is_finite() || span < 0.0 {
                return Err(CryptowatchError::InvalidParameter(format!(
                    "span must be a non-negative number, got {}",
                    span
                )));
            }
        }
        Ok(Self {
            depth,
            span,
            limit: check_limit(limit)?,
        })
    }
}

/// The amount is sent as a float, not a decimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBookCalculatorParams {
    amount: f64,
}

impl OrderBookCalculatorParams {
    pub fn new(amount: f64) -> Result<Self, CryptowatchError> {
        if !amount.is_finite() {
            return Err(CryptowatchError::InvalidParameter(format!(
                "amount must be a finite number, got {}",
                amount
            )));
        }
        Ok(Self { amount })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OhlcvParams {
    before: Option<i64>,
    after: Option<i64>,
    periods: Option<String>,
}

impl OhlcvParams {
    /// Periods are resolved here, so an invalid label fails before any request.
    pub fn new(
        before: Option<i64>,
        after: Option<i64>,
        periods: &[Period],
    ) -> Result<Self, CryptowatchError> {
        Ok(Self {
            before,
            after,
            periods: resolve_periods(periods)?,
        })
    }

    pub fn periods(&self) -> Option<&str> {
        self.periods.as_deref()
    }
}

macro_rules! impl_query_params {
    ($($params:ty),* $(,)?) => {
        $(
            impl QueryParams for $params {
                fn to_query(&self) -> Result<Vec<(String, String)>, CryptowatchError> {
                    flatten(self)
                }
            }
        )*
    };
}

impl_query_params!(
    PaginationParams,
    TradeParams,
    MarketSummariesParams,
    OrderBookParams,
    OrderBookCalculatorParams,
    OhlcvParams,
);
