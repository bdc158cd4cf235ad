//! OHLCV period labels and their resolution into the `periods` query value.
//!
//! See <https://docs.cryptowat.ch/rest-api/markets/ohlc#period-values>.

use crate::common::CryptowatchError;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One week, aligned to Monday.
pub const ONE_WEEK_MONDAY: &str = "604800_Monday";

/// Label table, in declaration order.
pub const PERIOD_LABELS: [(&str, CanonicalPeriod); 14] = [
    ("1m", CanonicalPeriod::Seconds(60)),
    ("3m", CanonicalPeriod::Seconds(180)),
    ("5m", CanonicalPeriod::Seconds(300)),
    ("15m", CanonicalPeriod::Seconds(900)),
    ("30m", CanonicalPeriod::Seconds(1800)),
    ("1h", CanonicalPeriod::Seconds(3600)),
    ("2h", CanonicalPeriod::Seconds(7200)),
    ("4h", CanonicalPeriod::Seconds(14400)),
    ("6h", CanonicalPeriod::Seconds(21600)),
    ("12h", CanonicalPeriod::Seconds(43200)),
    ("1d", CanonicalPeriod::Seconds(86400)),
    ("3d", CanonicalPeriod::Seconds(259200)),
    ("1w", CanonicalPeriod::Seconds(604800)),
    ("1w_monday", CanonicalPeriod::WeekMonday),
];

/// A period value the API understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalPeriod {
    Seconds(u32),
    WeekMonday,
}

impl fmt::Display for CanonicalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalPeriod::Seconds(seconds) => write!(f, "{}", seconds),
            CanonicalPeriod::WeekMonday => f.write_str(ONE_WEEK_MONDAY),
        }
    }
}

/// A caller-supplied period: a second count or a label such as `"1h"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Period {
    Seconds(u32),
    Label(String),
}

impl Period {
    pub fn resolve(&self) -> Result<CanonicalPeriod, CryptowatchError> {
        match self {
            Period::Seconds(seconds) => PERIOD_LABELS
                .iter()
                .map(|(_, canonical)| *canonical)
                .find(|canonical| *canonical == CanonicalPeriod::Seconds(*seconds))
                .ok_or_else(|| {
                    CryptowatchError::InvalidPeriod(format!("Invalid period value: {}", seconds))
                }),
            Period::Label(label) if label == ONE_WEEK_MONDAY => Ok(CanonicalPeriod::WeekMonday),
            Period::Label(label) => seconds_for_label(label).ok_or_else(|| {
                CryptowatchError::InvalidPeriod(format!("Invalid period label: {}", label))
            }),
        }
    }
}

impl From<u32> for Period {
    fn from(seconds: u32) -> Self {
        Period::Seconds(seconds)
    }
}

impl From<&str> for Period {
    fn from(label: &str) -> Self {
        Period::Label(label.to_string())
    }
}

impl From<String> for Period {
    fn from(label: String) -> Self {
        Period::Label(label)
    }
}

impl FromStr for Period {
    type Err = std::convert::Infallible;

    /// All-digit input is a second count, anything else a label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(seconds) = s.parse::<u32>() {
                return Ok(Period::Seconds(seconds));
            }
        }
        Ok(Period::Label(s.to_string()))
    }
}

pub fn seconds_for_label(label: &str) -> Option<CanonicalPeriod> {
    PERIOD_LABELS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, canonical)| *canonical)
}

/// Reverse lookup from an OHLCV result key (`"60"`, `"604800_Monday"`) to a label.
/// With several candidates the shortest label wins, then the first declared.
pub fn label_for_key(key: &str) -> Option<&'static str> {
    PERIOD_LABELS
        .iter()
        .filter(|(_, canonical)| canonical.to_string() == key)
        .map(|(name, _)| *name)
        .min_by_key(|name| name.len())
}

/// Resolve periods into the comma-joined value of the `periods` query parameter.
///
/// Duplicates collapse, and values are ordered by string length and then
/// lexically, so the week-Monday sentinel always comes last. Empty input
/// yields `None`.
pub fn resolve_periods<P>(periods: &[P]) -> Result<Option<String>, CryptowatchError>
where
    P: Clone + Into<Period>,
{
    if periods.is_empty() {
        return Ok(None);
    }

    let mut values = BTreeSet::new();
    for period in periods {
        let period: Period = period.clone().into();
        values.insert(period.resolve()?.to_string());
    }

    let mut values: Vec<String> = values.into_iter().collect();
    values.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    Ok(Some(values.join(",")))
}
