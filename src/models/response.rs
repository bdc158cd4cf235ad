//! Response envelopes and allowance metadata.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pagination cursor returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub last: String,
    pub has_more: bool,
}

/// Request-cost accounting returned alongside most results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AllowanceWire", into = "AllowanceWire")]
pub enum Allowance {
    Anonymous {
        cost: Decimal,
        remaining: Decimal,
        upgrade: String,
    },
    Authenticated {
        cost: Decimal,
        remaining: Decimal,
        remaining_paid: Decimal,
        account: String,
    },
}

impl Allowance {
    pub fn cost(&self) -> Decimal {
        match self {
            Allowance::Anonymous { cost, .. } | Allowance::Authenticated { cost, .. } => *cost,
        }
    }

    pub fn remaining(&self) -> Decimal {
        match self {
            Allowance::Anonymous { remaining, .. }
            | Allowance::Authenticated { remaining, .. } => *remaining,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Allowance::Authenticated { .. })
    }
}

/// Flat wire shape of [`Allowance`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceWire {
    cost: Decimal,
    remaining: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    upgrade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remaining_paid: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account: Option<String>,
}

impl TryFrom<AllowanceWire> for Allowance {
    type Error = String;

    fn try_from(raw: AllowanceWire) -> Result<Self, Self::Error> {
        match (raw.remaining_paid, raw.account, raw.upgrade) {
            (Some(remaining_paid), Some(account), _) => Ok(Allowance::Authenticated {
                cost: raw.cost,
                remaining: raw.remaining,
                remaining_paid,
                account,
            }),
            (_, _, Some(upgrade)) => Ok(Allowance::Anonymous {
                cost: raw.cost,
                remaining: raw.remaining,
                upgrade,
            }),
            _ => Err(
                "allowance has neither `upgrade` nor `remainingPaid` and `account`".to_string(),
            ),
        }
    }
}

impl From<Allowance> for AllowanceWire {
    fn from(allowance: Allowance) -> Self {
        match allowance {
            Allowance::Anonymous {
                cost,
                remaining,
                upgrade,
            } => AllowanceWire {
                cost,
                remaining,
                upgrade: Some(upgrade),
                remaining_paid: None,
                account: None,
            },
            Allowance::Authenticated {
                cost,
                remaining,
                remaining_paid,
                account,
            } => AllowanceWire {
                cost,
                remaining,
                upgrade: None,
                remaining_paid: Some(remaining_paid),
                account: Some(account),
            },
        }
    }
}

/// Bare result, as returned by the API root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRoot<T> {
    pub result: T,
}

/// Result with allowance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    pub result: T,
    pub allowance: Allowance,
}

/// Result with allowance and pagination cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub result: T,
    pub allowance: Allowance,
    pub cursor: Cursor,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{structure, unstructure};
    use std::str::FromStr;

    #[test]
    fn test_anonymous_allowance() {
        let allowance: Allowance =
            structure(r#"{"cost":0.015,"remaining":9.985,"upgrade":"For unlimited API access, create an account"}"#)
                .unwrap();
        assert!(!allowance.is_authenticated());
        assert_eq!(allowance.cost(), Decimal::from_str("0.015").unwrap());
        assert_eq!(allowance.remaining(), Decimal::from_str("9.985").unwrap());
    }

    #[test]
    fn test_authenticated_allowance() {
        let allowance: Allowance = structure(
            r#"{"cost":0.005,"remaining":9.995,"remainingPaid":0,"account":"user@example.com"}"#,
        )
        .unwrap();
        match &allowance {
            Allowance::Authenticated {
                remaining_paid,
                account,
                ..
            } => {
                assert_eq!(*remaining_paid, Decimal::ZERO);
                assert_eq!(account, "user@example.com");
            }
            other => panic!("expected authenticated allowance, got {:?}", other),
        }

        let wire = unstructure(&allowance).unwrap();
        assert_eq!(wire["remainingPaid"], "0");
        assert!(wire.get("upgrade").is_none());
    }

    #[test]
    fn test_allowance_needs_a_variant() {
        assert!(structure::<Allowance>(r#"{"cost":1,"remaining":2}"#).is_err());
    }

    #[test]
    fn test_cursor() {
        let cursor: Cursor = structure(r#"{"last":"abc","hasMore":true}"#).unwrap();
        assert_eq!(cursor.last, "abc");
        assert!(cursor.has_more);
        assert_eq!(unstructure(&cursor).unwrap()["hasMore"], true);
    }
}
