//! Positional decoding of array-encoded records.
//!
//! Position is the only contract: a short array fails with `invalid_length`,
//! extra trailing elements are ignored.

use crate::models::{Candle, OrderBookItem, Trade};
use rust_decimal::Decimal;
use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::ser::SerializeTupleStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Field names in array order, used in error messages.
const TRADE_FIELDS: [&str; 4] = ["id", "timestamp", "price", "amount"];
const ORDER_BOOK_ITEM_FIELDS: [&str; 2] = ["price", "amount"];
const CANDLE_FIELDS: [&str; 7] = [
    "closeTime",
    "openPrice",
    "highPrice",
    "lowPrice",
    "closePrice",
    "volume",
    "quoteVolume",
];

/// A record that is transported as a fixed-position JSON array.
trait TupleRecord: Sized {
    const NAME: &'static str;
    const FIELDS: &'static [&'static str];

    fn visit<'de, A: SeqAccess<'de>>(seq: &mut Positional<'_, A>) -> Result<Self, A::Error>;
}

/// Reads successive array elements, reporting the missing field on a short array.
struct Positional<'a, A> {
    seq: &'a mut A,
    index: usize,
    fields: &'static [&'static str],
}

impl<'de, A: SeqAccess<'de>> Positional<'_, A> {
    fn next<T: Deserialize<'de>>(&mut self) -> Result<T, A::Error> {
        let index = self.index;
        self.index += 1;
        self.seq.next_element()?.ok_or_else(|| {
            <A::Error as de::Error>::invalid_length(
                index,
                &format!(
                    "an array of {} elements (missing `{}`)",
                    self.fields.len(),
                    self.fields[index]
                )
                .as_str(),
            )
        })
    }
}

struct TupleVisitor<T>(PhantomData<T>);

impl<'de, T: TupleRecord> Visitor<'de> for TupleVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a {} array of {} elements", T::NAME, T::FIELDS.len())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<T, A::Error> {
        let record = {
            let mut positional = Positional {
                seq: &mut seq,
                index: 0,
                fields: T::FIELDS,
            };
            T::visit(&mut positional)?
        };
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(record)
    }
}

/// Wire field names of a tuple-encoded record, looked up by type name.
pub(crate) fn tuple_fields(name: &str) -> Option<&'static [&'static str]> {
    [
        (Trade::NAME, Trade::FIELDS),
        (OrderBookItem::NAME, OrderBookItem::FIELDS),
        (Candle::NAME, Candle::FIELDS),
    ]
    .into_iter()
    .find(|(record, _)| *record == name)
    .map(|(_, fields)| fields)
}

fn deserialize_tuple<'de, D: Deserializer<'de>, T: TupleRecord>(
    deserializer: D,
) -> Result<T, D::Error> {
    deserializer.deserialize_seq(TupleVisitor(PhantomData))
}

/// Trade ids arrive as JSON numbers or strings.
fn trade_id<E: de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(E::custom(format!(
            "trade id must be a string or number, got {}",
            other
        ))),
    }
}

impl TupleRecord for Trade {
    const NAME: &'static str = "Trade";
    const FIELDS: &'static [&'static str] = &TRADE_FIELDS;

    fn visit<'de, A: SeqAccess<'de>>(seq: &mut Positional<'_, A>) -> Result<Self, A::Error> {
        Ok(Trade {
            id: trade_id(seq.next::<Value>()?)?,
            timestamp: seq.next()?,
            price: seq.next()?,
            amount: seq.next()?,
        })
    }
}

impl TupleRecord for OrderBookItem {
    const NAME: &'static str = "OrderBookItem";
    const FIELDS: &'static [&'static str] = &ORDER_BOOK_ITEM_FIELDS;

    fn visit<'de, A: SeqAccess<'de>>(seq: &mut Positional<'_, A>) -> Result<Self, A::Error> {
        Ok(OrderBookItem {
            price: seq.next()?,
            amount: seq.next()?,
        })
    }
}

impl TupleRecord for Candle {
    const NAME: &'static str = "Candle";
    const FIELDS: &'static [&'static str] = &CANDLE_FIELDS;

    fn visit<'de, A: SeqAccess<'de>>(seq: &mut Positional<'_, A>) -> Result<Self, A::Error> {
        Ok(Candle {
            close_time: seq.next()?,
            open_price: seq.next()?,
            high_price: seq.next()?,
            low_price: seq.next()?,
            close_price: seq.next()?,
            volume: seq.next()?,
            quote_volume: seq.next()?,
        })
    }
}

impl<'de> Deserialize<'de> for Trade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tuple(deserializer)
    }
}

impl<'de> Deserialize<'de> for OrderBookItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tuple(deserializer)
    }
}

impl<'de> Deserialize<'de> for Candle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tuple(deserializer)
    }
}

// Encoding writes the same positional arrays back, as named tuple structs so the
// canonical encoder can recover field names.

impl Serialize for Trade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple_struct(Self::NAME, 4)?;
        tuple.serialize_field(&self.id)?;
        tuple.serialize_field(&self.timestamp)?;
        tuple.serialize_field(&self.price)?;
        tuple.serialize_field(&self.amount)?;
        tuple.end()
    }
}

impl Serialize for OrderBookItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple_struct(Self::NAME, 2)?;
        tuple.serialize_field(&self.price)?;
        tuple.serialize_field(&self.amount)?;
        tuple.end()
    }
}

impl Serialize for Candle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let decimals: [&Decimal; 6] = [
            &self.open_price,
            &self.high_price,
            &self.low_price,
            &self.close_price,
            &self.volume,
            &self.quote_volume,
        ];
        let mut tuple = serializer.serialize_tuple_struct(Self::NAME, 7)?;
        tuple.serialize_field(&self.close_time)?;
        for value in decimals {
            tuple.serialize_field(value)?;
        }
        tuple.end()
    }
}
