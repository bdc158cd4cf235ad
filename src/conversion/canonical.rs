//! Encoding into canonical form: struct fields get their snake_case names and
//! tuple-encoded records become named records. Map keys are data and pass
//! through untouched, so `"604800_Monday"` or `"market:kraken:btcusd"` survive.

use super::to_canonical_key;
use super::tuple::tuple_fields;
use serde::ser::{self, Serialize, Serializer};

/// Serializes the wrapped value through [`CanonicalSerializer`].
pub(crate) struct Canonical<'a, T: ?Sized>(pub(crate) &'a T);

impl<T: ?Sized + Serialize> Serialize for Canonical<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(CanonicalSerializer(serializer))
    }
}

/// serde_json's private marker for arbitrary-precision numbers.
const JSON_NUMBER_TOKEN: &str = "$serde_json::private::Number";

pub(crate) struct CanonicalSerializer<S>(S);

macro_rules! forward_scalars {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<S::Ok, S::Error> {
                self.0.$method(v)
            }
        )*
    };
}

impl<S: Serializer> Serializer for CanonicalSerializer<S> {
    type Ok = S::Ok;
    type Error = S::Error;
    type SerializeSeq = Elements<S::SerializeSeq>;
    type SerializeTuple = Elements<S::SerializeTuple>;
    type SerializeTupleStruct = TupleFields<S::SerializeMap, S::SerializeTupleStruct>;
    type SerializeTupleVariant = Elements<S::SerializeTupleVariant>;
    type SerializeMap = Elements<S::SerializeMap>;
    type SerializeStruct = StructFields<S::SerializeMap, S::SerializeStruct>;
    type SerializeStructVariant = Elements<S::SerializeStructVariant>;

    forward_scalars!(
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
    );

    fn serialize_none(self) -> Result<S::Ok, S::Error> {
        self.0.serialize_none()
    }

    fn serialize_some<T>(self, value: &T) -> Result<S::Ok, S::Error>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_some(&Canonical(value))
    }

    fn serialize_unit(self) -> Result<S::Ok, S::Error> {
        self.0.serialize_unit()
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<S::Ok, S::Error> {
        self.0.serialize_unit_struct(name)
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<S::Ok, S::Error> {
        self.0.serialize_unit_variant(name, variant_index, variant)
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<S::Ok, S::Error>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_newtype_struct(name, &Canonical(value))
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<S::Ok, S::Error>
    where
        T: ?Sized + Serialize,
    {
        self.0
            .serialize_newtype_variant(name, variant_index, variant, &Canonical(value))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, S::Error> {
        Ok(Elements(self.0.serialize_seq(len)?))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, S::Error> {
        Ok(Elements(self.0.serialize_tuple(len)?))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, S::Error> {
        match tuple_fields(name) {
            Some(fields) => Ok(TupleFields::Named {
                map: self.0.serialize_map(Some(len))?,
                fields,
                index: 0,
            }),
            None => Ok(TupleFields::Positional(
                self.0.serialize_tuple_struct(name, len)?,
            )),
        }
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, S::Error> {
        Ok(Elements(self.0.serialize_tuple_variant(
            name,
            variant_index,
            variant,
            len,
        )?))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, S::Error> {
        Ok(Elements(self.0.serialize_map(len)?))
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, S::Error> {
        if name == JSON_NUMBER_TOKEN {
            return Ok(StructFields::Verbatim(self.0.serialize_struct(name, len)?));
        }
        Ok(StructFields::Renamed(self.0.serialize_map(Some(len))?))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, S::Error> {
        Ok(Elements(self.0.serialize_struct_variant(
            name,
            variant_index,
            variant,
            len,
        )?))
    }

    fn is_human_readable(&self) -> bool {
        self.0.is_human_readable()
    }
}

/// Compound whose children are serialized canonically and whose keys are kept.
pub(crate) struct Elements<C>(C);

impl<C: ser::SerializeSeq> ser::SerializeSeq for Elements<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), C::Error>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_element(&Canonical(value))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.0.end()
    }
}

impl<C: ser::SerializeTuple> ser::SerializeTuple for Elements<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), C::Error>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_element(&Canonical(value))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.0.end()
    }
}

impl<C: ser::SerializeTupleVariant> ser::SerializeTupleVariant for Elements<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), C::Error>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_field(&Canonical(value))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.0.end()
    }
}

impl<C: ser::SerializeMap> ser::SerializeMap for Elements<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), C::Error>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_key(key)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), C::Error>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_value(&Canonical(value))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.0.end()
    }
}

impl<C: ser::SerializeStructVariant> ser::SerializeStructVariant for Elements<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), C::Error>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_field(key, &Canonical(value))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.0.end()
    }
}

/// Struct fields, written as a map with canonical keys.
pub(crate) enum StructFields<M, S> {
    Renamed(M),
    Verbatim(S),
}

impl<M, S> ser::SerializeStruct for StructFields<M, S>
where
    M: ser::SerializeMap,
    S: ser::SerializeStruct<Ok = M::Ok, Error = M::Error>,
{
    type Ok = M::Ok;
    type Error = M::Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), M::Error>
    where
        T: ?Sized + Serialize,
    {
        match self {
            StructFields::Renamed(map) => {
                map.serialize_entry(&to_canonical_key(key), &Canonical(value))
            }
            StructFields::Verbatim(fields) => fields.serialize_field(key, value),
        }
    }

    fn end(self) -> Result<M::Ok, M::Error> {
        match self {
            StructFields::Renamed(map) => map.end(),
            StructFields::Verbatim(fields) => fields.end(),
        }
    }
}

/// Tuple-encoded records become maps keyed by their field names.
pub(crate) enum TupleFields<M, T> {
    Named {
        map: M,
        fields: &'static [&'static str],
        index: usize,
    },
    Positional(T),
}

impl<M, T> ser::SerializeTupleStruct for TupleFields<M, T>
where
    M: ser::SerializeMap,
    T: ser::SerializeTupleStruct<Ok = M::Ok, Error = M::Error>,
{
    type Ok = M::Ok;
    type Error = M::Error;

    fn serialize_field<V>(&mut self, value: &V) -> Result<(), M::Error>
    where
        V: ?Sized + Serialize,
    {
        match self {
            TupleFields::Named { map, fields, index } => {
                let key = match fields.get(*index) {
                    Some(name) => to_canonical_key(name),
                    None => index.to_string(),
                };
                *index += 1;
                map.serialize_entry(&key, &Canonical(value))
            }
            TupleFields::Positional(tuple) => tuple.serialize_field(&Canonical(value)),
        }
    }

    fn end(self) -> Result<M::Ok, M::Error> {
        match self {
            TupleFields::Named { map, .. } => map.end(),
            TupleFields::Positional(tuple) => tuple.end(),
        }
    }
}
