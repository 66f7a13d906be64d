//! Lenient money parsing
//!
//! Prices are authored in the builder UI and arrive as JSON numbers or,
//! from older documents, numeric strings. Anything that does not read as a
//! number is treated as absent so that a bad price never fails a schema.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Read a JSON value as a decimal amount
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn serialize_decimal<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract().is_zero() {
        if let Some(whole) = value.to_i64() {
            return serializer.serialize_i64(whole);
        }
    }
    serializer.serialize_f64(value.to_f64().unwrap_or_default())
}

/// Decimal written as a JSON number
pub mod amount {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_decimal(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(decimal_from_json(&raw).unwrap_or_default())
    }
}

/// Optional decimal written as a JSON number, non-numeric input reads as `None`
pub mod optional_amount {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serialize_decimal(v, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Decimal>, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(decimal_from_json(&raw))
    }
}

/// Weekday overrides keyed `0` (Sunday) through `6` (Saturday)
pub mod weekday_prices {
    use super::*;
    use serde::ser::SerializeMap;

    pub fn serialize<S: Serializer>(
        value: &BTreeMap<u8, Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(value.len()))?;
        for (day, price) in value {
            map.serialize_entry(&day.to_string(), &Amount(*price))?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<u8, Decimal>, D::Error> {
        let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(raw
            .into_iter()
            .filter_map(|(day, price)| {
                let day = day.trim().parse::<u8>().ok().filter(|d| *d <= 6)?;
                Some((day, decimal_from_json(&price)?))
            })
            .collect())
    }
}

/// Specific-date prices keyed by `yyyy-MM-dd`
pub mod date_prices {
    use super::*;
    use serde::ser::SerializeMap;

    pub fn serialize<S: Serializer>(
        value: &BTreeMap<String, Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(value.len()))?;
        for (date, price) in value {
            map.serialize_entry(date, &Amount(*price))?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Decimal>, D::Error> {
        let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(raw
            .into_iter()
            .filter_map(|(date, price)| Some((date, decimal_from_json(&price)?)))
            .collect())
    }
}

struct Amount(Decimal);

impl serde::Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_decimal(&self.0, serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decimal_from_json() {
        assert_eq!(decimal_from_json(&json!(5)), Some(Decimal::new(5, 0)));
        assert_eq!(decimal_from_json(&json!(0.1)), Some(Decimal::new(1, 1)));
        assert_eq!(decimal_from_json(&json!(" 12.50 ")), Some(Decimal::new(1250, 2)));
        assert_eq!(decimal_from_json(&json!("free")), None);
        assert_eq!(decimal_from_json(&json!(true)), None);
        assert_eq!(decimal_from_json(&json!(null)), None);
    }
}
