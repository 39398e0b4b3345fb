//! DuckDB value to JSON conversion.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta};
use duckdb::types::{TimeUnit, Value};
use serde_json::{json, Value as JsonValue};

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Converts a DuckDB value into its JSON representation.
pub fn to_json(value: Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(b),
        Value::TinyInt(i) => json!(i),
        Value::SmallInt(i) => json!(i),
        Value::Int(i) => json!(i),
        Value::BigInt(i) => json!(i),
        Value::HugeInt(i) => match i64::try_from(i) {
            Ok(small) => json!(small),
            Err(_) => JsonValue::String(i.to_string()),
        },
        Value::UTinyInt(i) => json!(i),
        Value::USmallInt(i) => json!(i),
        Value::UInt(i) => json!(i),
        Value::UBigInt(i) => json!(i),
        // NaN and infinities have no JSON form and become null.
        Value::Float(f) => JsonValue::from(f),
        Value::Double(f) => JsonValue::from(f),
        Value::Decimal(d) => JsonValue::String(d.to_string()),
        Value::Text(s) => JsonValue::String(s),
        Value::Enum(s) => JsonValue::String(s),
        Value::Blob(bytes) => JsonValue::String(BASE64.encode(bytes)),
        Value::Date32(days) => date_json(days),
        Value::Timestamp(unit, v) => timestamp_json(to_micros(unit, v)),
        Value::Time64(unit, v) => time_json(to_micros(unit, v)),
        Value::Interval {
            months,
            days,
            nanos,
        } => json!({ "months": months, "days": days, "micros": nanos / 1_000 }),
        Value::List(items) | Value::Array(items) => {
            JsonValue::Array(items.into_iter().map(to_json).collect())
        }
        Value::Struct(fields) => JsonValue::Object(
            fields
                .iter()
                .map(|(name, v)| (name.clone(), to_json(v.clone())))
                .collect(),
        ),
        Value::Map(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(k, v)| (map_key(k.clone()), to_json(v.clone())))
                .collect(),
        ),
        Value::Union(inner) => to_json(*inner),
        other => JsonValue::String(format!("{other:?}")),
    }
}

/// JSON object keys must be strings; non-text MAP keys use their JSON text.
fn map_key(key: Value) -> String {
    match to_json(key) {
        JsonValue::String(s) => s,
        other => other.to_string(),
    }
}

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(MICROS_PER_SECOND),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

fn date_json(days: i32) -> JsonValue {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|epoch| epoch.checked_add_signed(TimeDelta::days(i64::from(days))))
        .map(|date| JsonValue::String(date.format("%Y-%m-%d").to_string()))
        .unwrap_or_else(|| json!(days))
}

fn timestamp_json(micros: i64) -> JsonValue {
    DateTime::from_timestamp_micros(micros)
        .map(|dt| JsonValue::String(dt.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
        .unwrap_or_else(|| json!(micros))
}

const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

fn time_json(micros: i64) -> JsonValue {
    // DuckDB accepts 24:00:00, which NaiveTime cannot hold.
    if micros == MICROS_PER_DAY {
        return JsonValue::String("24:00:00".to_string());
    }
    let secs = micros.div_euclid(MICROS_PER_SECOND);
    let nanos = micros.rem_euclid(MICROS_PER_SECOND) * 1_000;
    u32::try_from(secs)
        .ok()
        .and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos as u32))
        .map(|t| JsonValue::String(t.format("%H:%M:%S%.f").to_string()))
        .unwrap_or_else(|| json!(micros))
}

#[cfg(test)]
mod tests {
    use super::*;
    use duckdb::types::OrderedMap;

    #[test]
    fn test_scalars() {
        assert_eq!(to_json(Value::Null), JsonValue::Null);
        assert_eq!(to_json(Value::Int(42)), json!(42));
        assert_eq!(to_json(Value::UBigInt(u64::MAX)), json!(u64::MAX));
        assert_eq!(to_json(Value::Text("duck".into())), json!("duck"));
        assert_eq!(to_json(Value::Double(f64::NAN)), JsonValue::Null);
    }

    #[test]
    fn test_hugeint_out_of_range_is_string() {
        let big = i128::from(i64::MAX) + 1;
        assert_eq!(to_json(Value::HugeInt(big)), json!(big.to_string()));
        assert_eq!(to_json(Value::HugeInt(7)), json!(7));
    }

    #[test]
    fn test_temporal_values() {
        assert_eq!(to_json(Value::Date32(19_723)), json!("2024-01-01"));
        assert_eq!(
            to_json(Value::Timestamp(TimeUnit::Second, 1_704_067_200)),
            json!("2024-01-01T00:00:00")
        );
        assert_eq!(
            to_json(Value::Time64(TimeUnit::Microsecond, 3_723_500_000)),
            json!("01:02:03.500")
        );
    }

    #[test]
    fn test_end_of_day_time() {
        assert_eq!(
            to_json(Value::Time64(TimeUnit::Microsecond, 86_400_000_000)),
            json!("24:00:00")
        );
    }

    #[test]
    fn test_blob_is_base64() {
        assert_eq!(to_json(Value::Blob(b"duck".to_vec())), json!("ZHVjaw=="));
    }

    #[test]
    fn test_list_is_recursive() {
        let list = Value::List(vec![Value::Int(1), Value::Null]);
        assert_eq!(to_json(list), json!([1, null]));
    }

    #[test]
    fn test_struct_and_map_are_objects() {
        let point = Value::Struct(OrderedMap::from(vec![
            ("x".to_string(), Value::Int(1)),
            ("tags".to_string(), Value::List(vec![Value::Text("a".into())])),
        ]));
        assert_eq!(to_json(point), json!({"x": 1, "tags": ["a"]}));

        let scores = Value::Map(OrderedMap::from(vec![
            (Value::Text("duck".into()), Value::Int(3)),
            (Value::Int(7), Value::Null),
        ]));
        assert_eq!(to_json(scores), json!({"duck": 3, "7": null}));
    }
}
