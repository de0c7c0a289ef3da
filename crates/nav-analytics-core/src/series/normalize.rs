use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::debug;

use super::dates::parse_date_value;
use crate::types::{NormalizedSeries, TimePoint};

/// Date keys, highest priority first. After these, the first key (in record
/// order) containing "date".
const DATE_KEYS: [&str; 3] = ["date", "Date", "dt"];
const DATE_HINT: &str = "date";

/// Value keys, highest priority first. After these, the first key (in record
/// order) containing a hint.
const VALUE_KEYS: [&str; 4] = ["nav", "Nav", "value", "close"];
const VALUE_HINTS: [&str; 4] = ["nav", "close", "value", "price"];

/// Why a raw record was left out of the normalized series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotAnObject,
    MissingDate,
    UnparseableDate,
    MissingValue,
    InvalidValue,
}

/// A raw record the normalizer dropped, by position in the input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: SkipReason,
}

/// Normalize raw records into a strictly ascending series, dropping
/// records whose date or value cannot be resolved.
pub fn normalize(records: &[Value]) -> NormalizedSeries {
    normalize_with_report(records).0
}

/// As [`normalize`], also reporting every dropped record.
pub fn normalize_with_report(records: &[Value]) -> (NormalizedSeries, Vec<SkippedRecord>) {
    let mut points = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();

    for (index, record) in records.iter().enumerate() {
        match resolve_record(record) {
            Ok(point) => points.push(point),
            Err(reason) => {
                debug!(index, ?reason, "skipping raw NAV record");
                skipped.push(SkippedRecord { index, reason });
            }
        }
    }

    (NormalizedSeries::from_points(points), skipped)
}

/// Resolve one loosely typed record into a [`TimePoint`].
pub fn resolve_record(record: &Value) -> Result<TimePoint, SkipReason> {
    let fields = record.as_object().ok_or(SkipReason::NotAnObject)?;

    let (date_key, date_field) = resolve_date_field(fields).ok_or(SkipReason::MissingDate)?;
    let date = parse_date_value(date_field).ok_or(SkipReason::UnparseableDate)?;

    let value_field = resolve_value_field(fields, date_key).ok_or(SkipReason::MissingValue)?;
    let value = parse_nav(value_field).ok_or(SkipReason::InvalidValue)?;

    Ok(TimePoint { date, value })
}

fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|v| !v.is_null())
}

fn resolve_date_field(fields: &Map<String, Value>) -> Option<(&str, &Value)> {
    DATE_KEYS
        .iter()
        .find_map(|k| present(fields, k).map(|v| (*k, v)))
        .or_else(|| {
            fields
                .iter()
                .filter(|(_, v)| !v.is_null())
                .find(|(k, _)| k.to_lowercase().contains(DATE_HINT))
                .map(|(k, v)| (k.as_str(), v))
        })
}

fn resolve_value_field<'a>(fields: &'a Map<String, Value>, date_key: &str) -> Option<&'a Value> {
    VALUE_KEYS
        .iter()
        .filter(|k| **k != date_key)
        .find_map(|k| present(fields, k))
        .or_else(|| {
            fields
                .iter()
                .filter(|(k, v)| k.as_str() != date_key && !v.is_null())
                .find(|(k, _)| {
                    let lower = k.to_lowercase();
                    VALUE_HINTS.iter().any(|h| lower.contains(h))
                })
                .map(|(_, v)| v)
        })
}

/// Numbers and numeric strings (plain or scientific) become NAVs; anything
/// outside the decimal range is rejected.
pub fn parse_nav(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal_str(&n.to_string()),
        Value::String(s) => parse_decimal_str(s.trim()),
        _ => None,
    }
}

fn parse_decimal_str(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}
