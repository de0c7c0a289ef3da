use serde_json::Value;

use super::{cell, snapshot_trailing};

/// Headline figures, most informative first.
const HEADLINE_KEYS: [&str; 5] = ["SI", "YTD", "1Y", "MAXDD", "DD"];

/// Print the single headline figure of a result.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

/// Snapshot envelopes and trailing panels yield the first non-null headline
/// figure; equity and monthly arrays yield their latest row.
fn headline(value: &Value) -> String {
    let panel = snapshot_trailing(value, "portfolio").or_else(|| value.as_object());
    if let Some(map) = panel {
        for key in HEADLINE_KEYS {
            match map.get(key) {
                Some(val) if !val.is_null() => return format!("{}: {}", key, cell(val, "null")),
                _ => {}
            }
        }
    }

    match value {
        Value::Array(rows) => match rows.iter().max_by_key(|&r| row_key(r)) {
            Some(Value::Object(row)) => row
                .iter()
                .map(|(k, v)| format!("{}={}", k, cell(v, "-")))
                .collect::<Vec<_>>()
                .join(" "),
            Some(other) => cell(other, "null"),
            None => "(empty)".to_string(),
        },
        other => cell(other, "null"),
    }
}

/// Latest row by date, or by year for the monthly grid (which is newest first).
fn row_key(row: &Value) -> (&str, i64) {
    (
        row.get("date").and_then(Value::as_str).unwrap_or_default(),
        row.get("year").and_then(Value::as_i64).unwrap_or(i64::MIN),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_headline_from_envelope() {
        let value = json!({
            "result": {"portfolio": {"trailing": {"YTD": null, "SI": null, "1Y": 0.12}}},
            "warnings": []
        });
        assert_eq!(headline(&value), "1Y: 0.12");
    }

    #[test]
    fn test_headline_from_panel() {
        let value = json!({"YTD": 0.05, "SI": -0.1, "asOf": "2023-03-31"});
        assert_eq!(headline(&value), "SI: -0.1");
    }

    #[test]
    fn test_headline_latest_equity_row() {
        let value = json!([
            {"date": "2023-01-01", "equity": 100.0},
            {"date": "2023-01-02", "equity": 101.5}
        ]);
        assert_eq!(headline(&value), "date=2023-01-02 equity=101.5");
    }

    #[test]
    fn test_headline_empty_array() {
        assert_eq!(headline(&json!([])), "(empty)");
    }
}
