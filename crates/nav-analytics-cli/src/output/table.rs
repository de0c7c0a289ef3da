use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, snapshot_trailing};

/// Render a result as terminal tables.
///
/// Snapshot envelopes get a trailing panel (portfolio against benchmark when
/// present) and the portfolio's monthly grid; arrays become row tables.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) if map.contains_key("result") => print_snapshot(value, map),
        Value::Object(map) => println!("{}", field_table(map)),
        Value::Array(rows) => println!("{}", row_table(rows)),
        other => println!("{}", cell(other, "-")),
    }
}

fn print_snapshot(value: &Value, envelope: &Map<String, Value>) {
    if let Some(portfolio) = snapshot_trailing(value, "portfolio") {
        let benchmark = snapshot_trailing(value, "benchmark");
        println!("{}", trailing_table(portfolio, benchmark));
    }

    let grid = value
        .pointer("/result/portfolio/monthly/by_year")
        .and_then(Value::as_object);
    if let Some(by_year) = grid {
        if !by_year.is_empty() {
            println!("\nMonthly returns:");
            println!("{}", monthly_table(by_year));
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn trailing_table(portfolio: &Map<String, Value>, benchmark: Option<&Map<String, Value>>) -> Table {
    let mut builder = Builder::default();
    let mut header = vec!["Window", "Portfolio"];
    if benchmark.is_some() {
        header.push("Benchmark");
    }
    builder.push_record(header);

    for (window, val) in portfolio {
        let mut row = vec![window.clone(), cell(val, "-")];
        if let Some(bench) = benchmark {
            row.push(bench.get(window).map(|v| cell(v, "-")).unwrap_or_default());
        }
        builder.push_record(row);
    }
    builder.build()
}

/// Year rows newest first, one column per month present in the data.
fn monthly_table(by_year: &Map<String, Value>) -> Table {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    let mut builder = Builder::default();
    let mut header = vec!["Year"];
    header.extend(MONTHS);
    builder.push_record(header);

    let mut years: Vec<(&String, &Value)> = by_year.iter().collect();
    years.sort_by(|a, b| b.0.cmp(a.0));
    for (year, months) in years {
        let mut row = vec![year.clone()];
        row.extend(MONTHS.iter().map(|m| {
            months
                .get(*m)
                .map(|v| cell(v, ""))
                .unwrap_or_default()
        }));
        builder.push_record(row);
    }
    builder.build()
}

fn field_table(map: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), cell(val, "-")]);
    }
    builder.build()
}

fn row_table(rows: &[Value]) -> String {
    let Some(Value::Object(first)) = rows.first() else {
        return if rows.is_empty() {
            "(no observations)".to_string()
        } else {
            rows.iter().map(|v| cell(v, "-")).collect::<Vec<_>>().join("\n")
        };
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in rows.iter().filter_map(Value::as_object) {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h).map(|v| cell(v, "-")).unwrap_or_default()),
        );
    }
    builder.build().to_string()
}
