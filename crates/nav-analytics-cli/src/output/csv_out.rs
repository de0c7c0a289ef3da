use serde_json::{Map, Value};
use std::io;

use super::{cell, snapshot_trailing};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        eprintln!("CSV output error: {}", e);
    }
}

/// Snapshot envelopes become `window,portfolio[,benchmark]`; arrays keep
/// their row shape; plain objects become `field,value` pairs.
fn write_csv<W: io::Write>(sink: W, value: &Value) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(sink);

    match value {
        Value::Object(_) if snapshot_trailing(value, "portfolio").is_some() => {
            let portfolio = snapshot_trailing(value, "portfolio").into_iter().flatten();
            let benchmark = snapshot_trailing(value, "benchmark");
            let mut header = vec!["window", "portfolio"];
            if benchmark.is_some() {
                header.push("benchmark");
            }
            wtr.write_record(header)?;
            for (window, val) in portfolio {
                let mut row = vec![window.clone(), cell(val, "")];
                if let Some(bench) = benchmark {
                    row.push(bench.get(window).map(|v| cell(v, "")).unwrap_or_default());
                }
                wtr.write_record(row)?;
            }
        }
        Value::Object(map) => write_pairs(&mut wtr, map)?,
        Value::Array(rows) => write_rows(&mut wtr, rows)?,
        other => wtr.write_record([cell(other, "")])?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_pairs<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) -> Result<(), csv::Error> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.clone(), cell(val, "")])?;
    }
    Ok(())
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> Result<(), csv::Error> {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            wtr.write_record([cell(item, "")])?;
        }
        return Ok(());
    };

    let headers: Vec<&String> = first.keys().collect();
    wtr.write_record(&headers)?;
    for row in rows.iter().filter_map(Value::as_object) {
        wtr.write_record(
            headers
                .iter()
                .map(|h| row.get(h.as_str()).map(|v| cell(v, "")).unwrap_or_default()),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, value).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_equity_rows() {
        let value = json!([
            {"date": "2023-01-01", "equity": 100.0, "drawdown": 0.0},
            {"date": "2023-01-02", "equity": 95.0, "drawdown": -0.05}
        ]);
        assert_eq!(
            render(&value),
            "date,equity,drawdown\n2023-01-01,100.0,0.0\n2023-01-02,95.0,-0.05\n"
        );
    }

    #[test]
    fn test_snapshot_trailing_rows() {
        let value = json!({
            "result": {
                "portfolio": {"trailing": {"YTD": 0.1, "1D": null}},
                "benchmark": {"trailing": {"YTD": 0.2, "1D": 0.01}}
            }
        });
        assert_eq!(
            render(&value),
            "window,portfolio,benchmark\nYTD,0.1,0.2\n1D,,0.01\n"
        );
    }

    #[test]
    fn test_panel_pairs_blank_nulls() {
        let value = json!({"DD": null, "asOf": "2023-03-31"});
        assert_eq!(render(&value), "field,value\nDD,\nasOf,2023-03-31\n");
    }
}
