use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use nav_analytics_core::dashboard::{self, AnalysisOptions, NavAnalyticsInput};
use nav_analytics_core::equity::compute_equity_and_drawdown;
use nav_analytics_core::monthly::{compute_monthly_returns, MonthLabel, MonthlyReturns};
use nav_analytics_core::series::normalize_with_report;
use nav_analytics_core::trailing::{compute_trailing, TrailingPanel};
use nav_analytics_core::NormalizedSeries;

use crate::input;

/// Series source and window options shared by every NAV command
#[derive(Args, Debug, Clone, Default)]
pub struct SeriesArgs {
    /// Path to a JSON or CSV file with NAV records
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON or CSV file with benchmark records (`analyse` only)
    #[arg(long)]
    pub benchmark: Option<String>,

    /// Anchor date for trailing figures (defaults to the last NAV date)
    #[arg(long)]
    pub reference_date: Option<String>,

    /// Inclusive start of the equity / drawdown view
    #[arg(long)]
    pub from: Option<String>,

    /// Inclusive end of the equity / drawdown view
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
struct EquityRow {
    date: String,
    equity: Decimal,
    drawdown: Decimal,
    drawdown_pct: Decimal,
}

/// Build the snapshot input from a file, stdin, and flag overrides.
///
/// A JSON array is the portfolio series; a JSON object is read as a full
/// snapshot input (`series`/`navSeries`, `benchmark`/`benchmarkSeries`, ...).
fn load_input(args: &SeriesArgs) -> Result<NavAnalyticsInput, Box<dyn std::error::Error>> {
    let data = if let Some(ref path) = args.input {
        input::file::read_series_file(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json|file.csv> or stdin required".into());
    };

    let mut nav_input = match data {
        Value::Array(records) => NavAnalyticsInput {
            series: records,
            ..Default::default()
        },
        obj @ Value::Object(_) => serde_json::from_value(obj)?,
        _ => return Err("Expected a JSON array of records or an object with a 'series' array".into()),
    };

    if let Some(ref path) = args.benchmark {
        let bench = match input::file::read_series_file(path)? {
            Value::Array(records) => records,
            Value::Object(mut obj) => match obj.remove("series").or_else(|| obj.remove("navSeries")) {
                Some(Value::Array(records)) => records,
                _ => return Err(format!("'{path}' has no 'series' array").into()),
            },
            _ => return Err(format!("'{path}' is not a series file").into()),
        };
        nav_input.benchmark = Some(bench);
    }
    if args.reference_date.is_some() {
        nav_input.reference_date = args.reference_date.clone();
    }
    if args.from.is_some() {
        nav_input.from_date = args.from.clone();
    }
    if args.to.is_some() {
        nav_input.to_date = args.to.clone();
    }
    Ok(nav_input)
}

/// Input for the single-series views (`equity`, `monthly`, `trailing`).
fn load_single_series(
    args: &SeriesArgs,
    command: &str,
) -> Result<NavAnalyticsInput, Box<dyn std::error::Error>> {
    if args.benchmark.is_some() {
        return Err(format!("--benchmark is only supported by `navx analyse`, not `navx {command}`").into());
    }
    let nav_input = load_input(args)?;
    if nav_input.benchmark.is_some() {
        warn!(command, "benchmark records in the input are ignored outside `analyse`");
    }
    Ok(nav_input)
}

/// Normalize the portfolio records, logging how many were dropped.
fn portfolio_series(nav_input: &NavAnalyticsInput) -> NormalizedSeries {
    let (series, skipped) = normalize_with_report(&nav_input.series);
    if !skipped.is_empty() {
        warn!(
            skipped = skipped.len(),
            total = nav_input.series.len(),
            "records without a usable date or NAV were skipped"
        );
    }
    series
}

pub fn run_analyse(args: SeriesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let nav_input = load_input(&args)?;
    let result = dashboard::analyse_nav(&nav_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_equity(args: SeriesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let nav_input = load_single_series(&args, "equity")?;
    let options = AnalysisOptions::from_input(&nav_input)?;
    let series = portfolio_series(&nav_input);
    let view = series.between(options.from_date, options.to_date);

    let curves = compute_equity_and_drawdown(&view)?;
    let rows: Vec<EquityRow> = curves
        .chart_points()
        .into_iter()
        .zip(&curves.equity)
        .zip(&curves.drawdown)
        .map(|((chart, eq), dd)| EquityRow {
            date: chart.date.to_string(),
            equity: eq.index,
            drawdown: dd.drawdown,
            drawdown_pct: chart.drawdown_pct,
        })
        .collect();
    Ok(serde_json::to_value(rows)?)
}

pub fn run_monthly(args: SeriesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let nav_input = load_single_series(&args, "monthly")?;
    let series = portfolio_series(&nav_input);
    let monthly = compute_monthly_returns(&series)?;
    Ok(Value::Array(monthly_table(&monthly)))
}

/// One row per year, newest first, with a column per month.
fn monthly_table(monthly: &MonthlyReturns) -> Vec<Value> {
    monthly
        .years_descending()
        .into_iter()
        .map(|year| {
            let mut row = Map::new();
            row.insert("year".into(), Value::from(year));
            for month in MonthLabel::ALL {
                let cell = monthly
                    .get(year, month)
                    .and_then(|r| serde_json::to_value(r).ok())
                    .unwrap_or(Value::Null);
                row.insert(month.abbrev().into(), cell);
            }
            Value::Object(row)
        })
        .collect()
}

pub fn run_trailing(args: SeriesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let nav_input = load_single_series(&args, "trailing")?;
    let options = AnalysisOptions::from_input(&nav_input)?;
    let series = portfolio_series(&nav_input);
    let panel = compute_trailing(&series, options.reference_date)?;
    Ok(Value::Object(trailing_fields(&panel)))
}

/// Panel figures in display order, then the as-of date.
fn trailing_fields(panel: &TrailingPanel) -> Map<String, Value> {
    let mut fields = Map::new();
    for (window, value) in panel.rows() {
        let cell = value
            .and_then(|r| serde_json::to_value(r).ok())
            .unwrap_or(Value::Null);
        fields.insert(window.label().into(), cell);
    }
    let as_of = panel
        .as_of
        .map(|d| Value::String(d.to_string()))
        .unwrap_or(Value::Null);
    fields.insert("asOf".into(), as_of);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_analytics_core::series::normalize;
    use serde_json::json;

    fn sample() -> Vec<Value> {
        vec![
            json!({"date": "2020-01-31", "nav": 100}),
            json!({"date": "2020-02-29", "nav": 110}),
            json!({"date": "2020-03-31", "nav": 99}),
        ]
    }

    #[test]
    fn test_monthly_table_rows() {
        let monthly = compute_monthly_returns(&normalize(&sample())).unwrap();
        let rows = monthly_table(&monthly);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["year"], json!(2020));
        assert_eq!(rows[0]["Jan"], Value::Null);
        assert_eq!(rows[0]["Feb"], json!(0.1));
        let keys: Vec<&String> = rows[0].as_object().unwrap().keys().collect();
        assert_eq!(keys[1].as_str(), "Jan");
        assert_eq!(keys[12].as_str(), "Dec");
    }

    #[test]
    fn test_trailing_fields_order() {
        let panel = compute_trailing(&normalize(&sample()), None).unwrap();
        let fields = trailing_fields(&panel);
        let keys: Vec<&String> = fields.keys().collect();
        assert_eq!(keys.first().map(|k| k.as_str()), Some("YTD"));
        assert_eq!(keys.last().map(|k| k.as_str()), Some("asOf"));
        assert_eq!(fields["asOf"], json!("2020-03-31"));
        assert_eq!(fields["MAXDD"], json!(-0.1));
    }

    #[test]
    fn test_flags_override_file_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nav.json");
        std::fs::write(
            &path,
            json!({"series": sample(), "referenceDate": "2020-02-29"}).to_string(),
        )
        .unwrap();
        let args = SeriesArgs {
            input: Some(path.to_string_lossy().into_owned()),
            reference_date: Some("2020-03-31".into()),
            ..Default::default()
        };
        let nav_input = load_input(&args).unwrap();
        assert_eq!(nav_input.series.len(), 3);
        assert_eq!(nav_input.reference_date.as_deref(), Some("2020-03-31"));
    }

    #[test]
    fn test_benchmark_flag_rejected_outside_analyse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nav.json");
        std::fs::write(&path, Value::Array(sample()).to_string()).unwrap();
        let path = path.to_string_lossy().into_owned();
        let args = SeriesArgs {
            input: Some(path.clone()),
            benchmark: Some(path),
            ..Default::default()
        };

        for run in [run_equity, run_monthly, run_trailing] {
            let err = run(args.clone()).unwrap_err();
            assert!(err.to_string().contains("--benchmark"), "{err}");
        }
        assert!(run_analyse(args).is_ok());
    }

    #[test]
    fn test_skipped_records_still_produce_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nav.json");
        let mut records = sample();
        records.push(json!({"date": "not a date", "nav": 1}));
        std::fs::write(&path, Value::Array(records).to_string()).unwrap();
        let args = SeriesArgs {
            input: Some(path.to_string_lossy().into_owned()),
            ..Default::default()
        };
        let rows = run_equity(args).unwrap();
        assert_eq!(rows.as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_equity_rows_respect_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nav.json");
        std::fs::write(&path, Value::Array(sample()).to_string()).unwrap();
        let args = SeriesArgs {
            input: Some(path.to_string_lossy().into_owned()),
            to: Some("2020-02-29".into()),
            ..Default::default()
        };
        let rows = run_equity(args).unwrap();
        assert_eq!(rows.as_array().map(Vec::len), Some(2));
        assert_eq!(rows[1]["equity"], json!(110.0));
    }
}
