use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::info;

use crate::equity::{compute_equity_and_drawdown, ChartPoint, DrawdownPoint, EquityPoint};
use crate::error::NavAnalyticsError;
use crate::monthly::{compute_monthly_returns, MonthlyReturns};
use crate::series::{normalize_with_report, parse_date_str, SkippedRecord};
use crate::trailing::{compute_trailing, TrailingPanel};
use crate::types::*;
use crate::NavResult;

const METHODOLOGY: &str = "Chained NAV returns re-based to 100; drawdown vs running peak; \
                           month-end = last observation in month; trailing windows resolve \
                           to the last NAV on or before each boundary";

/// Raw input for a dashboard snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavAnalyticsInput {
    /// Raw `{date, nav}`-like records
    #[serde(alias = "navSeries")]
    pub series: Vec<Value>,
    /// Optional benchmark records, analysed independently
    #[serde(default, alias = "benchmarkSeries", skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<Vec<Value>>,
    /// Trailing-panel anchor; defaults to the last portfolio date
    #[serde(default, alias = "referenceDate", skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<String>,
    /// Inclusive start of the equity / drawdown view
    #[serde(default, alias = "fromDate", skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    /// Inclusive end of the equity / drawdown view
    #[serde(default, alias = "toDate", skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
}

/// Resolved options for one snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub reference_date: Option<NaiveDate>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl AnalysisOptions {
    pub fn from_input(input: &NavAnalyticsInput) -> NavResult<Self> {
        let options = Self {
            reference_date: parse_option_date("reference_date", input.reference_date.as_deref())?,
            from_date: parse_option_date("from_date", input.from_date.as_deref())?,
            to_date: parse_option_date("to_date", input.to_date.as_deref())?,
        };
        if let (Some(from), Some(to)) = (options.from_date, options.to_date) {
            if from > to {
                return Err(NavAnalyticsError::InvalidInput {
                    field: "from_date".into(),
                    reason: format!("{from} is after to_date {to}"),
                });
            }
        }
        Ok(options)
    }
}

/// Resolve an optional date string with the same rules as series dates.
pub fn parse_option_date(field: &str, raw: Option<&str>) -> NavResult<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_date_str(s)
            .map(Some)
            .ok_or_else(|| NavAnalyticsError::InvalidInput {
                field: field.into(),
                reason: format!("'{s}' is not a recognisable date"),
            }),
    }
}

/// Everything the dashboard renders for one series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesAnalytics {
    pub series: NormalizedSeries,
    pub equity: Vec<EquityPoint>,
    pub drawdown: Vec<DrawdownPoint>,
    pub chart: Vec<ChartPoint>,
    pub monthly: MonthlyReturns,
    pub trailing: TrailingPanel,
    pub skipped: Vec<SkippedRecord>,
}

/// Immutable snapshot of a portfolio (and optional benchmark)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavAnalytics {
    pub portfolio: SeriesAnalytics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<SeriesAnalytics>,
}

#[derive(Debug, Serialize)]
struct SnapshotAssumptions {
    records: usize,
    benchmark_records: Option<usize>,
    #[serde(flatten)]
    options: AnalysisOptions,
}

/// Analyse one normalized series. The from/to window narrows the equity,
/// drawdown and chart view; monthly and trailing figures use the full
/// history so since-inception stays anchored on the first observation.
pub fn analyse_series(
    series: NormalizedSeries,
    skipped: Vec<SkippedRecord>,
    options: &AnalysisOptions,
) -> NavResult<SeriesAnalytics> {
    let view = series.between(options.from_date, options.to_date);
    let curves = compute_equity_and_drawdown(&view)?;
    let chart = curves.chart_points();
    let monthly = compute_monthly_returns(&series)?;
    let trailing = compute_trailing(&series, options.reference_date)?;

    Ok(SeriesAnalytics {
        series,
        equity: curves.equity,
        drawdown: curves.drawdown,
        chart,
        monthly,
        trailing,
        skipped,
    })
}

fn series_warnings(name: &str, total: usize, analytics: &SeriesAnalytics) -> Vec<String> {
    let mut warnings = Vec::new();
    if !analytics.skipped.is_empty() {
        warnings.push(format!(
            "{name}: {} of {total} records skipped",
            analytics.skipped.len()
        ));
    }
    if analytics.series.is_empty() {
        warnings.push(format!("{name}: no usable observations"));
    }
    warnings
}

/// Build a full dashboard snapshot from raw records: normalize, then compute
/// equity/drawdown, chart points, monthly returns and the trailing panel for
/// the portfolio and, independently, the benchmark.
///
/// The benchmark's trailing panel is anchored on the portfolio's as-of date
/// so both panels compare the same windows.
pub fn analyse_nav(input: &NavAnalyticsInput) -> NavResult<ComputationOutput<NavAnalytics>> {
    let start = Instant::now();
    let options = AnalysisOptions::from_input(input)?;
    let mut warnings: Vec<String> = Vec::new();

    let (series, skipped) = normalize_with_report(&input.series);
    let portfolio = analyse_series(series, skipped, &options)?;
    warnings.extend(series_warnings("portfolio", input.series.len(), &portfolio));

    let benchmark = match &input.benchmark {
        Some(records) => {
            let bench_options = AnalysisOptions {
                reference_date: options.reference_date.or(portfolio.trailing.as_of),
                ..options
            };
            let (series, skipped) = normalize_with_report(records);
            let analytics = analyse_series(series, skipped, &bench_options)?;
            warnings.extend(series_warnings("benchmark", records.len(), &analytics));
            Some(analytics)
        }
        None => None,
    };

    info!(
        observations = portfolio.series.len(),
        skipped = portfolio.skipped.len(),
        benchmark = benchmark.is_some(),
        as_of = ?portfolio.trailing.as_of,
        "NAV snapshot computed"
    );

    let assumptions = SnapshotAssumptions {
        records: input.series.len(),
        benchmark_records: input.benchmark.as_ref().map(Vec::len),
        options,
    };
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        METHODOLOGY,
        &assumptions,
        warnings,
        elapsed,
        NavAnalytics {
            portfolio,
            benchmark,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_records() -> Vec<Value> {
        vec![
            json!({"date": "2020-01-31", "nav": 100}),
            json!({"date": "2020-02-29", "nav": 110}),
            json!({"date": "2020-03-31", "nav": 99}),
        ]
    }

    #[test]
    fn test_snapshot_basic() {
        let input = NavAnalyticsInput {
            series: sample_records(),
            ..Default::default()
        };
        let out = analyse_nav(&input).unwrap();
        let p = &out.result.portfolio;
        assert_eq!(p.equity.len(), 3);
        assert_eq!(p.trailing.as_of, Some(d(2020, 3, 31)));
        assert_eq!(p.trailing.max_drawdown, Some(dec!(-0.1)));
        assert!(out.warnings.is_empty());
        assert!(out.result.benchmark.is_none());
    }

    #[test]
    fn test_skipped_records_warn() {
        let mut records = sample_records();
        records.push(json!({"date": "??", "nav": 1}));
        let input = NavAnalyticsInput {
            series: records,
            ..Default::default()
        };
        let out = analyse_nav(&input).unwrap();
        assert_eq!(out.warnings, vec!["portfolio: 1 of 4 records skipped".to_string()]);
    }

    #[test]
    fn test_empty_series_warns_not_errors() {
        let out = analyse_nav(&NavAnalyticsInput::default()).unwrap();
        assert_eq!(out.warnings, vec!["portfolio: no usable observations".to_string()]);
        assert_eq!(out.result.portfolio.trailing, TrailingPanel::default());
    }

    #[test]
    fn test_invalid_reference_date_is_error() {
        let input = NavAnalyticsInput {
            series: sample_records(),
            reference_date: Some("someday".into()),
            ..Default::default()
        };
        match analyse_nav(&input) {
            Err(NavAnalyticsError::InvalidInput { field, .. }) => assert_eq!(field, "reference_date"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_inverted_window_is_error() {
        let input = NavAnalyticsInput {
            series: sample_records(),
            from_date: Some("2020-03-01".into()),
            to_date: Some("2020-02-01".into()),
            ..Default::default()
        };
        assert!(analyse_nav(&input).is_err());
    }

    #[test]
    fn test_window_narrows_curves_only() {
        let input = NavAnalyticsInput {
            series: sample_records(),
            from_date: Some("2020-02-01".into()),
            ..Default::default()
        };
        let out = analyse_nav(&input).unwrap();
        let p = &out.result.portfolio;
        assert_eq!(p.equity.len(), 2);
        assert_eq!(p.equity[0].index, dec!(100));
        assert_eq!(p.equity[1].index, dec!(90));
        assert_eq!(p.trailing.since_inception, Some(dec!(-0.01)));
    }

    #[test]
    fn test_benchmark_anchored_on_portfolio_as_of() {
        let input = NavAnalyticsInput {
            series: sample_records(),
            benchmark: Some(vec![
                json!({"date": "2020-01-31", "close": 50}),
                json!({"date": "2020-03-31", "close": 55}),
                json!({"date": "2020-04-30", "close": 60}),
            ]),
            ..Default::default()
        };
        let out = analyse_nav(&input).unwrap();
        let bench = out.result.benchmark.unwrap();
        assert_eq!(bench.trailing.as_of, Some(d(2020, 3, 31)));
        assert_eq!(bench.trailing.since_inception, Some(dec!(0.1)));
    }

    #[test]
    fn test_input_accepts_camel_case_aliases() {
        let input: NavAnalyticsInput = serde_json::from_value(json!({
            "navSeries": [{"date": "2020-01-31", "nav": 100}],
            "referenceDate": "2020-01-31"
        }))
        .unwrap();
        assert_eq!(input.series.len(), 1);
        assert_eq!(input.reference_date.as_deref(), Some("2020-01-31"));
    }

    #[test]
    fn test_assumptions_do_not_echo_series() {
        let input = NavAnalyticsInput {
            series: sample_records(),
            ..Default::default()
        };
        let out = analyse_nav(&input).unwrap();
        assert_eq!(out.assumptions["records"], json!(3));
        assert!(out.assumptions.get("series").is_none());
    }
}
