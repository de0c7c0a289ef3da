use napi::Result as NapiResult;
use napi_derive::napi;
use serde::{Deserialize, Serialize};

use nav_analytics_core::dashboard::{self, NavAnalyticsInput};
use nav_analytics_core::series::{normalize, normalize_with_report, SkippedRecord};
use nav_analytics_core::NormalizedSeries;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Single-series request shared by the per-view functions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesRequest {
    #[serde(alias = "navSeries")]
    series: Vec<serde_json::Value>,
    #[serde(default)]
    reference_date: Option<String>,
}

#[derive(Serialize)]
struct NormalizeResponse {
    series: NormalizedSeries,
    skipped: Vec<SkippedRecord>,
}

/// Accepts either a bare record array or `{ "series": [...], ... }`.
fn parse_request(input_json: &str) -> NapiResult<SeriesRequest> {
    let value: serde_json::Value = serde_json::from_str(input_json).map_err(to_napi_error)?;
    match value {
        serde_json::Value::Array(series) => Ok(SeriesRequest {
            series,
            reference_date: None,
        }),
        other => serde_json::from_value(other).map_err(to_napi_error),
    }
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

#[napi]
pub fn normalize_series(input_json: String) -> NapiResult<String> {
    let request = parse_request(&input_json)?;
    let (series, skipped) = normalize_with_report(&request.series);
    serde_json::to_string(&NormalizeResponse { series, skipped }).map_err(to_napi_error)
}

#[napi]
pub fn equity_and_drawdown(input_json: String) -> NapiResult<String> {
    let request = parse_request(&input_json)?;
    let output = nav_analytics_core::equity::compute_equity_and_drawdown(&normalize(
        &request.series,
    ))
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Returns
// ---------------------------------------------------------------------------

#[napi]
pub fn monthly_returns(input_json: String) -> NapiResult<String> {
    let request = parse_request(&input_json)?;
    let output = nav_analytics_core::monthly::compute_monthly_returns(&normalize(&request.series))
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn trailing_returns(input_json: String) -> NapiResult<String> {
    let request = parse_request(&input_json)?;
    let reference =
        dashboard::parse_option_date("referenceDate", request.reference_date.as_deref())
            .map_err(to_napi_error)?;
    let output =
        nav_analytics_core::trailing::compute_trailing(&normalize(&request.series), reference)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[napi]
pub fn analyse_nav(input_json: String) -> NapiResult<String> {
    let input: NavAnalyticsInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = dashboard::analyse_nav(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
