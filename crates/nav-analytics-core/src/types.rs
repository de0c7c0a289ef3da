use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Net asset values. Wraps Decimal to prevent accidental f64 usage.
pub type Nav = Decimal;

/// Returns expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Fractional digits kept for equity, drawdown and return figures at the output boundary
pub const FIGURE_DP: u32 = 6;

/// Equity index value of the first observation
pub const EQUITY_BASE: Decimal = Decimal::ONE_HUNDRED;

/// Round half away from zero to `dp` fractional digits. A result of zero is
/// always positive zero.
pub fn round_to(value: Decimal, dp: u32) -> Decimal {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

/// Round a figure to the fixed output precision.
pub fn round_figure(value: Decimal) -> Decimal {
    round_to(value, FIGURE_DP)
}

/// One observed NAV on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: Nav,
}

impl TimePoint {
    pub fn new(date: NaiveDate, value: Nav) -> Self {
        Self { date, value }
    }
}

/// A strictly ascending NAV series with at most one point per date.
///
/// Built only through [`NormalizedSeries::from_points`] (or the normalizer in
/// [`crate::series`]), which sorts by date and keeps the last point in input
/// order when several share a date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TimePoint>", into = "Vec<TimePoint>")]
pub struct NormalizedSeries {
    points: Vec<TimePoint>,
}

impl NormalizedSeries {
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = TimePoint>,
    {
        let mut sorted: Vec<TimePoint> = points.into_iter().collect();
        // Stable: same-date points stay in input order, so the last one wins below
        sorted.sort_by_key(|p| p.date);

        let mut points: Vec<TimePoint> = Vec::with_capacity(sorted.len());
        for point in sorted {
            match points.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => points.push(point),
            }
        }
        Self { points }
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TimePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TimePoint> {
        self.points.last()
    }

    /// Position of the most recent observation dated on or before `date`.
    pub fn index_on_or_before(&self, date: NaiveDate) -> Option<usize> {
        match self.points.partition_point(|p| p.date <= date) {
            0 => None,
            n => Some(n - 1),
        }
    }

    /// Most recent observation dated on or before `date`, or `None` when the
    /// whole series lies after it.
    pub fn value_on_or_before(&self, date: NaiveDate) -> Option<&TimePoint> {
        self.index_on_or_before(date).map(|i| &self.points[i])
    }

    /// Sub-series inside the inclusive window `[from, to]`; an open bound
    /// leaves that side unrestricted.
    pub fn between(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> NormalizedSeries {
        let points = self
            .points
            .iter()
            .filter(|p| from.map_or(true, |f| p.date >= f))
            .filter(|p| to.map_or(true, |t| p.date <= t))
            .copied()
            .collect();
        Self { points }
    }
}

impl From<Vec<TimePoint>> for NormalizedSeries {
    fn from(points: Vec<TimePoint>) -> Self {
        Self::from_points(points)
    }
}

impl From<NormalizedSeries> for Vec<TimePoint> {
    fn from(series: NormalizedSeries) -> Self {
        series.points
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
