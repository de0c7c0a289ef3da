use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::returns::period_return;
use crate::types::*;
use crate::NavResult;

/// Calendar month, serialized as its three-letter abbreviation and ordered
/// Jan..Dec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MonthLabel {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl MonthLabel {
    pub const ALL: [MonthLabel; 12] = [
        MonthLabel::Jan,
        MonthLabel::Feb,
        MonthLabel::Mar,
        MonthLabel::Apr,
        MonthLabel::May,
        MonthLabel::Jun,
        MonthLabel::Jul,
        MonthLabel::Aug,
        MonthLabel::Sep,
        MonthLabel::Oct,
        MonthLabel::Nov,
        MonthLabel::Dec,
    ];

    pub fn of(date: NaiveDate) -> Self {
        Self::ALL[date.month0() as usize]
    }

    pub fn abbrev(&self) -> &'static str {
        match self {
            MonthLabel::Jan => "Jan",
            MonthLabel::Feb => "Feb",
            MonthLabel::Mar => "Mar",
            MonthLabel::Apr => "Apr",
            MonthLabel::May => "May",
            MonthLabel::Jun => "Jun",
            MonthLabel::Jul => "Jul",
            MonthLabel::Aug => "Aug",
            MonthLabel::Sep => "Sep",
            MonthLabel::Oct => "Oct",
            MonthLabel::Nov => "Nov",
            MonthLabel::Dec => "Dec",
        }
    }
}

impl fmt::Display for MonthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// Last observation within a calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthEndSnapshot {
    pub date: NaiveDate,
    pub value: Nav,
}

/// Month-over-month return anchored on the month-end observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub date: NaiveDate,
    pub year: i32,
    pub month: MonthLabel,
    #[serde(rename = "return")]
    pub value: Rate,
}

/// Output of the monthly return aggregator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReturns {
    pub month_ends: Vec<MonthEndSnapshot>,
    pub returns: Vec<MonthlyReturn>,
    pub by_year: BTreeMap<i32, BTreeMap<MonthLabel, Rate>>,
}

impl MonthlyReturns {
    /// Years with at least one return, newest first.
    pub fn years_descending(&self) -> Vec<i32> {
        self.by_year.keys().rev().copied().collect()
    }

    pub fn get(&self, year: i32, month: MonthLabel) -> Option<Rate> {
        self.by_year.get(&year).and_then(|m| m.get(&month)).copied()
    }
}

/// Keep the latest observation of each (year, month) run. Relies on the
/// series being date-sorted, so a month closes as soon as the key changes.
pub fn month_end_snapshots(series: &NormalizedSeries) -> Vec<MonthEndSnapshot> {
    let mut month_ends: Vec<MonthEndSnapshot> = Vec::new();
    for p in series.points() {
        let snapshot = MonthEndSnapshot {
            date: p.date,
            value: p.value,
        };
        match month_ends.last_mut() {
            Some(last) if same_month(last.date, p.date) => *last = snapshot,
            _ => month_ends.push(snapshot),
        }
    }
    month_ends
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Bucket the series into month-end snapshots and compute month-over-month
/// returns, grouped by year and month label. The first month has no return.
pub fn compute_monthly_returns(series: &NormalizedSeries) -> NavResult<MonthlyReturns> {
    let month_ends = month_end_snapshots(series);

    let mut returns = Vec::with_capacity(month_ends.len().saturating_sub(1));
    for pair in month_ends.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        returns.push(MonthlyReturn {
            date: cur.date,
            year: cur.date.year(),
            month: MonthLabel::of(cur.date),
            value: round_figure(period_return(prev.value, cur.value)?),
        });
    }

    let mut by_year: BTreeMap<i32, BTreeMap<MonthLabel, Rate>> = BTreeMap::new();
    for r in &returns {
        by_year.entry(r.year).or_default().insert(r.month, r.value);
    }

    Ok(MonthlyReturns {
        month_ends,
        returns,
        by_year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(values: &[(NaiveDate, Decimal)]) -> NormalizedSeries {
        NormalizedSeries::from_points(values.iter().map(|(dt, v)| TimePoint::new(*dt, *v)))
    }

    #[test]
    fn test_empty_series() {
        let out = compute_monthly_returns(&NormalizedSeries::default()).unwrap();
        assert_eq!(out, MonthlyReturns::default());
    }

    #[test]
    fn test_single_month_has_no_return() {
        let s = series(&[(d(2022, 5, 2), dec!(10)), (d(2022, 5, 30), dec!(11))]);
        let out = compute_monthly_returns(&s).unwrap();
        assert_eq!(out.month_ends.len(), 1);
        assert_eq!(out.month_ends[0].value, dec!(11));
        assert!(out.returns.is_empty());
        assert!(out.by_year.is_empty());
    }

    #[test]
    fn test_last_observation_in_month_is_snapshot() {
        let s = series(&[
            (d(2022, 1, 10), dec!(100)),
            (d(2022, 1, 20), dec!(104)),
            (d(2022, 2, 3), dec!(90)),
            (d(2022, 2, 17), dec!(93.6)),
        ]);
        let out = compute_monthly_returns(&s).unwrap();
        assert_eq!(
            out.month_ends,
            vec![
                MonthEndSnapshot { date: d(2022, 1, 20), value: dec!(104) },
                MonthEndSnapshot { date: d(2022, 2, 17), value: dec!(93.6) },
            ]
        );
        assert_eq!(out.returns[0].value, dec!(-0.1));
        assert_eq!(out.returns[0].date, d(2022, 2, 17));
    }

    #[test]
    fn test_gap_months_compare_against_last_available() {
        let s = series(&[(d(2022, 1, 31), dec!(100)), (d(2022, 4, 29), dec!(105))]);
        let out = compute_monthly_returns(&s).unwrap();
        assert_eq!(out.get(2022, MonthLabel::Apr), Some(dec!(0.05)));
        assert_eq!(out.get(2022, MonthLabel::Feb), None);
    }

    #[test]
    fn test_grouping_across_years() {
        let s = series(&[
            (d(2021, 11, 30), dec!(100)),
            (d(2021, 12, 31), dec!(102)),
            (d(2022, 1, 31), dec!(99.96)),
        ]);
        let out = compute_monthly_returns(&s).unwrap();
        assert_eq!(out.years_descending(), vec![2022, 2021]);
        assert_eq!(out.get(2021, MonthLabel::Dec), Some(dec!(0.02)));
        assert_eq!(out.get(2022, MonthLabel::Jan), Some(dec!(-0.02)));
    }

    #[test]
    fn test_zero_previous_month_end_is_zero_return() {
        let s = series(&[(d(2022, 1, 31), dec!(0)), (d(2022, 2, 28), dec!(5))]);
        let out = compute_monthly_returns(&s).unwrap();
        assert_eq!(out.get(2022, MonthLabel::Feb), Some(Decimal::ZERO));
    }

    #[test]
    fn test_by_year_serializes_with_month_abbreviations() {
        let s = series(&[(d(2020, 1, 31), dec!(100)), (d(2020, 2, 29), dec!(110))]);
        let out = compute_monthly_returns(&s).unwrap();
        let json = serde_json::to_value(&out.by_year).unwrap();
        assert_eq!(json, serde_json::json!({"2020": {"Feb": 0.1}}));
    }

    #[test]
    fn test_month_label_order_and_display() {
        assert!(MonthLabel::Jan < MonthLabel::Dec);
        assert_eq!(MonthLabel::of(d(2020, 9, 1)).to_string(), "Sep");
    }
}
