use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::calendar::{days_before, months_before_clamped, start_of_year};
use crate::equity::drawdown::equity_steps;
use crate::returns::simple_return;
use crate::types::*;
use crate::NavResult;

/// A figure of the trailing panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrailingWindow {
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "3Y")]
    ThreeYears,
    #[serde(rename = "SI")]
    SinceInception,
    #[serde(rename = "DD")]
    Drawdown,
    #[serde(rename = "MAXDD")]
    MaxDrawdown,
}

/// How a window picks its starting point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookback {
    Days(u64),
    Months(u32),
    YearToDate,
    Inception,
}

impl TrailingWindow {
    /// Display order of the trailing returns table.
    pub const ALL: [TrailingWindow; 11] = [
        TrailingWindow::YearToDate,
        TrailingWindow::OneDay,
        TrailingWindow::OneWeek,
        TrailingWindow::OneMonth,
        TrailingWindow::ThreeMonths,
        TrailingWindow::SixMonths,
        TrailingWindow::OneYear,
        TrailingWindow::ThreeYears,
        TrailingWindow::SinceInception,
        TrailingWindow::Drawdown,
        TrailingWindow::MaxDrawdown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TrailingWindow::YearToDate => "YTD",
            TrailingWindow::OneDay => "1D",
            TrailingWindow::OneWeek => "1W",
            TrailingWindow::OneMonth => "1M",
            TrailingWindow::ThreeMonths => "3M",
            TrailingWindow::SixMonths => "6M",
            TrailingWindow::OneYear => "1Y",
            TrailingWindow::ThreeYears => "3Y",
            TrailingWindow::SinceInception => "SI",
            TrailingWindow::Drawdown => "DD",
            TrailingWindow::MaxDrawdown => "MAXDD",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.label().eq_ignore_ascii_case(label))
    }

    /// `None` for the drawdown figures, which are not window returns.
    fn lookback(&self) -> Option<Lookback> {
        match self {
            TrailingWindow::OneDay => Some(Lookback::Days(1)),
            TrailingWindow::OneWeek => Some(Lookback::Days(7)),
            TrailingWindow::OneMonth => Some(Lookback::Months(1)),
            TrailingWindow::ThreeMonths => Some(Lookback::Months(3)),
            TrailingWindow::SixMonths => Some(Lookback::Months(6)),
            TrailingWindow::OneYear => Some(Lookback::Months(12)),
            TrailingWindow::ThreeYears => Some(Lookback::Months(36)),
            TrailingWindow::YearToDate => Some(Lookback::YearToDate),
            TrailingWindow::SinceInception => Some(Lookback::Inception),
            TrailingWindow::Drawdown | TrailingWindow::MaxDrawdown => None,
        }
    }
}

impl fmt::Display for TrailingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trailing returns, current drawdown and max drawdown as of one reference date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailingPanel {
    #[serde(rename = "1D")]
    pub one_day: Option<Rate>,
    #[serde(rename = "1W")]
    pub one_week: Option<Rate>,
    #[serde(rename = "1M")]
    pub one_month: Option<Rate>,
    #[serde(rename = "3M")]
    pub three_months: Option<Rate>,
    #[serde(rename = "6M")]
    pub six_months: Option<Rate>,
    #[serde(rename = "1Y")]
    pub one_year: Option<Rate>,
    #[serde(rename = "3Y")]
    pub three_years: Option<Rate>,
    #[serde(rename = "YTD")]
    pub ytd: Option<Rate>,
    #[serde(rename = "SI")]
    pub since_inception: Option<Rate>,
    #[serde(rename = "DD")]
    pub drawdown: Option<Rate>,
    #[serde(rename = "MAXDD")]
    pub max_drawdown: Option<Rate>,
    #[serde(rename = "asOf")]
    pub as_of: Option<NaiveDate>,
}

impl TrailingPanel {
    pub fn get(&self, window: TrailingWindow) -> Option<Rate> {
        match window {
            TrailingWindow::OneDay => self.one_day,
            TrailingWindow::OneWeek => self.one_week,
            TrailingWindow::OneMonth => self.one_month,
            TrailingWindow::ThreeMonths => self.three_months,
            TrailingWindow::SixMonths => self.six_months,
            TrailingWindow::OneYear => self.one_year,
            TrailingWindow::ThreeYears => self.three_years,
            TrailingWindow::YearToDate => self.ytd,
            TrailingWindow::SinceInception => self.since_inception,
            TrailingWindow::Drawdown => self.drawdown,
            TrailingWindow::MaxDrawdown => self.max_drawdown,
        }
    }

    fn slot_mut(&mut self, window: TrailingWindow) -> &mut Option<Rate> {
        match window {
            TrailingWindow::OneDay => &mut self.one_day,
            TrailingWindow::OneWeek => &mut self.one_week,
            TrailingWindow::OneMonth => &mut self.one_month,
            TrailingWindow::ThreeMonths => &mut self.three_months,
            TrailingWindow::SixMonths => &mut self.six_months,
            TrailingWindow::OneYear => &mut self.one_year,
            TrailingWindow::ThreeYears => &mut self.three_years,
            TrailingWindow::YearToDate => &mut self.ytd,
            TrailingWindow::SinceInception => &mut self.since_inception,
            TrailingWindow::Drawdown => &mut self.drawdown,
            TrailingWindow::MaxDrawdown => &mut self.max_drawdown,
        }
    }

    /// Figures in display order, labelled.
    pub fn rows(&self) -> Vec<(TrailingWindow, Option<Rate>)> {
        TrailingWindow::ALL.iter().map(|w| (*w, self.get(*w))).collect()
    }
}

fn window_start(
    lookback: Lookback,
    as_of: NaiveDate,
    series: &NormalizedSeries,
) -> NavResult<Option<NaiveDate>> {
    let start = match lookback {
        Lookback::Days(n) => Some(days_before(as_of, n)?),
        Lookback::Months(k) => Some(months_before_clamped(as_of, k)?),
        Lookback::YearToDate => Some(start_of_year(as_of)?),
        Lookback::Inception => series.first().map(|p| p.date),
    };
    Ok(start)
}

/// `nav(on or before to) / nav(on or before from) - 1`, `None` when either
/// end has no observation or the starting NAV is zero.
fn return_between(
    series: &NormalizedSeries,
    from: NaiveDate,
    to: NaiveDate,
) -> NavResult<Option<Rate>> {
    let (Some(start), Some(end)) = (series.value_on_or_before(from), series.value_on_or_before(to))
    else {
        return Ok(None);
    };
    Ok(simple_return(start.value, end.value)?.map(round_figure))
}

/// Compute the trailing panel relative to `reference` (default: the last
/// date in the series).
///
/// Month windows step back whole calendar months with the day clamped to 28;
/// 1D and 1W step back calendar days; YTD starts on January 1; SI starts at
/// the first observation. DD is the drawdown at the last observation on or
/// before the reference date and MAXDD the worst drawdown up to it.
pub fn compute_trailing(
    series: &NormalizedSeries,
    reference: Option<NaiveDate>,
) -> NavResult<TrailingPanel> {
    let Some(as_of) = reference.or_else(|| series.last().map(|p| p.date)) else {
        return Ok(TrailingPanel::default());
    };

    let mut panel = TrailingPanel {
        as_of: Some(as_of),
        ..TrailingPanel::default()
    };

    for window in TrailingWindow::ALL {
        let Some(lookback) = window.lookback() else {
            continue;
        };
        if let Some(from) = window_start(lookback, as_of, series)? {
            *panel.slot_mut(window) = return_between(series, from, as_of)?;
        }
    }

    if let Some(end) = series.index_on_or_before(as_of) {
        let steps = equity_steps(series)?;
        let history = &steps[..=end];
        panel.drawdown = history.last().map(|s| round_figure(s.drawdown));
        panel.max_drawdown = history.iter().map(|s| s.drawdown).min().map(round_figure);
    }

    Ok(panel)
}
