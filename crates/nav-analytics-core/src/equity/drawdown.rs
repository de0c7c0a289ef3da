use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::returns::{overflow, period_return};
use crate::types::*;
use crate::NavResult;

const CHART_EQUITY_DP: u32 = 4;
const CHART_DRAWDOWN_PCT_DP: u32 = 2;

/// Equity index re-based to 100 at the first observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub index: Decimal,
}

/// Decline of the equity index from its running peak (always <= 0)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawdownPoint {
    pub date: NaiveDate,
    pub drawdown: Rate,
}

/// Per-date view for plotting: equity to 4 dp, drawdown as a percentage to 2 dp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub equity: Decimal,
    pub drawdown_pct: Decimal,
}

/// Output of the equity / drawdown engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityDrawdown {
    pub equity: Vec<EquityPoint>,
    pub drawdown: Vec<DrawdownPoint>,
}

impl EquityDrawdown {
    pub fn chart_points(&self) -> Vec<ChartPoint> {
        self.equity
            .iter()
            .zip(&self.drawdown)
            .map(|(e, dd)| ChartPoint {
                date: e.date,
                equity: round_to(e.index, CHART_EQUITY_DP),
                drawdown_pct: round_to(dd.drawdown * Decimal::ONE_HUNDRED, CHART_DRAWDOWN_PCT_DP),
            })
            .collect()
    }

    /// Most negative drawdown over the whole series.
    pub fn max_drawdown(&self) -> Option<Rate> {
        self.drawdown.iter().map(|p| p.drawdown).min()
    }
}

/// Full-precision equity and drawdown for one observation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EquityStep {
    pub date: NaiveDate,
    pub equity: Decimal,
    pub drawdown: Rate,
}

/// Chain period returns into an equity index and track the drawdown from
/// the inclusive running peak, without rounding.
pub(crate) fn equity_steps(series: &NormalizedSeries) -> NavResult<Vec<EquityStep>> {
    let points = series.points();
    let mut steps = Vec::with_capacity(points.len());
    let Some(first) = points.first() else {
        return Ok(steps);
    };

    let mut equity = EQUITY_BASE;
    let mut peak = EQUITY_BASE;
    steps.push(EquityStep {
        date: first.date,
        equity,
        drawdown: Decimal::ZERO,
    });

    for pair in points.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let r = period_return(prev.value, cur.value)?;
        equity = equity
            .checked_mul(Decimal::ONE + r)
            .ok_or_else(|| overflow(format!("equity index on {}", cur.date)))?;
        if equity > peak {
            peak = equity;
        }
        // peak never drops below the base of 100, so the division is safe
        let drawdown = if equity == peak {
            Decimal::ZERO
        } else {
            equity / peak - Decimal::ONE
        };
        steps.push(EquityStep {
            date: cur.date,
            equity,
            drawdown,
        });
    }

    Ok(steps)
}

/// Convert a NAV series into an equity index starting at 100 and a running
/// drawdown series. Empty input yields empty output.
///
/// `r[i] = nav[i] / nav[i-1] - 1` (0 when the previous NAV is zero) and
/// `equity[i] = equity[i-1] * (1 + r[i])`. Both outputs are rounded to 6 dp.
pub fn compute_equity_and_drawdown(series: &NormalizedSeries) -> NavResult<EquityDrawdown> {
    let steps = equity_steps(series)?;
    let equity = steps
        .iter()
        .map(|s| EquityPoint {
            date: s.date,
            index: round_figure(s.equity),
        })
        .collect();
    let drawdown = steps
        .iter()
        .map(|s| DrawdownPoint {
            date: s.date,
            drawdown: round_figure(s.drawdown),
        })
        .collect();
    Ok(EquityDrawdown { equity, drawdown })
}
