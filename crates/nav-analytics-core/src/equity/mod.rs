pub mod drawdown;

pub use drawdown::{
    compute_equity_and_drawdown, ChartPoint, DrawdownPoint, EquityDrawdown, EquityPoint,
};
