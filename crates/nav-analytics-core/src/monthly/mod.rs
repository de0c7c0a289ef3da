pub mod returns;

pub use returns::{
    compute_monthly_returns, month_end_snapshots, MonthEndSnapshot, MonthLabel, MonthlyReturn,
    MonthlyReturns,
};
