pub mod calendar;
pub mod panel;

pub use calendar::{days_before, months_before_clamped, start_of_year};
pub use panel::{compute_trailing, TrailingPanel, TrailingWindow};
