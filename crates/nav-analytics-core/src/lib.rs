pub mod equity;
pub mod error;
pub mod returns;
pub mod series;
pub mod types;

#[cfg(feature = "monthly")]
pub mod monthly;

#[cfg(feature = "trailing")]
pub mod trailing;

#[cfg(feature = "dashboard")]
pub mod dashboard;

pub use error::NavAnalyticsError;
pub use types::*;

/// Standard result type for all NAV analytics operations
pub type NavResult<T> = Result<T, NavAnalyticsError>;
