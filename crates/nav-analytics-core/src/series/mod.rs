pub mod dates;
pub mod normalize;

pub use dates::{excel_serial_to_date, parse_date_str, parse_date_value};
pub use normalize::{normalize, normalize_with_report, SkipReason, SkippedRecord};
