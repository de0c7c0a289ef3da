use rust_decimal::Decimal;

use crate::error::NavAnalyticsError;
use crate::types::{Nav, Rate};
use crate::NavResult;

/// Simple return `to / from - 1`.
///
/// `Ok(None)` when `from` is zero; callers pick the sentinel (0 for period
/// returns, `None` for trailing windows).
pub fn simple_return(from: Nav, to: Nav) -> NavResult<Option<Rate>> {
    if from.is_zero() {
        return Ok(None);
    }
    let ratio = to
        .checked_div(from)
        .ok_or_else(|| overflow(format!("return {to} / {from}")))?;
    let r = ratio
        .checked_sub(Decimal::ONE)
        .ok_or_else(|| overflow(format!("return {to} / {from}")))?;
    Ok(Some(r))
}

/// Period return with the zero-base sentinel applied.
pub fn period_return(from: Nav, to: Nav) -> NavResult<Rate> {
    Ok(simple_return(from, to)?.unwrap_or(Decimal::ZERO))
}

pub(crate) fn overflow(context: String) -> NavAnalyticsError {
    NavAnalyticsError::ArithmeticOverflow { context }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_simple_return() {
        assert_eq!(simple_return(dec!(100), dec!(110)).unwrap(), Some(dec!(0.1)));
        assert_eq!(simple_return(dec!(110), dec!(99)).unwrap(), Some(dec!(-0.1)));
    }

    #[test]
    fn test_zero_base() {
        assert_eq!(simple_return(Decimal::ZERO, dec!(5)).unwrap(), None);
        assert_eq!(period_return(Decimal::ZERO, dec!(5)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_overflow_reported() {
        let err = simple_return(dec!(0.0000000000000000000000000001), Decimal::MAX);
        assert!(err.is_err());
    }
}
