// src/frame/year_fractions.rs
//! Date to Year Fraction Conversion
//!
//! Maps an ordered list of calendar dates onto offsets (in years) from the
//! first date:
//! ```text
//! τ_i = (d_i - d_0).days / day_count
//! ```
//! The first offset is always exactly `0.0`. No ordering is enforced: dates
//! earlier than `d_0` simply produce negative offsets.

use crate::error::{validation::*, SdeError, SdeResult};
use chrono::NaiveDate;

/// Days per year used when no convention is given (ACT/365 fixed).
pub const DEFAULT_DAY_COUNT: f64 = 365.0;

/// Year fractions relative to the first date using ACT/365.
pub fn get_year_deltas(dates: &[NaiveDate]) -> SdeResult<Vec<f64>> {
    get_year_deltas_with_day_count(dates, DEFAULT_DAY_COUNT)
}

/// Year fractions relative to the first date for an arbitrary day count.
///
/// # Errors
/// - `InvalidInput` if `dates` is empty
/// - `InvalidParameters` if `day_count` is not a positive finite number
pub fn get_year_deltas_with_day_count(dates: &[NaiveDate], day_count: f64) -> SdeResult<Vec<f64>> {
    validate_positive("day_count", day_count)?;
    validate_finite("day_count", day_count)?;

    let start = dates
        .first()
        .ok_or_else(|| SdeError::invalid_input("year fractions", "date sequence is empty"))?;

    Ok(dates
        .iter()
        .map(|date| (*date - *start).num_days() as f64 / day_count)
        .collect())
}

/// Year fraction between two consecutive grid dates.
pub(crate) fn year_fraction_between(from: NaiveDate, to: NaiveDate, day_count: f64) -> f64 {
    (to - from).num_days() as f64 / day_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_offset_is_zero() {
        let deltas = get_year_deltas(&[ymd(2020, 1, 1), ymd(2020, 7, 1), ymd(2021, 1, 1)]).unwrap();
        assert_eq!(deltas[0], 0.0);
        assert_abs_diff_eq!(deltas[1], 182.0 / 365.0, epsilon = 1e-15);
        assert_abs_diff_eq!(deltas[2], 366.0 / 365.0, epsilon = 1e-15);
    }

    #[test]
    fn test_strictly_increasing_dates_give_increasing_offsets() {
        let dates: Vec<NaiveDate> = (1..=12).map(|m| ymd(2024, m, 15)).collect();
        let deltas = get_year_deltas(&dates).unwrap();
        assert!(deltas.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_custom_day_count() {
        let deltas =
            get_year_deltas_with_day_count(&[ymd(2023, 1, 1), ymd(2023, 1, 31)], 360.0).unwrap();
        assert_eq!(deltas[1], 30.0 / 360.0);
    }

    #[test]
    fn test_out_of_order_dates_are_negative() {
        let deltas = get_year_deltas(&[ymd(2023, 6, 1), ymd(2023, 1, 1)]).unwrap();
        assert!(deltas[1] < 0.0);
    }

    #[test]
    fn test_empty_sequence_fails() {
        let err = get_year_deltas(&[]).unwrap_err();
        assert!(matches!(err, SdeError::InvalidInput { .. }));
    }

    #[test]
    fn test_non_positive_day_count_fails() {
        assert!(get_year_deltas_with_day_count(&[ymd(2023, 1, 1)], 0.0).is_err());
    }
}
