// src/simulation/time_grid.rs
//! Simulation Time Grid
//!
//! A grid is an ordered, duplicate-free list of dates that
//! - starts at the pricing (valuation) date,
//! - contains every frequency date inside `[pricing_date, final_date]`,
//! - contains the final date,
//! - contains every special date on or after the pricing date.
//!
//! Month, quarter and year frequencies are anchored on period ends
//! (e.g. `M` yields 2020-01-31, 2020-02-29, ...); daily and weekly
//! frequencies step from the pricing date.

use crate::error::{SdeError, SdeResult};
use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    MonthEnd,
    QuarterEnd,
    YearEnd,
}

impl Frequency {
    /// Length in months of an end-anchored frequency.
    fn months(self) -> Option<u32> {
        match self {
            Frequency::MonthEnd => Some(1),
            Frequency::QuarterEnd => Some(3),
            Frequency::YearEnd => Some(12),
            Frequency::Daily | Frequency::Weekly => None,
        }
    }
}

impl FromStr for Frequency {
    type Err = SdeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D" => Ok(Frequency::Daily),
            "W" => Ok(Frequency::Weekly),
            "M" | "ME" => Ok(Frequency::MonthEnd),
            "Q" | "QE" => Ok(Frequency::QuarterEnd),
            "A" | "Y" | "YE" => Ok(Frequency::YearEnd),
            other => Err(SdeError::invalid_input(
                "frequency",
                format!("unknown frequency code '{}'", other),
            )),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Frequency::Daily => "D",
            Frequency::Weekly => "W",
            Frequency::MonthEnd => "M",
            Frequency::QuarterEnd => "Q",
            Frequency::YearEnd => "A",
        };
        write!(f, "{}", code)
    }
}

/// Builder for simulation time grids.
///
/// ```
/// use chrono::NaiveDate;
/// use dx_sim::simulation::time_grid::{Frequency, TimeGridBuilder};
///
/// let grid = TimeGridBuilder::new(
///     NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
/// )
/// .frequency(Frequency::MonthEnd)
/// .build()
/// .unwrap();
///
/// assert_eq!(grid.len(), 13);
/// ```
#[derive(Debug, Clone)]
pub struct TimeGridBuilder {
    pricing_date: NaiveDate,
    final_date: NaiveDate,
    frequency: Frequency,
    special_dates: Vec<NaiveDate>,
}

impl TimeGridBuilder {
    pub fn new(pricing_date: NaiveDate, final_date: NaiveDate) -> Self {
        TimeGridBuilder {
            pricing_date,
            final_date,
            frequency: Frequency::MonthEnd,
            special_dates: Vec::new(),
        }
    }

    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn special_dates(mut self, dates: &[NaiveDate]) -> Self {
        self.special_dates.extend_from_slice(dates);
        self
    }

    /// # Errors
    /// - `InvalidInput` if the final date lies before the pricing date
    /// - `InvalidInput` if a calendar computation overflows
    pub fn build(&self) -> SdeResult<Vec<NaiveDate>> {
        if self.final_date < self.pricing_date {
            return Err(SdeError::invalid_input(
                "time grid",
                format!(
                    "final date {} precedes pricing date {}",
                    self.final_date, self.pricing_date
                ),
            ));
        }

        let mut grid = self.frequency_dates()?;
        if grid.first() != Some(&self.pricing_date) {
            grid.insert(0, self.pricing_date);
        }
        if grid.last() != Some(&self.final_date) {
            grid.push(self.final_date);
        }

        let dropped = self
            .special_dates
            .iter()
            .filter(|d| **d < self.pricing_date)
            .count();
        if dropped > 0 {
            tracing::debug!(dropped, "special dates before pricing date ignored");
        }
        grid.extend(
            self.special_dates
                .iter()
                .copied()
                .filter(|d| *d >= self.pricing_date),
        );
        grid.sort_unstable();
        grid.dedup();

        tracing::info!(
            points = grid.len(),
            frequency = %self.frequency,
            start = %self.pricing_date,
            end = %self.final_date,
            "built time grid"
        );
        Ok(grid)
    }

    fn frequency_dates(&self) -> SdeResult<Vec<NaiveDate>> {
        let mut dates = Vec::new();
        match self.frequency.months() {
            None => {
                let step = match self.frequency {
                    Frequency::Weekly => Days::new(7),
                    _ => Days::new(1),
                };
                let mut date = self.pricing_date;
                while date <= self.final_date {
                    dates.push(date);
                    date = date.checked_add_days(step).ok_or_else(overflow)?;
                }
            }
            Some(months) => {
                let start = self.pricing_date;
                let anchor = (start.month() + months - 1) / months * months;
                let mut period = NaiveDate::from_ymd_opt(start.year(), anchor, 1).ok_or_else(overflow)?;
                loop {
                    let end = month_end(period)?;
                    if end > self.final_date {
                        break;
                    }
                    dates.push(end);
                    period = period
                        .checked_add_months(Months::new(months))
                        .ok_or_else(overflow)?;
                }
            }
        }
        Ok(dates)
    }
}

/// Grid for `[pricing_date, final_date]` at `frequency`, merged with `special_dates`.
pub fn build_time_grid(
    pricing_date: NaiveDate,
    final_date: NaiveDate,
    frequency: Frequency,
    special_dates: &[NaiveDate],
) -> SdeResult<Vec<NaiveDate>> {
    TimeGridBuilder::new(pricing_date, final_date)
        .frequency(frequency)
        .special_dates(special_dates)
        .build()
}

fn month_end(first_of_month: NaiveDate) -> SdeResult<NaiveDate> {
    first_of_month
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(overflow)
}

fn overflow() -> SdeError {
    SdeError::invalid_input("time grid", "calendar arithmetic overflowed")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_end_grid() {
        let grid = build_time_grid(ymd(2020, 1, 1), ymd(2020, 12, 31), Frequency::MonthEnd, &[]).unwrap();
        assert_eq!(grid.len(), 13);
        assert_eq!(grid[0], ymd(2020, 1, 1));
        assert_eq!(grid[1], ymd(2020, 1, 31));
        assert_eq!(grid[2], ymd(2020, 2, 29));
        assert_eq!(*grid.last().unwrap(), ymd(2020, 12, 31));
    }

    #[test]
    fn test_final_date_appended_when_off_frequency() {
        let grid = build_time_grid(ymd(2020, 1, 15), ymd(2020, 3, 15), Frequency::MonthEnd, &[]).unwrap();
        assert_eq!(
            grid,
            vec![ymd(2020, 1, 15), ymd(2020, 1, 31), ymd(2020, 2, 29), ymd(2020, 3, 15)]
        );
    }

    #[test]
    fn test_quarter_and_year_end() {
        let grid = build_time_grid(ymd(2020, 2, 1), ymd(2021, 1, 1), Frequency::QuarterEnd, &[]).unwrap();
        assert_eq!(
            grid,
            vec![
                ymd(2020, 2, 1),
                ymd(2020, 3, 31),
                ymd(2020, 6, 30),
                ymd(2020, 9, 30),
                ymd(2020, 12, 31),
                ymd(2021, 1, 1)
            ]
        );

        let grid = build_time_grid(ymd(2020, 6, 1), ymd(2022, 12, 31), Frequency::YearEnd, &[]).unwrap();
        assert_eq!(
            grid,
            vec![ymd(2020, 6, 1), ymd(2020, 12, 31), ymd(2021, 12, 31), ymd(2022, 12, 31)]
        );
    }

    #[test]
    fn test_daily_and_weekly() {
        let grid = build_time_grid(ymd(2020, 1, 1), ymd(2020, 1, 5), Frequency::Daily, &[]).unwrap();
        assert_eq!(grid.len(), 5);

        let grid = build_time_grid(ymd(2020, 1, 1), ymd(2020, 1, 20), Frequency::Weekly, &[]).unwrap();
        assert_eq!(
            grid,
            vec![ymd(2020, 1, 1), ymd(2020, 1, 8), ymd(2020, 1, 15), ymd(2020, 1, 20)]
        );
    }

    #[test]
    fn test_special_dates_merged_sorted_unique() {
        let special = [ymd(2020, 2, 10), ymd(2020, 1, 31), ymd(2019, 12, 1), ymd(2020, 6, 1)];
        let grid = build_time_grid(ymd(2020, 1, 1), ymd(2020, 3, 31), Frequency::MonthEnd, &special).unwrap();

        assert_eq!(grid[0], ymd(2020, 1, 1));
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
        assert!(grid.contains(&ymd(2020, 2, 10)));
        assert!(!grid.contains(&ymd(2019, 12, 1)));
        assert_eq!(*grid.last().unwrap(), ymd(2020, 6, 1));
        assert_eq!(grid.iter().filter(|d| **d == ymd(2020, 1, 31)).count(), 1);
    }

    #[test]
    fn test_same_day_grid_has_single_point() {
        let grid = build_time_grid(ymd(2020, 1, 1), ymd(2020, 1, 1), Frequency::MonthEnd, &[]).unwrap();
        assert_eq!(grid, vec![ymd(2020, 1, 1)]);
    }

    #[test]
    fn test_final_before_pricing_fails() {
        assert!(build_time_grid(ymd(2020, 1, 1), ymd(2019, 1, 1), Frequency::Daily, &[]).is_err());
    }

    #[test]
    fn test_frequency_codes() {
        assert_eq!("m".parse::<Frequency>().unwrap(), Frequency::MonthEnd);
        assert_eq!("A".parse::<Frequency>().unwrap(), Frequency::YearEnd);
        assert_eq!(Frequency::QuarterEnd.to_string(), "Q");
        assert!("H".parse::<Frequency>().is_err());
    }
}
