use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::{Date, Month, Weekday};

pub(crate) const DAYS_IN_WEEK: usize = 7;

pub(crate) trait WeekdayExt {
    /// Column of the weekday in a Sunday-first week
    fn index0(&self) -> usize;
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> usize {
        self.number_days_from_sunday().into()
    }
}

/// A calendar month of a specific year.
///
/// Year and month are stored together as the first day of the month so that
/// stepping across a year boundary changes both at once, and so that every
/// value names a month the calendar can actually represent.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct YearMonth(Date);

impl YearMonth {
    pub(crate) fn new(year: i32, month: Month) -> Result<YearMonth, OutOfTimeError> {
        Date::from_calendar_date(year, month, 1)
            .map(YearMonth)
            .map_err(|_| OutOfTimeError)
    }

    /// Construct from a year and a month numbered 0 (January) through 11
    /// (December)
    pub(crate) fn from_zero_based(year: i32, month0: u8) -> Result<YearMonth, MonthParseError> {
        let month = month0
            .checked_add(1)
            .and_then(|m| Month::try_from(m).ok())
            .ok_or(MonthParseError::Month)?;
        YearMonth::new(year, month).map_err(|_| MonthParseError::Year)
    }

    pub(crate) fn containing(date: Date) -> YearMonth {
        YearMonth(date.replace_day(1).unwrap_or(date))
    }

    pub(crate) fn year(self) -> i32 {
        self.0.year()
    }

    pub(crate) fn month(self) -> Month {
        self.0.month()
    }

    /// 1-based month number, as used in attendance keys and API queries
    pub(crate) fn number(self) -> u8 {
        self.0.month().into()
    }

    pub(crate) fn days(self) -> u8 {
        (29..=31)
            .rev()
            .find(|&day| self.0.replace_day(day).is_ok())
            .unwrap_or(28)
    }

    pub(crate) fn first_weekday(self) -> Weekday {
        self.0.weekday()
    }

    /// Returns the date of the given day of this month, or `None` if the
    /// month has no such day
    pub(crate) fn date(self, day: u8) -> Option<Date> {
        self.0.replace_day(day).ok()
    }

    pub(crate) fn contains(self, date: Date) -> bool {
        YearMonth::containing(date) == self
    }

    pub(crate) fn next(self) -> Result<YearMonth, OutOfTimeError> {
        let year = if self.month() == Month::December {
            self.year().checked_add(1).ok_or(OutOfTimeError)?
        } else {
            self.year()
        };
        YearMonth::new(year, self.month().next())
    }

    pub(crate) fn previous(self) -> Result<YearMonth, OutOfTimeError> {
        let year = if self.month() == Month::January {
            self.year().checked_sub(1).ok_or(OutOfTimeError)?
        } else {
            self.year()
        };
        YearMonth::new(year, self.month().previous())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month(), self.year())
    }
}

impl FromStr for YearMonth {
    type Err = MonthParseError;

    /// Parses `YYYY-MM`
    fn from_str(s: &str) -> Result<YearMonth, MonthParseError> {
        let (year, month) = s.split_once('-').ok_or(MonthParseError::Syntax)?;
        let year = year.parse::<i32>().map_err(|_| MonthParseError::Syntax)?;
        let month = month.parse::<u8>().map_err(|_| MonthParseError::Syntax)?;
        YearMonth::from_zero_based(year, month.checked_sub(1).ok_or(MonthParseError::Month)?)
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub(crate) struct OutOfTimeError;

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
pub(crate) enum MonthParseError {
    #[error("expected a month in YYYY-MM format")]
    Syntax,
    #[error("month is out of range")]
    Month,
    #[error("year is out of range")]
    Year,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn ym(year: i32, month: Month) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_next_across_year() {
        let dec = ym(2025, Month::December);
        assert_eq!(dec.next(), Ok(ym(2026, Month::January)));
    }

    #[test]
    fn test_previous_across_year() {
        let jan = ym(2025, Month::January);
        assert_eq!(jan.previous(), Ok(ym(2024, Month::December)));
    }

    #[test]
    fn test_next_within_year() {
        let jul = ym(2025, Month::July);
        assert_eq!(jul.next(), Ok(ym(2025, Month::August)));
        assert_eq!(jul.previous(), Ok(ym(2025, Month::June)));
    }

    #[test]
    fn test_round_trip_over_many_months() {
        let start = ym(2023, Month::March);
        let mut m = start;
        for _ in 0..40 {
            m = m.next().unwrap();
        }
        assert_eq!(m, ym(2026, Month::July));
        for _ in 0..40 {
            m = m.previous().unwrap();
        }
        assert_eq!(m, start);
    }

    #[test]
    fn test_end_of_time() {
        let last = YearMonth::containing(Date::MAX);
        assert_eq!(last.next(), Err(OutOfTimeError));
        let first = YearMonth::containing(Date::MIN);
        assert_eq!(first.previous(), Err(OutOfTimeError));
    }

    #[test]
    fn test_days() {
        assert_eq!(ym(2025, Month::July).days(), 31);
        assert_eq!(ym(2025, Month::April).days(), 30);
        assert_eq!(ym(2025, Month::February).days(), 28);
        assert_eq!(ym(2024, Month::February).days(), 29);
        assert_eq!(ym(1900, Month::February).days(), 28);
        assert_eq!(ym(2000, Month::February).days(), 29);
    }

    #[test]
    fn test_first_weekday() {
        assert_eq!(ym(2025, Month::July).first_weekday(), Weekday::Tuesday);
        assert_eq!(ym(2025, Month::July).first_weekday().index0(), 2);
        assert_eq!(ym(2025, Month::June).first_weekday().index0(), 0);
        assert_eq!(ym(2025, Month::February).first_weekday().index0(), 6);
    }

    #[test]
    fn test_from_zero_based() {
        assert_eq!(YearMonth::from_zero_based(2025, 6), Ok(ym(2025, Month::July)));
        assert_eq!(YearMonth::from_zero_based(2025, 0), Ok(ym(2025, Month::January)));
        assert_eq!(YearMonth::from_zero_based(2025, 11), Ok(ym(2025, Month::December)));
        assert_eq!(YearMonth::from_zero_based(2025, 12), Err(MonthParseError::Month));
        assert_eq!(YearMonth::from_zero_based(i32::MAX, 0), Err(MonthParseError::Year));
        assert_eq!(YearMonth::from_zero_based(i32::MIN, 11), Err(MonthParseError::Year));
    }

    #[test]
    fn test_containing() {
        let m = YearMonth::containing(date!(2025 - 07 - 19));
        assert_eq!(m, ym(2025, Month::July));
        assert!(m.contains(date!(2025 - 07 - 01)));
        assert!(!m.contains(date!(2025 - 08 - 01)));
        assert_eq!(m.date(31), Some(date!(2025 - 07 - 31)));
        assert_eq!(m.date(32), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("2025-07".parse::<YearMonth>(), Ok(ym(2025, Month::July)));
        assert_eq!("2025-7".parse::<YearMonth>(), Ok(ym(2025, Month::July)));
        assert_eq!("2025-13".parse::<YearMonth>(), Err(MonthParseError::Month));
        assert_eq!("2025".parse::<YearMonth>(), Err(MonthParseError::Syntax));
        assert_eq!("July 2025".parse::<YearMonth>(), Err(MonthParseError::Syntax));
    }

    #[test]
    fn test_display() {
        assert_eq!(ym(2026, Month::January).to_string(), "January 2026");
    }
}
