//! Calendar attributes derived from a sales date.
//!
//! Weekday and month labels come from fixed Spanish lookup tables rather
//! than from any locale configuration, so the output is identical on every
//! machine.

use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SalesError};

/// Weekday labels, Monday first (ISO order).
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
    "Domingo",
];

/// Three-letter month abbreviations, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// Day zero of the spreadsheet serial-date system (1900 date system with the
/// Lotus leap-year bug already folded in).
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Largest serial a spreadsheet can hold: 9999-12-31.
pub const MAX_SERIAL: f64 = 2_958_465.0;

/// Label for `weekday`.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES[weekday.num_days_from_monday() as usize]
}

/// Label for a 1-based month number, or `None` outside 1–12.
pub fn month_name(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize).copied())
}

/// Grouping key `"YYYY-MM"`.
pub fn year_month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Format a date the way the dashboard displays it: `dd/mm/yyyy`.
pub fn format_day_first(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parses day-first textual dates and spreadsheet serial numbers.
pub struct DateParser;

impl DateParser {
    /// Day-first patterns, tried in order. Each may carry a trailing time of
    /// day which is discarded.
    const DAY_FIRST_FORMATS: &'static [&'static str] = &[
        "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y", "%d-%m-%y", "%d.%m.%y",
    ];

    /// ISO patterns are unambiguous and accepted regardless of convention.
    const ISO_FORMATS: &'static [&'static str] = &["%Y-%m-%d", "%Y/%m/%d"];

    /// Parse a textual date, preferring the day-first reading.
    ///
    /// `"03/04/2024"` is 3 April 2024. A trailing `HH:MM[:SS]` component or
    /// an ISO `T` separator is accepted and ignored.
    pub fn parse(s: &str) -> Result<NaiveDate> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SalesError::InvalidDate(s.to_string()));
        }

        let date_part = trimmed
            .split(|c: char| c == ' ' || c == 'T')
            .next()
            .unwrap_or(trimmed);

        // `%Y` accepts any number of digits, so pick the pattern family from
        // the width of the leading and trailing segments.
        let separators = ['/', '-', '.'];
        let first_len = date_part.split(separators).next().map(str::len);
        let last_len = date_part.rsplit(separators).next().map(str::len);

        let candidates: Vec<&str> = if first_len == Some(4) {
            Self::ISO_FORMATS.to_vec()
        } else {
            Self::DAY_FIRST_FORMATS
                .iter()
                .copied()
                .filter(|fmt| match last_len {
                    Some(4) => fmt.ends_with("%Y"),
                    Some(2) => fmt.ends_with("%y"),
                    _ => false,
                })
                .collect()
        };

        candidates
            .into_iter()
            .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
            .ok_or_else(|| SalesError::InvalidDate(s.to_string()))
    }

    /// Convert a spreadsheet serial date (days since 1899-12-30, fractional
    /// part = time of day) into a calendar date.
    pub fn from_serial(serial: f64) -> Result<NaiveDate> {
        if !serial.is_finite() || !(1.0..MAX_SERIAL + 1.0).contains(&serial) {
            return Err(SalesError::InvalidDate(serial.to_string()));
        }
        let (y, m, d) = SERIAL_EPOCH;
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|epoch| epoch.checked_add_days(chrono::Days::new(serial.trunc() as u64)))
            .ok_or_else(|| SalesError::InvalidDate(serial.to_string()))
    }
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// An inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(SalesError::Config(format!(
                "range start {} is after end {}",
                format_day_first(start),
                format_day_first(end)
            )));
        }
        Ok(Self { start, end })
    }

    /// Inclusive membership test.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The same day-of-year boundaries one year earlier.
    ///
    /// 29 February maps to 28 February.
    pub fn shifted_back_one_year(&self) -> Self {
        let shift = |d: NaiveDate| d.checked_sub_months(Months::new(12)).unwrap_or(d);
        Self {
            start: shift(self.start),
            end: shift(self.end),
        }
    }

    /// Both bounds moved by `months` (negative moves back). Month ends are
    /// clamped, so 31 January + 1 month is 29 February in a leap year.
    pub fn shifted_by_months(&self, months: i32) -> Self {
        let step = Months::new(months.unsigned_abs());
        let shift = |d: NaiveDate| {
            if months >= 0 {
                d.checked_add_months(step)
            } else {
                d.checked_sub_months(step)
            }
            .unwrap_or(d)
        };
        Self {
            start: shift(self.start),
            end: shift(self.end),
        }
    }

    /// Intersect with `bounds`, returning `None` when they do not overlap.
    pub fn clamp_to(&self, bounds: &DateRange) -> Option<Self> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        (start <= end).then_some(Self { start, end })
    }

    /// `"dd/mm/yyyy - dd/mm/yyyy"`.
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            format_day_first(self.start),
            format_day_first(self.end)
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── Lookup tables ─────────────────────────────────────────────────────────

    #[test]
    fn test_weekday_names_all_seven() {
        // 2024-01-01 is a Monday.
        let expected = [
            (ymd(2024, 1, 1), "Lunes"),
            (ymd(2024, 1, 2), "Martes"),
            (ymd(2024, 1, 3), "Miércoles"),
            (ymd(2024, 1, 4), "Jueves"),
            (ymd(2024, 1, 5), "Viernes"),
            (ymd(2024, 1, 6), "Sábado"),
            (ymd(2024, 1, 7), "Domingo"),
        ];
        for (date, name) in expected {
            assert_eq!(weekday_name(date.weekday()), name, "{date}");
        }
    }

    #[test]
    fn test_month_names_all_twelve() {
        let expected = [
            "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
        ];
        for (i, name) in expected.iter().enumerate() {
            assert_eq!(month_name(i as u32 + 1), Some(*name));
        }
    }

    #[test]
    fn test_month_name_out_of_range() {
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn test_year_month_key_zero_padded() {
        assert_eq!(year_month_key(ymd(2024, 3, 15)), "2024-03");
        assert_eq!(year_month_key(ymd(2023, 12, 1)), "2023-12");
    }

    // ── DateParser ────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_day_first_slash() {
        assert_eq!(DateParser::parse("03/04/2024").unwrap(), ymd(2024, 4, 3));
    }

    #[test]
    fn test_parse_day_first_dash_and_dot() {
        assert_eq!(DateParser::parse("15-03-2024").unwrap(), ymd(2024, 3, 15));
        assert_eq!(DateParser::parse("15.03.2024").unwrap(), ymd(2024, 3, 15));
    }

    #[test]
    fn test_parse_two_digit_year() {
        assert_eq!(DateParser::parse("15/03/24").unwrap(), ymd(2024, 3, 15));
    }

    #[test]
    fn test_parse_iso() {
        assert_eq!(DateParser::parse("2024-03-15").unwrap(), ymd(2024, 3, 15));
    }

    #[test]
    fn test_parse_discards_time_of_day() {
        assert_eq!(
            DateParser::parse("15/03/2024 18:45:00").unwrap(),
            ymd(2024, 3, 15)
        );
        assert_eq!(
            DateParser::parse("2024-03-15T08:00:00").unwrap(),
            ymd(2024, 3, 15)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(DateParser::parse("").is_err());
        assert!(DateParser::parse("mañana").is_err());
        assert!(DateParser::parse("32/01/2024").is_err());
    }

    #[test]
    fn test_from_serial() {
        // 45366 is 2024-03-15 in the 1900 date system.
        assert_eq!(DateParser::from_serial(45366.0).unwrap(), ymd(2024, 3, 15));
        // Time of day is dropped.
        assert_eq!(DateParser::from_serial(45366.75).unwrap(), ymd(2024, 3, 15));
    }

    #[test]
    fn test_from_serial_rejects_invalid() {
        assert!(DateParser::from_serial(f64::NAN).is_err());
        assert!(DateParser::from_serial(-3.0).is_err());
        // 20240315 read as days is far past 9999-12-31.
        assert!(DateParser::from_serial(20_240_315.0).is_err());
        assert_eq!(DateParser::from_serial(MAX_SERIAL).unwrap(), ymd(9999, 12, 31));
    }

    // ── DateRange ─────────────────────────────────────────────────────────────

    #[test]
    fn test_range_contains_is_inclusive() {
        let r = DateRange::new(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
        assert!(r.contains(ymd(2024, 1, 1)));
        assert!(r.contains(ymd(2024, 1, 31)));
        assert!(!r.contains(ymd(2024, 2, 1)));
        assert!(!r.contains(ymd(2023, 12, 31)));
    }

    #[test]
    fn test_range_rejects_inverted() {
        assert!(DateRange::new(ymd(2024, 2, 1), ymd(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_shifted_back_one_year() {
        let r = DateRange::new(ymd(2024, 3, 1), ymd(2024, 3, 31)).unwrap();
        let prev = r.shifted_back_one_year();
        assert_eq!(prev.start, ymd(2023, 3, 1));
        assert_eq!(prev.end, ymd(2023, 3, 31));
    }

    #[test]
    fn test_shifted_back_one_year_leap_day() {
        let r = DateRange::new(ymd(2024, 2, 1), ymd(2024, 2, 29)).unwrap();
        assert_eq!(r.shifted_back_one_year().end, ymd(2023, 2, 28));
    }

    #[test]
    fn test_shifted_by_months() {
        let r = DateRange::new(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
        let next = r.shifted_by_months(1);
        assert_eq!(next.start, ymd(2024, 2, 1));
        assert_eq!(next.end, ymd(2024, 2, 29));
        let prev = r.shifted_by_months(-1);
        assert_eq!(prev.start, ymd(2023, 12, 1));
        assert_eq!(prev.end, ymd(2023, 12, 31));
        assert_eq!(r.shifted_by_months(0), r);
    }

    #[test]
    fn test_clamp_to() {
        let bounds = DateRange::new(ymd(2024, 1, 1), ymd(2024, 12, 31)).unwrap();
        let wide = DateRange::new(ymd(2023, 6, 1), ymd(2024, 2, 1)).unwrap();
        let clamped = wide.clamp_to(&bounds).unwrap();
        assert_eq!(clamped.start, ymd(2024, 1, 1));
        assert_eq!(clamped.end, ymd(2024, 2, 1));

        let outside = DateRange::new(ymd(2020, 1, 1), ymd(2020, 1, 2)).unwrap();
        assert!(outside.clamp_to(&bounds).is_none());
    }

    #[test]
    fn test_label() {
        let r = DateRange::new(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
        assert_eq!(r.label(), "01/01/2024 - 31/01/2024");
    }
}
