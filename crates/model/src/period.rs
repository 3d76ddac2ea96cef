use chrono::{Datelike as _, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::attendance::AttendanceKey;

pub const MONTHS_SHORT: [&str; 12] = [
    "янв", "фев", "мар", "апр", "май", "июн", "июл", "авг", "сен", "окт", "ноя", "дек",
];

pub const MONTHS_LONG: [&str; 12] = [
    "Январь", "Февраль", "Март", "Апрель", "Май", "Июнь", "Июль", "Август", "Сентябрь",
    "Октябрь", "Ноябрь", "Декабрь",
];

/// Calendar month with a zero based month index (0 = January).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Month {
    pub year: i32,
    pub month0: u32,
}

impl Month {
    pub fn new(year: i32, month0: u32) -> Month {
        debug_assert!(month0 < 12);
        Month { year, month0 }
    }

    pub fn of(date: NaiveDate) -> Month {
        Month {
            year: date.year(),
            month0: date.month0(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, 1).unwrap()
    }

    /// Next calendar month. Month arithmetic, never fixed-day steps.
    pub fn next(&self) -> Month {
        Month::of(self.first_day().checked_add_months(Months::new(1)).unwrap())
    }

    pub fn prev(&self) -> Month {
        Month::of(self.first_day().checked_sub_months(Months::new(1)).unwrap())
    }

    /// Same month one year forward or back.
    pub fn with_year_offset(&self, years: i32) -> Month {
        Month {
            year: self.year + years,
            month0: self.month0,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month0
    }

    pub fn label(&self) -> String {
        format!("{} {}", MONTHS_LONG[self.month0 as usize], self.year)
    }

    pub fn short_label(&self) -> &'static str {
        MONTHS_SHORT[self.month0 as usize]
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Month::of(date)
    }
}

/// Reporting period selector: one month or a whole year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month(Month),
    Year(i32),
}

impl Period {
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        match self {
            Period::Month(month) => month.contains(date),
            Period::Year(year) => date.year() == *year,
        }
    }

    pub fn contains_key(&self, key: &AttendanceKey) -> bool {
        match self {
            Period::Month(month) => key.year == month.year && key.month0 == month.month0,
            Period::Year(year) => key.year == *year,
        }
    }
}

impl From<Month> for Period {
    fn from(month: Month) -> Self {
        Period::Month(month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ParticipantId;

    #[test]
    fn test_next_and_prev_cross_year_boundaries() {
        let dec = Month::new(2023, 11);
        let jan = dec.next();
        assert_eq!(jan, Month::new(2024, 0));
        assert_eq!(jan.prev(), dec);
    }

    #[test]
    fn test_year_offset_keeps_month() {
        let feb = Month::new(2024, 1);
        assert_eq!(feb.with_year_offset(1), Month::new(2025, 1));
        assert_eq!(feb.with_year_offset(-1), Month::new(2023, 1));
    }

    #[test]
    fn test_contains() {
        let mar = Month::new(2024, 2);
        assert!(mar.contains(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!mar.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }

    #[test]
    fn test_period_matches_keys() {
        let key = AttendanceKey::new(ParticipantId(1), 2024, 0, 15);
        assert!(Period::Month(Month::new(2024, 0)).contains_key(&key));
        assert!(!Period::Month(Month::new(2024, 1)).contains_key(&key));
        assert!(Period::Year(2024).contains_key(&key));
        assert!(!Period::Year(2023).contains_key(&key));
    }

    #[test]
    fn test_labels() {
        let month = Month::new(2024, 0);
        assert_eq!(month.label(), "Январь 2024");
        assert_eq!(month.short_label(), "янв");
    }
}
