use std::fmt;
use std::str::FromStr;

use chrono::{Datelike as _, Days, NaiveDate, Weekday};
use eyre::{eyre, Error};
use serde::{Deserialize, Serialize};

/// Partition key of the per-month attendance documents, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, Error> {
        if !(1..=12).contains(&month) {
            return Err(eyre!("Invalid month: {}", month));
        }
        Ok(MonthKey { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap()
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            MonthKey {
                year: self.year + 1,
                month: 1,
            }
        } else {
            MonthKey {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            MonthKey {
                year: self.year - 1,
                month: 12,
            }
        } else {
            MonthKey {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn days_in_month(&self) -> u32 {
        self.next()
            .first_day()
            .signed_duration_since(self.first_day())
            .num_days() as u32
    }

    /// Monday-to-Friday dates of the month, in order. The school is closed
    /// on weekends, so reports never query Saturday or Sunday.
    pub fn weekdays(&self) -> Vec<NaiveDate> {
        (1..=self.days_in_month())
            .filter_map(|day| NaiveDate::from_ymd_opt(self.year, self.month, day))
            .filter(|date| is_school_day(*date))
            .collect()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Error> {
        let (year, month) = value
            .split_once('-')
            .ok_or_else(|| eyre!("Invalid month key: {}", value))?;
        MonthKey::new(year.parse()?, month.parse()?)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

/// Date partition key, `YYYY-MM-DD`.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn is_school_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Monday through Friday of the week containing `anchor`.
pub fn school_week(anchor: NaiveDate) -> [NaiveDate; 5] {
    let monday = anchor.week(Weekday::Mon).first_day();
    [0u64, 1, 2, 3, 4].map(|offset| monday + Days::new(offset))
}
