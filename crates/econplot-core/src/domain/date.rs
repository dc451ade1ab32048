use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime};

use crate::ValidationError;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const ISO_DATE_TIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Calendar date an observation is indexed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObservationDate(Date);

impl ObservationDate {
    pub fn today() -> Self {
        Self(OffsetDateTime::now_utc().date())
    }

    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or an RFC3339 timestamp.
    /// Time-of-day components are discarded.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if let Ok(date) = Date::parse(trimmed, ISO_DATE) {
            return Ok(Self(date));
        }
        if let Ok(value) = PrimitiveDateTime::parse(trimmed, ISO_DATE_TIME) {
            return Ok(Self(value.date()));
        }
        OffsetDateTime::parse(trimmed, &Rfc3339)
            .map(|value| Self(value.date()))
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    pub fn from_ymd(year: i32, month: u8, day: u8) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDate {
            value: format!("{year:04}-{month:02}-{day:02}"),
        };
        let month = Month::try_from(month).map_err(|_| invalid())?;
        Date::from_calendar_date(year, month, day)
            .map(Self)
            .map_err(|_| invalid())
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Calendar month, 1-12.
    pub fn month(self) -> u8 {
        u8::from(self.0.month())
    }

    /// Whole days from `earlier` to `self`.
    pub fn days_since(self, earlier: Self) -> i64 {
        (self.0 - earlier.0).whole_days()
    }

    /// Continuous day number, used as the x coordinate on charts.
    pub fn julian_day(self) -> i32 {
        self.0.to_julian_day()
    }

    pub fn into_inner(self) -> Date {
        self.0
    }

    pub fn format_iso(self) -> String {
        self.0
            .format(ISO_DATE)
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }
}

impl From<Date> for ObservationDate {
    fn from(value: Date) -> Self {
        Self(value)
    }
}

impl FromStr for ObservationDate {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Display for ObservationDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl Serialize for ObservationDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_iso())
    }
}

impl<'de> Deserialize<'de> for ObservationDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
