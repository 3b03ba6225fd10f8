//! Academic-year service windows and the service identifiers built from them.

use std::fmt;

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Fall,
    Spring,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Fall => "fall",
            Season::Spring => "spring",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
        }
    }

    /// Monday..Sunday service flags.
    pub fn weekdays(&self) -> [bool; 7] {
        match self {
            DayType::Weekday => [true, true, true, true, true, false, false],
            DayType::Weekend => [false, false, false, false, false, true, true],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The fall and spring windows for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonWindows {
    pub year: i32,
    pub fall: ServiceWindow,
    pub spring: ServiceWindow,
}

impl SeasonWindows {
    /// Fall runs Sep 1 - Dec 14, spring Jan 14 - May 14.
    pub fn for_year(year: i32) -> Self {
        Self {
            year,
            fall: ServiceWindow {
                start: ymd(year, 9, 1),
                end: ymd(year, 12, 14),
            },
            spring: ServiceWindow {
                start: ymd(year, 1, 14),
                end: ymd(year, 5, 14),
            },
        }
    }

    pub fn containing(today: NaiveDate) -> Self {
        Self::for_year(today.year())
    }

    pub fn window(&self, season: Season) -> ServiceWindow {
        match season {
            Season::Fall => self.fall,
            Season::Spring => self.spring,
        }
    }

    /// Fall once its window has opened, spring before that.
    ///
    /// The rule is `today >= fall.start`: Sep 1 is fall while Jun 1 and Mar 3
    /// are spring. Reading it the other way round (`fall.start >= today`)
    /// would put every date before September in fall.
    ///
    /// Only the fall start date is compared, so summer dates resolve to spring
    /// and late December resolves to fall even though neither lies inside a
    /// window.
    pub fn select(&self, today: NaiveDate) -> Season {
        if today >= self.fall.start {
            Season::Fall
        } else {
            Season::Spring
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    // Fixed month/day pairs that exist in every year.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// Key joining a trip to its calendar row, e.g. `weekday-2024-fall`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId {
    pub day_type: DayType,
    pub year: i32,
    pub season: Season,
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.day_type.as_str(),
            self.year,
            self.season.as_str()
        )
    }
}
