//! Parsing of timetable cells such as `"7:45 am"` into GTFS times.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*([ap]m)$").expect("time pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unparseable schedule time `{0}`")]
pub struct TimeParseError(pub String);

/// A parsed stop time. `text` is `HH:MM:00` and may exceed `23:59:00` for
/// service running past midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTime {
    pub text: String,
    pub total_minutes: u32,
}

/// Tracks the last time seen in a timetable so later times that read as
/// earlier can be pushed onto the next service day.
///
/// Timetables only move forward and cross midnight at most once, so a single
/// context is threaded through every cell of one table and then discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct RolloverContext {
    last_hour: Option<u32>,
}

impl RolloverContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one `H:MM am|pm` token.
    pub fn parse(&mut self, raw: &str) -> Result<ScheduleTime, TimeParseError> {
        let invalid = || TimeParseError(raw.to_string());
        let caps = TIME_PATTERN.captures(raw.trim()).ok_or_else(invalid)?;

        let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
        let minute: u32 = caps[2].parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&hour) || minute > 59 {
            return Err(invalid());
        }

        let pm = caps[3].eq_ignore_ascii_case("pm");
        let mut hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };

        if let Some(last_hour) = self.last_hour {
            if hour < last_hour {
                hour += 24;
            }
        }
        self.last_hour = Some(hour);

        Ok(ScheduleTime {
            text: format!("{hour:02}:{minute:02}:00"),
            total_minutes: hour * 60 + minute,
        })
    }
}
