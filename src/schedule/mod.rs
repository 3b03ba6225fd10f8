//! Scraped timetables: time parsing, table extraction and season selection.

pub mod season;
pub mod stop_index;
pub mod table;
pub mod time;

pub use season::{DayType, Season, SeasonWindows, ServiceId, ServiceWindow};
pub use stop_index::{ResolvedStop, StopIndex};
pub use table::{ScheduleError, Timetable, TimetableExtractor, day_type};
pub use time::{RolloverContext, ScheduleTime, TimeParseError};
