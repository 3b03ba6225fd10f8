//! Extraction of a route timetable from its schedule page.
//!
//! Pages are hand-authored, so extraction is tolerant: blank and `.` cells are
//! skipped, a cell may hold several `/`-separated times (short-turn trips), and
//! rows marked as alternate service are left out entirely.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use super::season::DayType;
use super::stop_index::{ResolvedStop, StopIndex};
use super::time::{RolloverContext, TimeParseError};
use crate::config::Lookups;

static HEADER_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table thead tr").expect("valid header selector"));
static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table tbody").expect("valid body selector"));

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Schedule page has no table header row")]
    MissingHeader,
    #[error("Schedule page has no table body")]
    MissingBody,
    #[error("Column `{0}` does not match any stop")]
    UnknownStop(String),
    #[error("Row {row} has times in column {column} but the table only has {columns} stops")]
    ColumnMismatch {
        row: usize,
        column: usize,
        columns: usize,
    },
    #[error(transparent)]
    InvalidTime(#[from] TimeParseError),
}

/// One route's standard timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timetable {
    /// Stops in column order.
    pub stops: Vec<ResolvedStop>,
    /// Per row, per column, the `HH:MM:00` times in ascending order.
    pub rows: Vec<Vec<Vec<String>>>,
    pub day_type: DayType,
}

/// Weekend-only routes say so in the page text; everything else runs weekdays.
pub fn day_type(html: &str, lookups: &Lookups) -> DayType {
    if html.contains(&lookups.weekend_marker) {
        DayType::Weekend
    } else {
        DayType::Weekday
    }
}

pub struct TimetableExtractor<'a> {
    lookups: &'a Lookups,
    stops: &'a StopIndex,
}

impl<'a> TimetableExtractor<'a> {
    pub fn new(lookups: &'a Lookups, stops: &'a StopIndex) -> Self {
        Self { lookups, stops }
    }

    pub fn extract(&self, html: &str) -> Result<Timetable, ScheduleError> {
        let document = Html::parse_document(html);

        let header = document
            .select(&HEADER_ROW)
            .next()
            .ok_or(ScheduleError::MissingHeader)?;
        let stops = child_elements(header)
            .filter(|cell| cell.value().name() == "th" && cell.value().attr("scope") == Some("col"))
            .map(|cell| {
                let label = cell_text(cell);
                self.stops
                    .resolve(&label, self.lookups)
                    .cloned()
                    .ok_or(ScheduleError::UnknownStop(label))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let body = document
            .select(&BODY)
            .next()
            .ok_or(ScheduleError::MissingBody)?;

        let mut ctx = RolloverContext::new();
        let mut rows = Vec::new();
        for row in child_elements(body).filter(|row| self.is_standard_row(*row)) {
            let cells = child_elements(row)
                .filter(|cell| cell.value().name() == "td" && cell.value().attr("scope") != Some("row"))
                .map(|cell| parse_cell(&cell_text(cell), &mut ctx))
                .collect::<Result<Vec<_>, _>>()?;

            if let Some(column) = cells
                .iter()
                .enumerate()
                .skip(stops.len())
                .find_map(|(column, times)| (!times.is_empty()).then_some(column))
            {
                return Err(ScheduleError::ColumnMismatch {
                    row: rows.len(),
                    column,
                    columns: stops.len(),
                });
            }
            rows.push(cells);
        }

        Ok(Timetable {
            stops,
            rows,
            day_type: day_type(html, self.lookups),
        })
    }

    fn is_standard_row(&self, row: ElementRef<'_>) -> bool {
        row.value().name() == "tr"
            && row.value().attr("class").map(str::trim)
                != Some(self.lookups.alternate_service_class.as_str())
    }
}

fn child_elements(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.children().filter_map(ElementRef::wrap)
}

fn cell_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Splits a cell on `/`, parses each time and orders them within the cell.
fn parse_cell(text: &str, ctx: &mut RolloverContext) -> Result<Vec<String>, TimeParseError> {
    let mut times = text
        .split('/')
        .map(str::trim)
        .filter(|token| !token.is_empty() && *token != ".")
        .map(|token| ctx.parse(token))
        .collect::<Result<Vec<_>, _>>()?;
    times.sort_by_key(|time| time.total_minutes);
    Ok(times.into_iter().map(|time| time.text).collect())
}
