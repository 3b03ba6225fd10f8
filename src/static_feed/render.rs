//! CSV rendering of static GTFS tables.

use csv::{Terminator, WriterBuilder};
use tracing::debug;

use super::records::GtfsRecord;
use crate::error::FeedError;

/// Renders a header row followed by one row per record.
///
/// The header is written explicitly so an empty table still carries its columns.
pub fn render<T: GtfsRecord>(records: &[T]) -> Result<String, FeedError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(T::COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    debug!(file = T::FILE, rows = records.len(), bytes = bytes.len(), "Rendered table");
    Ok(String::from_utf8(bytes)?)
}
