//! Dataset I/O: the raw input CSV and CSV files of cleaned records.
//!
//! Raw input goes through [`load_frame`] into a [`Frame`] for the cleaner.
//! Cleaned records are written and read back with serde, one column per
//! [`CleanedRecord`] field (dates as `YYYY-MM-DD`, times as `HH:MM:SS`).

pub mod split;

pub use split::{split_and_save, three_way_split, train_test_split, Split, ThreeWaySplit};

use crate::error::{FareError, Result};
use crate::frame::Frame;
use crate::schema::CleanedRecord;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use tracing::info;

/// Read the raw input CSV.
///
/// # Errors
/// [`FareError::NotFound`] if `path` does not exist; CSV or parse errors
/// for malformed content.
pub fn load_frame(path: impl AsRef<Path>) -> Result<Frame> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| FareError::from_io(path, e))?;
    let frame = Frame::from_csv_reader(BufReader::new(file))?;
    info!(path = %path.display(), rows = frame.n_rows(), columns = frame.n_columns(), "loaded input");
    Ok(frame)
}

/// Write cleaned records as CSV with a header row.
pub fn write_records<W: Write>(writer: W, records: &[CleanedRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write cleaned records to `path`, creating parent directories.
pub fn save_records(path: impl AsRef<Path>, records: &[CleanedRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_records(file, records)
}

/// Parse cleaned records written by [`write_records`].
pub fn read_records<R: Read>(reader: R) -> Result<Vec<CleanedRecord>> {
    csv::Reader::from_reader(reader)
        .deserialize()
        .map(|row| row.map_err(FareError::from))
        .collect()
}

/// Load cleaned records from `path`.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<CleanedRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| FareError::from_io(path, e))?;
    read_records(BufReader::new(file))
}
