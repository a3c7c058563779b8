//! Column cleaning: raw frame -> typed [`CleanedRecord`]s.
//!
//! The cleaner runs the fixed [`CleaningStep`] sequence over a [`Frame`].
//! What happens when a step fails is decided by the configured
//! [`ErrorPolicy`]; either way every step leaves a [`StepReport`]. Once the
//! steps are done, [`CleaningOutcome::into_records`] validates the frame
//! against the declared [`Column`] schema.
//!
//! # Example
//! ```ignore
//! use flight_fare::cleaning::{Cleaner, CleaningConfig};
//!
//! let outcome = Cleaner::new(CleaningConfig::default()).clean(frame)?;
//! let records = outcome.into_records()?;
//! ```

mod parse;
mod steps;

pub use parse::{
    clean_airline_name, parse_duration_minutes, parse_journey_date, parse_time_of_day,
    parse_total_stops, title_case,
};
pub use steps::CleaningStep;

use crate::error::{FareError, Result};
use crate::frame::{ColumnData, Frame};
use crate::schema::{CleanedRecord, Column};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What to do when a cleaning step fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop at the first failing step and return its error.
    FailFast,
    /// Log the failure, leave the column unmodified and keep going.
    #[default]
    BestEffort,
}

/// Cleaner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub policy: ErrorPolicy,
    /// Raw duration value marking a corrupt row.
    pub corrupt_duration: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            policy: ErrorPolicy::BestEffort,
            corrupt_duration: "5m".to_string(),
        }
    }
}

/// Outcome of one cleaning step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub step: CleaningStep,
    pub rows_before: usize,
    pub rows_after: usize,
    /// Error message if the step failed and was skipped.
    pub error: Option<String>,
}

impl StepReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn rows_dropped(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// The cleaned frame plus one report per step.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub frame: Frame,
    pub reports: Vec<StepReport>,
}

impl CleaningOutcome {
    /// Rows removed across all steps.
    pub fn rows_dropped(&self) -> usize {
        self.reports.iter().map(StepReport::rows_dropped).sum()
    }

    /// Steps that failed and were skipped.
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.reports.iter().filter(|r| !r.is_ok())
    }

    /// Validate the frame against the cleaned schema and convert it to records.
    pub fn into_records(self) -> Result<Vec<CleanedRecord>> {
        records_from_frame(&self.frame)
    }
}

/// Runs the cleaning steps under an [`ErrorPolicy`].
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    config: CleaningConfig,
}

impl Cleaner {
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Run every step over `frame`.
    ///
    /// # Errors
    /// With [`ErrorPolicy::FailFast`], the first step error. With
    /// [`ErrorPolicy::BestEffort`] this only fails if the frame itself is unusable.
    pub fn clean(&self, mut frame: Frame) -> Result<CleaningOutcome> {
        info!(rows = frame.n_rows(), columns = frame.n_columns(), "cleaning frame");
        let mut reports = Vec::with_capacity(CleaningStep::ALL.len());

        for step in CleaningStep::ALL {
            let rows_before = frame.n_rows();
            let error = match step.apply(&mut frame, &self.config) {
                Ok(()) => None,
                Err(err) if self.config.policy == ErrorPolicy::FailFast => return Err(err),
                Err(err) => {
                    warn!(step = step.name(), error = %err, "cleaning step failed, column left unmodified");
                    Some(err.to_string())
                }
            };
            debug!(step = step.name(), rows_before, rows_after = frame.n_rows(), "cleaning step done");
            reports.push(StepReport {
                step,
                rows_before,
                rows_after: frame.n_rows(),
                error,
            });
        }

        let outcome = CleaningOutcome { frame, reports };
        info!(
            rows = outcome.frame.n_rows(),
            dropped = outcome.rows_dropped(),
            failed_steps = outcome.failed_steps().count(),
            "cleaning finished"
        );
        Ok(outcome)
    }

    /// Clean and validate in one call.
    pub fn clean_records(&self, frame: Frame) -> Result<Vec<CleanedRecord>> {
        self.clean(frame)?.into_records()
    }
}

fn typed_column<'a>(frame: &'a Frame, column: Column) -> Result<Option<&'a ColumnData>> {
    match frame.column(column.name()) {
        None if column.is_optional() => Ok(None),
        None => Err(FareError::schema(format!("missing column `{}`", column))),
        Some(data) if data.kind() != column.kind() => Err(FareError::schema(format!(
            "column `{}` is {}, expected {}",
            column,
            data.kind(),
            column.kind()
        ))),
        Some(data) => Ok(Some(data)),
    }
}

fn cell<T: Clone>(values: &[Option<T>], row: usize, column: Column) -> Result<T> {
    values[row]
        .clone()
        .ok_or_else(|| FareError::schema(format!("null `{}` at row {}", column, row)))
}

fn non_negative(value: i64, row: usize, column: Column) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        FareError::Value(format!("`{}` at row {} out of range: {}", column, row, value))
    })
}

/// Validate `frame` against the cleaned schema and build typed records.
///
/// Missing, mistyped and unexpected columns are all schema errors.
pub fn records_from_frame(frame: &Frame) -> Result<Vec<CleanedRecord>> {
    macro_rules! column {
        ($col:expr, $variant:ident) => {
            match typed_column(frame, $col)? {
                Some(ColumnData::$variant(values)) => Some(values),
                _ => None,
            }
        };
    }

    let missing = |c: Column| FareError::schema(format!("missing column `{}`", c));
    let airline = column!(Column::Airline, Text).ok_or_else(|| missing(Column::Airline))?;
    let date = column!(Column::DateOfJourney, Date).ok_or_else(|| missing(Column::DateOfJourney))?;
    let source = column!(Column::Source, Text).ok_or_else(|| missing(Column::Source))?;
    let destination =
        column!(Column::Destination, Text).ok_or_else(|| missing(Column::Destination))?;
    let dep_time = column!(Column::DepTime, Time).ok_or_else(|| missing(Column::DepTime))?;
    let arrival_time =
        column!(Column::ArrivalTime, Time).ok_or_else(|| missing(Column::ArrivalTime))?;
    let duration =
        column!(Column::DurationMinute, Integer).ok_or_else(|| missing(Column::DurationMinute))?;
    let stops = column!(Column::TotalStops, Integer).ok_or_else(|| missing(Column::TotalStops))?;
    let info =
        column!(Column::AdditionalInfo, Text).ok_or_else(|| missing(Column::AdditionalInfo))?;
    let price = column!(Column::Price, Float);

    if let Some(extra) = frame
        .column_names()
        .iter()
        .find(|name| !Column::CLEANED.iter().any(|c| c.name() == name.as_str()))
    {
        return Err(FareError::schema(format!("unexpected column `{}`", extra)));
    }

    (0..frame.n_rows())
        .map(|row| {
            Ok(CleanedRecord {
                airline: cell(airline, row, Column::Airline)?,
                date_of_journey: cell(date, row, Column::DateOfJourney)?,
                source: cell(source, row, Column::Source)?,
                destination: cell(destination, row, Column::Destination)?,
                dep_time: cell(dep_time, row, Column::DepTime)?,
                arrival_time: cell(arrival_time, row, Column::ArrivalTime)?,
                duration_minute: non_negative(
                    cell(duration, row, Column::DurationMinute)?,
                    row,
                    Column::DurationMinute,
                )?,
                total_stops: non_negative(cell(stops, row, Column::TotalStops)?, row, Column::TotalStops)?,
                additional_info: cell(info, row, Column::AdditionalInfo)?,
                price: price.and_then(|values| values[row]),
            })
        })
        .collect()
}
