//! The ordered cleaning steps.
//!
//! Every step computes its replacement columns first and only then touches
//! the frame, so a failing step leaves the frame exactly as it found it.

use super::parse::{
    clean_airline_name, parse_duration_minutes, parse_journey_date, parse_time_of_day,
    parse_total_stops,
};
use super::CleaningConfig;
use crate::error::{FareError, Result};
use crate::frame::{ColumnData, Frame};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the cleaning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStep {
    /// Drop rows whose raw duration is the corrupt sentinel; drop `route`.
    DropCorruptRows,
    DropDuplicates,
    DropNulls,
    LowercaseColumnNames,
    StripText,
    CleanAirline,
    ParseJourneyDate,
    ParseTimes,
    ParseDuration,
    ParseTotalStops,
    LowercaseAdditionalInfo,
    /// Drop duplicates and nulls once more after normalization.
    FinalDeduplicate,
}

impl CleaningStep {
    /// All steps in execution order.
    pub const ALL: [CleaningStep; 12] = [
        CleaningStep::DropCorruptRows,
        CleaningStep::DropDuplicates,
        CleaningStep::DropNulls,
        CleaningStep::LowercaseColumnNames,
        CleaningStep::StripText,
        CleaningStep::CleanAirline,
        CleaningStep::ParseJourneyDate,
        CleaningStep::ParseTimes,
        CleaningStep::ParseDuration,
        CleaningStep::ParseTotalStops,
        CleaningStep::LowercaseAdditionalInfo,
        CleaningStep::FinalDeduplicate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CleaningStep::DropCorruptRows => "drop_corrupt_rows",
            CleaningStep::DropDuplicates => "drop_duplicates",
            CleaningStep::DropNulls => "drop_nulls",
            CleaningStep::LowercaseColumnNames => "lowercase_column_names",
            CleaningStep::StripText => "strip_text",
            CleaningStep::CleanAirline => "clean_airline",
            CleaningStep::ParseJourneyDate => "parse_journey_date",
            CleaningStep::ParseTimes => "parse_times",
            CleaningStep::ParseDuration => "parse_duration",
            CleaningStep::ParseTotalStops => "parse_total_stops",
            CleaningStep::LowercaseAdditionalInfo => "lowercase_additional_info",
            CleaningStep::FinalDeduplicate => "final_deduplicate",
        }
    }

    /// Apply the step to `frame`. On error the frame is unchanged.
    pub fn apply(self, frame: &mut Frame, config: &CleaningConfig) -> Result<()> {
        match self {
            CleaningStep::DropCorruptRows => drop_corrupt_rows(frame, &config.corrupt_duration),
            CleaningStep::DropDuplicates => {
                frame.drop_duplicates();
                Ok(())
            }
            CleaningStep::DropNulls => {
                frame.drop_nulls();
                Ok(())
            }
            CleaningStep::LowercaseColumnNames => {
                frame.rename_columns(|name| name.trim().to_lowercase());
                Ok(())
            }
            CleaningStep::StripText => {
                for column in frame.columns_mut() {
                    if let ColumnData::Text(values) = column {
                        for value in values.iter_mut().flatten() {
                            if value.trim().len() != value.len() {
                                *value = value.trim().to_string();
                            }
                        }
                    }
                }
                Ok(())
            }
            CleaningStep::CleanAirline => map_text_column(frame, "airline", |v| {
                Ok(clean_airline_name(v))
            }),
            CleaningStep::ParseJourneyDate => parse_dates(frame),
            CleaningStep::ParseTimes => parse_times(frame),
            CleaningStep::ParseDuration => parse_duration(frame),
            CleaningStep::ParseTotalStops => parse_stops(frame),
            CleaningStep::LowercaseAdditionalInfo => {
                map_text_column(frame, "additional_info", |v| Ok(v.to_lowercase()))
            }
            CleaningStep::FinalDeduplicate => {
                frame.drop_duplicates();
                frame.drop_nulls();
                Ok(())
            }
        }
    }
}

impl fmt::Display for CleaningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn require<'a>(frame: &'a Frame, name: &str) -> Result<&'a ColumnData> {
    frame
        .column(name)
        .ok_or_else(|| FareError::schema(format!("missing column `{}`", name)))
}

fn wrong_kind(name: &str, data: &ColumnData, expected: &str) -> FareError {
    FareError::schema(format!(
        "column `{}` is {}, expected {}",
        name,
        data.kind(),
        expected
    ))
}

fn map_values<T>(
    values: &[Option<String>],
    f: impl Fn(&str) -> Result<T>,
) -> Result<Vec<Option<T>>> {
    values
        .iter()
        .map(|value| value.as_deref().map(&f).transpose())
        .collect()
}

fn map_text_column(
    frame: &mut Frame,
    name: &str,
    f: impl Fn(&str) -> Result<String>,
) -> Result<()> {
    let mapped = match require(frame, name)? {
        ColumnData::Text(values) => map_values(values, f)?,
        other => return Err(wrong_kind(name, other, "text")),
    };
    frame.replace_column(name, ColumnData::Text(mapped))
}

fn drop_corrupt_rows(frame: &mut Frame, sentinel: &str) -> Result<()> {
    if let Some(ColumnData::Text(values)) = frame.column("duration") {
        let keep: Vec<bool> = values
            .iter()
            .map(|v| v.as_deref().map(str::trim) != Some(sentinel))
            .collect();
        frame.retain_rows(&keep);
    }
    frame.drop_column("route");
    Ok(())
}

fn parse_dates(frame: &mut Frame) -> Result<()> {
    let name = "date_of_journey";
    let parsed = match require(frame, name)? {
        ColumnData::Text(values) => map_values(values, parse_journey_date)?,
        ColumnData::Date(_) => return Ok(()),
        other => return Err(wrong_kind(name, other, "text or date")),
    };
    frame.replace_column(name, ColumnData::Date(parsed))
}

fn parse_times(frame: &mut Frame) -> Result<()> {
    let mut replacements = Vec::with_capacity(2);
    for name in ["dep_time", "arrival_time"] {
        match require(frame, name)? {
            ColumnData::Text(values) => {
                let parsed = map_values(values, |v| parse_time_of_day(name, v))?;
                replacements.push((name, parsed));
            }
            ColumnData::Time(_) => {}
            other => return Err(wrong_kind(name, other, "text or time")),
        }
    }
    for (name, parsed) in replacements {
        frame.replace_column(name, ColumnData::Time(parsed))?;
    }
    Ok(())
}

fn to_integers(values: Vec<Option<u32>>) -> ColumnData {
    ColumnData::Integer(values.into_iter().map(|v| v.map(i64::from)).collect())
}

fn parse_duration(frame: &mut Frame) -> Result<()> {
    if let Some(data) = frame.column("duration") {
        let parsed = match data {
            ColumnData::Text(values) => map_values(values, parse_duration_minutes)?,
            other => return Err(wrong_kind("duration", other, "text")),
        };
        return frame.replace_and_rename("duration", "duration_minute", to_integers(parsed));
    }
    // Already-cleaned input carries duration_minute instead
    match require(frame, "duration_minute")? {
        ColumnData::Integer(_) => Ok(()),
        ColumnData::Text(values) => {
            let parsed = map_values(values, |v| {
                v.parse::<u32>()
                    .map_err(|e| FareError::parse("duration_minute", v, e.to_string()))
            })?;
            frame.replace_column("duration_minute", to_integers(parsed))
        }
        other => Err(wrong_kind("duration_minute", other, "integer")),
    }
}

fn parse_stops(frame: &mut Frame) -> Result<()> {
    let name = "total_stops";
    let parsed = match require(frame, name)? {
        ColumnData::Text(values) => map_values(values, parse_total_stops)?,
        ColumnData::Integer(_) => return Ok(()),
        other => return Err(wrong_kind(name, other, "text or integer")),
    };
    frame.replace_column(name, to_integers(parsed))
}
