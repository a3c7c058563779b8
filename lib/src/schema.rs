//! Record types and the declared column schema.
//!
//! Raw rows arrive as nullable strings; after cleaning every row is a typed
//! [`CleanedRecord`]. The set of columns and their cleaned types is declared
//! once by [`Column`].

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical type of a frame column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Text,
    Date,
    Time,
    Integer,
    Float,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Text => "text",
            ColumnKind::Date => "date",
            ColumnKind::Time => "time",
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
        };
        f.write_str(name)
    }
}

/// Columns of a cleaned record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    Airline,
    DateOfJourney,
    Source,
    Destination,
    DepTime,
    ArrivalTime,
    DurationMinute,
    TotalStops,
    AdditionalInfo,
    Price,
}

impl Column {
    /// Cleaned input columns, without the target.
    pub const INPUTS: [Column; 9] = [
        Column::Airline,
        Column::DateOfJourney,
        Column::Source,
        Column::Destination,
        Column::DepTime,
        Column::ArrivalTime,
        Column::DurationMinute,
        Column::TotalStops,
        Column::AdditionalInfo,
    ];

    /// Every column a cleaned training frame must carry, in output order.
    pub const CLEANED: [Column; 10] = [
        Column::Airline,
        Column::DateOfJourney,
        Column::Source,
        Column::Destination,
        Column::DepTime,
        Column::ArrivalTime,
        Column::DurationMinute,
        Column::TotalStops,
        Column::AdditionalInfo,
        Column::Price,
    ];

    /// Lowercase column name used after cleaning.
    pub fn name(self) -> &'static str {
        match self {
            Column::Airline => "airline",
            Column::DateOfJourney => "date_of_journey",
            Column::Source => "source",
            Column::Destination => "destination",
            Column::DepTime => "dep_time",
            Column::ArrivalTime => "arrival_time",
            Column::DurationMinute => "duration_minute",
            Column::TotalStops => "total_stops",
            Column::AdditionalInfo => "additional_info",
            Column::Price => "price",
        }
    }

    /// Type the column must have once cleaning finished.
    pub fn kind(self) -> ColumnKind {
        match self {
            Column::Airline | Column::Source | Column::Destination | Column::AdditionalInfo => {
                ColumnKind::Text
            }
            Column::DateOfJourney => ColumnKind::Date,
            Column::DepTime | Column::ArrivalTime => ColumnKind::Time,
            Column::DurationMinute | Column::TotalStops => ColumnKind::Integer,
            Column::Price => ColumnKind::Float,
        }
    }

    /// Whether a cleaned frame may omit the column.
    pub fn is_optional(self) -> bool {
        matches!(self, Column::Price)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One flight listing after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub airline: String,
    pub date_of_journey: NaiveDate,
    pub source: String,
    pub destination: String,
    pub dep_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub duration_minute: u32,
    pub total_stops: u32,
    pub additional_info: String,
    /// Target; absent for inference queries.
    pub price: Option<f64>,
}

impl CleanedRecord {
    /// Render the record back into the raw textual layout of the input CSV.
    pub fn to_raw(&self) -> RawRecord {
        let (hours, minutes) = (self.duration_minute / 60, self.duration_minute % 60);
        let duration = if minutes == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, minutes)
        };
        let total_stops = match self.total_stops {
            0 => "non-stop".to_string(),
            1 => "1 stop".to_string(),
            n => format!("{} stops", n),
        };
        RawRecord {
            airline: Some(self.airline.clone()),
            date_of_journey: Some(self.date_of_journey.format("%d/%m/%Y").to_string()),
            source: Some(self.source.clone()),
            destination: Some(self.destination.clone()),
            route: Some(format!("{} → {}", self.source, self.destination)),
            dep_time: Some(self.dep_time.format("%H:%M:%S").to_string()),
            arrival_time: Some(self.arrival_time.format("%H:%M:%S").to_string()),
            duration: Some(duration),
            total_stops: Some(total_stops),
            additional_info: Some(self.additional_info.clone()),
            price: self.price,
        }
    }
}

/// One flight listing as read from the input CSV.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub airline: Option<String>,
    pub date_of_journey: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub route: Option<String>,
    pub dep_time: Option<String>,
    pub arrival_time: Option<String>,
    pub duration: Option<String>,
    pub total_stops: Option<String>,
    pub additional_info: Option<String>,
    pub price: Option<f64>,
}

impl RawRecord {
    /// Header row of the input CSV.
    pub const HEADERS: [&'static str; 11] = [
        "Airline",
        "Date_of_Journey",
        "Source",
        "Destination",
        "Route",
        "Dep_Time",
        "Arrival_Time",
        "Duration",
        "Total_Stops",
        "Additional_Info",
        "Price",
    ];

    /// The ten text fields in [`RawRecord::HEADERS`] order.
    pub fn text_fields(&self) -> [&Option<String>; 10] {
        [
            &self.airline,
            &self.date_of_journey,
            &self.source,
            &self.destination,
            &self.route,
            &self.dep_time,
            &self.arrival_time,
            &self.duration,
            &self.total_stops,
            &self.additional_info,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(duration_minute: u32, total_stops: u32) -> CleanedRecord {
        CleanedRecord {
            airline: "Indigo".to_string(),
            date_of_journey: NaiveDate::from_ymd_opt(2019, 3, 24).unwrap(),
            source: "Banglore".to_string(),
            destination: "New Delhi".to_string(),
            dep_time: NaiveTime::from_hms_opt(22, 20, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(1, 10, 0).unwrap(),
            duration_minute,
            total_stops,
            additional_info: "no info".to_string(),
            price: Some(3897.0),
        }
    }

    #[test]
    fn test_to_raw_formats() {
        let raw = record(170, 0).to_raw();
        assert_eq!(raw.date_of_journey.as_deref(), Some("24/03/2019"));
        assert_eq!(raw.duration.as_deref(), Some("2h 50m"));
        assert_eq!(raw.total_stops.as_deref(), Some("non-stop"));
        assert_eq!(raw.dep_time.as_deref(), Some("22:20:00"));

        assert_eq!(record(120, 1).to_raw().duration.as_deref(), Some("2h"));
        assert_eq!(record(120, 1).to_raw().total_stops.as_deref(), Some("1 stop"));
        assert_eq!(record(120, 3).to_raw().total_stops.as_deref(), Some("3 stops"));
    }

    #[test]
    fn test_column_kinds() {
        assert_eq!(Column::DateOfJourney.kind(), ColumnKind::Date);
        assert_eq!(Column::TotalStops.kind(), ColumnKind::Integer);
        assert!(Column::Price.is_optional());
        assert!(!Column::Airline.is_optional());
        assert_eq!(Column::DurationMinute.to_string(), "duration_minute");
    }
}
