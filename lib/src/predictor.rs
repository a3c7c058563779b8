//! Single-row inference.
//!
//! A [`Predictor`] loads the artifact once and shares it through an `Arc`,
//! so clones are cheap and every call reuses the same fitted state. Queries
//! are normalized with the same stateless parsers the cleaner uses.
//!
//! ```ignore
//! use flight_fare::predictor::{PredictionQuery, Predictor};
//!
//! let predictor = Predictor::load("models/random_forest.bin")?;
//! let price = predictor.predict(&PredictionQuery::sample())?;
//! ```

use crate::artifact::ModelArtifact;
use crate::cleaning::{
    clean_airline_name, parse_duration_minutes, parse_journey_date, parse_time_of_day,
    parse_total_stops,
};
use crate::error::{FareError, Result};
use crate::schema::CleanedRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_ADDITIONAL_INFO: &str = "no info";

/// A numeric field given either as a number or as raw text (`"9h 35m"`,
/// `"1 stop"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Number(i64),
    Text(String),
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Number(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl QueryValue {
    fn to_count(&self, column: &str, parse_text: fn(&str) -> Result<u32>) -> Result<u32> {
        match self {
            QueryValue::Number(n) => u32::try_from(*n)
                .map_err(|_| FareError::parse(column, &n.to_string(), "expected a non-negative integer")),
            QueryValue::Text(s) => match s.trim().parse::<u32>() {
                Ok(n) => Ok(n),
                Err(_) => parse_text(s),
            },
        }
    }
}

/// One prediction request, as a JSON object.
///
/// Every field except `additional_info` is required; unknown keys are
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictionQuery {
    pub airline: Option<String>,
    pub date_of_journey: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub dep_time: Option<String>,
    pub arrival_time: Option<String>,
    pub duration_minute: Option<QueryValue>,
    pub total_stops: Option<QueryValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

impl PredictionQuery {
    /// Multiple Carriers, Delhi to Cochin on 2019-05-21, 02:15 to 11:50,
    /// 575 minutes, one stop.
    pub fn sample() -> Self {
        Self {
            airline: Some("Multiple carriers".to_string()),
            date_of_journey: Some("2019-05-21".to_string()),
            source: Some("Delhi".to_string()),
            destination: Some("Cochin".to_string()),
            dep_time: Some("02:15:00".to_string()),
            arrival_time: Some("11:50:00".to_string()),
            duration_minute: Some(QueryValue::Number(575)),
            total_stops: Some(QueryValue::Number(1)),
            additional_info: None,
        }
    }

    /// Parse a JSON object.
    ///
    /// # Errors
    /// [`FareError::Schema`] for malformed JSON, unknown keys or wrongly
    /// typed values.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FareError::schema(format!("invalid query: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| FareError::schema(e.to_string()))
    }

    /// Normalize into a cleaned record.
    ///
    /// # Errors
    /// [`FareError::Schema`] naming the first missing field,
    /// [`FareError::Parse`] for a malformed value.
    pub fn to_record(&self) -> Result<CleanedRecord> {
        fn required<'a, T>(field: &'a Option<T>, name: &str) -> Result<&'a T> {
            field
                .as_ref()
                .ok_or_else(|| FareError::schema(format!("query is missing required field `{}`", name)))
        }

        Ok(CleanedRecord {
            airline: clean_airline_name(required(&self.airline, "airline")?),
            date_of_journey: parse_journey_date(required(&self.date_of_journey, "date_of_journey")?)?,
            source: required(&self.source, "source")?.trim().to_string(),
            destination: required(&self.destination, "destination")?.trim().to_string(),
            dep_time: parse_time_of_day("dep_time", required(&self.dep_time, "dep_time")?)?,
            arrival_time: parse_time_of_day(
                "arrival_time",
                required(&self.arrival_time, "arrival_time")?,
            )?,
            duration_minute: required(&self.duration_minute, "duration_minute")?
                .to_count("duration_minute", parse_duration_minutes)?,
            total_stops: required(&self.total_stops, "total_stops")?
                .to_count("total_stops", parse_total_stops)?,
            additional_info: self
                .additional_info
                .as_deref()
                .map(|s| s.trim().to_lowercase())
                .unwrap_or_else(|| DEFAULT_ADDITIONAL_INFO.to_string()),
            price: None,
        })
    }
}

/// Inference handle over a shared, immutable artifact.
#[derive(Debug, Clone)]
pub struct Predictor {
    artifact: Arc<ModelArtifact>,
}

impl Predictor {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self {
            artifact: Arc::new(artifact),
        }
    }

    pub fn from_shared(artifact: Arc<ModelArtifact>) -> Self {
        Self { artifact }
    }

    /// Load the artifact at `path` once.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(ModelArtifact::load_from_file(path)?))
    }

    pub fn artifact(&self) -> &Arc<ModelArtifact> {
        &self.artifact
    }

    /// Predict the price of one query.
    pub fn predict(&self, query: &PredictionQuery) -> Result<f64> {
        self.predict_record(&query.to_record()?)
    }

    /// Predict from a JSON query string.
    pub fn predict_json(&self, json: &str) -> Result<f64> {
        self.predict(&PredictionQuery::from_json(json)?)
    }

    /// Predict the price of an already-cleaned record.
    pub fn predict_record(&self, record: &CleanedRecord) -> Result<f64> {
        let predictions = self.artifact.predict(std::slice::from_ref(record))?;
        let price = predictions
            .first()
            .copied()
            .ok_or_else(|| FareError::Model("estimator returned no prediction".to_string()))?;
        if !price.is_finite() {
            return Err(FareError::Value(format!("non-finite prediction {}", price)));
        }
        debug!(airline = %record.airline, price, "predicted price");
        Ok(price)
    }
}

/// Load the artifact at `path` and predict one query; reloads every call.
pub fn predict_from_path(path: impl AsRef<Path>, query: &PredictionQuery) -> Result<f64> {
    Predictor::load(path)?.predict(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sample_query_normalizes() {
        let record = PredictionQuery::sample().to_record().unwrap();
        assert_eq!(
            record,
            CleanedRecord {
                airline: "Multiple Carriers".to_string(),
                date_of_journey: NaiveDate::from_ymd_opt(2019, 5, 21).unwrap(),
                source: "Delhi".to_string(),
                destination: "Cochin".to_string(),
                dep_time: NaiveTime::from_hms_opt(2, 15, 0).unwrap(),
                arrival_time: NaiveTime::from_hms_opt(11, 50, 0).unwrap(),
                duration_minute: 575,
                total_stops: 1,
                additional_info: "no info".to_string(),
                price: None,
            }
        );
    }

    #[test]
    fn test_query_from_json_accepts_text_values() {
        let query = PredictionQuery::from_json(
            r#"{
                "airline": "Jet Airways Business",
                "date_of_journey": "24/03/2019",
                "source": " Banglore ",
                "destination": "New Delhi",
                "dep_time": "22:20",
                "arrival_time": "01:10 22 Mar",
                "duration_minute": "2h 50m",
                "total_stops": "non-stop",
                "additional_info": "In-flight meal not included"
            }"#,
        )
        .unwrap();

        let record = query.to_record().unwrap();
        assert_eq!(record.airline, "Jet Airways");
        assert_eq!(record.source, "Banglore");
        assert_eq!(record.duration_minute, 170);
        assert_eq!(record.total_stops, 0);
        assert_eq!(record.arrival_time, NaiveTime::from_hms_opt(1, 10, 0).unwrap());
        assert_eq!(record.additional_info, "in-flight meal not included");
    }

    #[test]
    fn test_missing_field_is_schema_error() {
        let query = PredictionQuery {
            source: None,
            ..PredictionQuery::sample()
        };
        let err = query.to_record().unwrap_err();
        assert!(matches!(&err, FareError::Schema(msg) if msg.contains("source")));
    }

    #[test]
    fn test_unknown_key_is_schema_error() {
        let err = PredictionQuery::from_json(r#"{"airline": "Indigo", "price": 100}"#).unwrap_err();
        assert!(matches!(err, FareError::Schema(_)));
    }

    #[test]
    fn test_malformed_values_are_parse_errors() {
        let bad_date = PredictionQuery {
            date_of_journey: Some("21st of May".to_string()),
            ..PredictionQuery::sample()
        };
        assert!(matches!(bad_date.to_record(), Err(FareError::Parse { .. })));

        let negative = PredictionQuery {
            total_stops: Some(QueryValue::Number(-1)),
            ..PredictionQuery::sample()
        };
        assert!(matches!(negative.to_record(), Err(FareError::Parse { .. })));
    }

    #[test]
    fn test_query_json_round_trip() {
        let query = PredictionQuery::sample();
        let json = query.to_json().unwrap();
        assert_eq!(PredictionQuery::from_json(&json).unwrap(), query);
    }

    #[test]
    fn test_predict_from_missing_path() {
        let err = predict_from_path("/nonexistent/model.bin", &PredictionQuery::sample()).unwrap_err();
        assert!(matches!(err, FareError::NotFound(_)));
    }
}
