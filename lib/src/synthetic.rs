//! Seeded generator of raw flight listings.
//!
//! Rows look like the scraped input: mixed-case airline names with cabin
//! suffixes, day-first dates, arrival times that carry a trailing date when
//! the flight lands the next day, `"2h 50m"` durations and `"1 stop"` text.
//! A small share of rows is dirty (the `"5m"` duration sentinel, missing
//! fields, exact duplicates) so every cleaning step has work to do.
//!
//! Prices follow a simple additive model of airline, stops, duration and
//! route plus noise, which gives the forest a learnable signal.

use crate::error::{FareError, Result};
use crate::frame::Frame;
use crate::schema::RawRecord;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const AIRLINES: &[(&str, f64, f64)] = &[
    // (name, weight, price offset)
    ("Jet Airways", 36.0, 3500.0),
    ("IndiGo", 19.0, 0.0),
    ("Air India", 16.0, 2500.0),
    ("Multiple carriers", 11.0, 4000.0),
    ("SpiceJet", 8.0, -500.0),
    ("Vistara", 4.5, 2800.0),
    ("Air Asia", 3.0, -300.0),
    ("GoAir", 1.8, 500.0),
    ("Jet Airways Business", 0.3, 9000.0),
    ("Multiple carriers Premium economy", 0.3, 5000.0),
    ("Vistara Premium economy", 0.1, 4000.0),
    ("Trujet", 0.1, -1000.0),
];

const ROUTES: &[(&str, &str, &[&str], f64, f64)] = &[
    // (source, destination, route codes, weight, price offset)
    ("Delhi", "Cochin", &["DEL", "BOM", "COK"], 42.0, 2500.0),
    ("Kolkata", "Banglore", &["CCU", "BOM", "BLR"], 27.0, 1800.0),
    ("Banglore", "Delhi", &["BLR", "DEL"], 12.0, 0.0),
    ("Banglore", "New Delhi", &["BLR", "BOM", "DEL"], 9.0, 3000.0),
    ("Mumbai", "Hyderabad", &["BOM", "HYD"], 6.5, -1500.0),
    ("Chennai", "Kolkata", &["MAA", "CCU"], 3.5, -1000.0),
];

const STOPS: &[(u32, f64)] = &[(0, 33.0), (1, 53.0), (2, 13.0), (3, 0.8), (4, 0.2)];

const ADDITIONAL_INFO: &[(&str, f64)] = &[
    ("No info", 78.0),
    ("In-flight meal not included", 18.0),
    ("No check-in baggage included", 3.0),
    ("1 Long layover", 0.5),
    ("Change airports", 0.5),
];

/// Seeded source of raw rows; the same seed always yields the same rows.
#[derive(Debug, Clone)]
pub struct SyntheticFlights {
    seed: u64,
    dirty_share: f64,
}

impl SyntheticFlights {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            dirty_share: 0.03,
        }
    }

    /// Share of rows that are corrupt, incomplete or duplicated.
    pub fn with_dirty_share(mut self, share: f64) -> Self {
        self.dirty_share = share.clamp(0.0, 1.0);
        self
    }

    /// `n` raw rows, dirt included.
    pub fn records(&self, n: usize) -> Result<Vec<RawRecord>> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut records: Vec<RawRecord> = Vec::with_capacity(n);

        while records.len() < n {
            let mut record = clean_row(&mut rng)?;
            if rng.gen_bool(self.dirty_share) {
                match rng.gen_range(0..3) {
                    0 => record.duration = Some("5m".to_string()),
                    1 => blank_random_field(&mut record, &mut rng),
                    _ => {
                        if let Some(previous) = records.last() {
                            record = previous.clone();
                        }
                    }
                }
            }
            records.push(record);
        }
        Ok(records)
    }

    /// `n` raw rows as a frame, with the input CSV's column names.
    pub fn frame(&self, n: usize) -> Result<Frame> {
        Frame::from_raw_records(&self.records(n)?)
    }
}

fn weighted<'a, T>(items: &'a [T], weight: impl Fn(&T) -> f64, rng: &mut ChaCha8Rng) -> Result<&'a T> {
    items
        .choose_weighted(rng, weight)
        .map_err(|e| FareError::Value(format!("weighted choice failed: {}", e)))
}

fn clean_row(rng: &mut ChaCha8Rng) -> Result<RawRecord> {
    let &(airline, _, airline_offset) = weighted(AIRLINES, |a| a.1, rng)?;
    let &(source, destination, codes, _, route_offset) = weighted(ROUTES, |r| r.3, rng)?;
    let &(stops, _) = weighted(STOPS, |s| s.1, rng)?;
    let &(info, _) = weighted(ADDITIONAL_INFO, |i| i.1, rng)?;

    let start = NaiveDate::from_ymd_opt(2019, 3, 1)
        .ok_or_else(|| FareError::Value("invalid start date".to_string()))?;
    let date = start + Duration::days(rng.gen_range(0..120));

    let duration_minute: u32 = match stops {
        0 => rng.gen_range(15..40) * 5,
        1 => rng.gen_range(60..240) * 5,
        _ => rng.gen_range(120..360) * 5,
    };
    let dep = NaiveTime::from_hms_opt(rng.gen_range(0..24), rng.gen_range(0..12) * 5, 0)
        .ok_or_else(|| FareError::Value("invalid departure time".to_string()))?;
    let (arrival, wrapped_secs) = dep.overflowing_add_signed(Duration::minutes(duration_minute as i64));
    let arrival_text = if wrapped_secs > 0 {
        let arrival_date = date + Duration::seconds(wrapped_secs);
        format!("{:02}:{:02} {}", arrival.hour(), arrival.minute(), arrival_date.format("%d %b"))
    } else {
        format!("{:02}:{:02}", arrival.hour(), arrival.minute())
    };

    let route = if stops == 0 {
        format!("{} → {}", codes[0], codes[codes.len() - 1])
    } else {
        codes.join(" → ")
    };

    let noise: f64 = rng.gen_range(-1200.0..1200.0);
    let price = (4000.0
        + airline_offset
        + route_offset
        + 2200.0 * stops as f64
        + 1.5 * duration_minute as f64
        + if date.month() == 3 { 1500.0 } else { 0.0 }
        + noise)
        .max(1759.0)
        .round();

    Ok(RawRecord {
        airline: Some(airline.to_string()),
        date_of_journey: Some(date.format("%d/%m/%Y").to_string()),
        source: Some(source.to_string()),
        destination: Some(destination.to_string()),
        route: Some(route),
        dep_time: Some(format!("{:02}:{:02}", dep.hour(), dep.minute())),
        arrival_time: Some(arrival_text),
        duration: Some(duration_text(duration_minute)),
        total_stops: Some(stops_text(stops)),
        additional_info: Some(info.to_string()),
        price: Some(price),
    })
}

fn duration_text(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

fn stops_text(stops: u32) -> String {
    match stops {
        0 => "non-stop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{} stops", n),
    }
}

fn blank_random_field(record: &mut RawRecord, rng: &mut ChaCha8Rng) {
    let field = match rng.gen_range(0..4) {
        0 => &mut record.route,
        1 => &mut record.total_stops,
        2 => &mut record.airline,
        _ => &mut record.arrival_time,
    };
    *field = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_rows() {
        let a = SyntheticFlights::new(11).records(200).unwrap();
        let b = SyntheticFlights::new(11).records(200).unwrap();
        let c = SyntheticFlights::new(12).records(200).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_rows_look_raw() {
        let records = SyntheticFlights::new(3).with_dirty_share(0.0).records(300).unwrap();
        assert_eq!(records.len(), 300);
        for r in &records {
            let date = r.date_of_journey.as_deref().unwrap();
            assert!(NaiveDate::parse_from_str(date, "%d/%m/%Y").is_ok(), "{}", date);
            let duration = r.duration.as_deref().unwrap();
            assert!(duration.starts_with(|c: char| c.is_ascii_digit()));
            assert!(duration.contains('h'));
            assert!(r.price.unwrap() > 0.0);
        }
        assert!(records
            .iter()
            .any(|r| r.arrival_time.as_deref().unwrap().len() > 5));
    }

    #[test]
    fn test_dirty_rows_present() {
        let records = SyntheticFlights::new(5).with_dirty_share(0.5).records(200).unwrap();
        assert!(records.iter().any(|r| r.duration.as_deref() == Some("5m")));
        assert!(records.iter().any(|r| r.text_fields().iter().any(|f| f.is_none())));
    }

    #[test]
    fn test_frame_has_input_columns() {
        let frame = SyntheticFlights::new(1).frame(50).unwrap();
        assert_eq!(frame.n_rows(), 50);
        assert_eq!(frame.column_names(), &RawRecord::HEADERS[..]);
    }
}
