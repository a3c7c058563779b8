//! Literal cleaning and feature scenarios on a hand-written input file.

use chrono::{NaiveDate, NaiveTime};
use flight_fare::cleaning::{Cleaner, CleaningConfig, CleaningStep, ErrorPolicy};
use flight_fare::features::{is_direct_flight, is_north, PartOfDay, PartOfDayBounds, NORTH_CITIES};
use flight_fare::frame::Frame;
use flight_fare::schema::CleanedRecord;
use flight_fare::FareError;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

const INPUT: &str = "\
Airline,Date_of_Journey,Source,Destination,Route,Dep_Time,Arrival_Time,Duration,Total_Stops,Additional_Info,Price
Jet Airways Business,01/03/2019,Banglore,New Delhi,BLR → BOM → DEL,05:45,10:45,5h,1 stop,No info,79512
Jet Airways,9/06/2019,Delhi,Cochin,DEL → LKO → BOM → COK,09:25,04:25 10 Jun,19h,2 stops,No info,13882
Jet Airways,9/06/2019,Delhi,Cochin,DEL → LKO → BOM → COK,09:25,04:25 10 Jun,19h,2 stops,No info,13882
IndiGo,24/03/2019,Banglore,New Delhi,BLR → DEL,22:20,01:10 22 Mar,2h 50m,non-stop,No info,3897
Air India,6/03/2019,Mumbai,Hyderabad,BOM → GOI → PNQ → HYD,16:50,16:55,5m,2 stops,No info,17327
SpiceJet,,Kolkata,Banglore,CCU → BLR,09:00,11:25,2h 25m,non-stop,No info,3873
 Vistara Premium economy ,12/05/2019,Chennai,Kolkata,MAA → CCU,07:05,09:20,2h 15m,non-stop,In-flight meal not included,11793
";

fn cleaned() -> Vec<CleanedRecord> {
    let frame = Frame::from_csv_reader(INPUT.as_bytes()).unwrap();
    Cleaner::default().clean_records(frame).unwrap()
}

#[test]
fn cleaning_drops_corrupt_duplicate_and_null_rows() {
    let records = cleaned();
    let airlines: Vec<&str> = records.iter().map(|r| r.airline.as_str()).collect();
    assert_eq!(airlines, vec!["Jet Airways", "Jet Airways", "Indigo", "Vistara"]);
}

#[test]
fn cleaning_normalizes_fields() {
    let records = cleaned();

    assert_eq!(
        records[1],
        CleanedRecord {
            airline: "Jet Airways".to_string(),
            date_of_journey: NaiveDate::from_ymd_opt(2019, 6, 9).unwrap(),
            source: "Delhi".to_string(),
            destination: "Cochin".to_string(),
            dep_time: NaiveTime::from_hms_opt(9, 25, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(4, 25, 0).unwrap(),
            duration_minute: 1140,
            total_stops: 2,
            additional_info: "no info".to_string(),
            price: Some(13882.0),
        }
    );
    assert_eq!(records[2].duration_minute, 170);
    assert_eq!(records[2].total_stops, 0);
    assert_eq!(records[3].additional_info, "in-flight meal not included");
}

#[test]
fn cleaning_reports_each_step() {
    let frame = Frame::from_csv_reader(INPUT.as_bytes()).unwrap();
    let outcome = Cleaner::default().clean(frame).unwrap();

    assert_eq!(outcome.reports.len(), CleaningStep::ALL.len());
    assert_eq!(outcome.reports[0].step, CleaningStep::DropCorruptRows);
    assert_eq!(outcome.reports[0].rows_dropped(), 1);
    assert_eq!(outcome.reports[1].rows_dropped(), 1);
    assert_eq!(outcome.reports[2].rows_dropped(), 1);
    assert_eq!(outcome.rows_dropped(), 3);
    assert_eq!(outcome.failed_steps().count(), 0);
}

#[test]
fn malformed_duration_fails_fast_or_reports() {
    let input = INPUT.replace("2h 15m", "two hours");

    let fail_fast = Cleaner::new(CleaningConfig {
        policy: ErrorPolicy::FailFast,
        ..CleaningConfig::default()
    });
    let err = fail_fast
        .clean(Frame::from_csv_reader(input.as_bytes()).unwrap())
        .unwrap_err();
    assert!(matches!(err, FareError::Parse { .. }));

    let outcome = Cleaner::default()
        .clean(Frame::from_csv_reader(input.as_bytes()).unwrap())
        .unwrap();
    let failed: Vec<CleaningStep> = outcome.failed_steps().map(|r| r.step).collect();
    assert_eq!(failed, vec![CleaningStep::ParseDuration]);
    assert!(matches!(outcome.into_records(), Err(FareError::Schema(_))));
}

#[test]
fn derived_flags() {
    let north: BTreeSet<String> = NORTH_CITIES.iter().map(|c| c.to_string()).collect();
    assert!(is_north("Delhi", &north));
    assert!(!is_north("Cochin", &north));

    let flags: Vec<bool> = [0, 1, 2, 3].into_iter().map(is_direct_flight).collect();
    assert_eq!(flags, vec![true, false, false, false]);

    let bounds = PartOfDayBounds::default();
    assert_eq!(bounds.classify(0), PartOfDay::Start);
    assert_eq!(bounds.classify(8), PartOfDay::Mid);
    assert_eq!(bounds.classify(16), PartOfDay::End);
    assert_eq!(bounds.classify(23), PartOfDay::End);
}

#[test]
fn cleaned_records_clean_to_themselves() {
    let records = cleaned();
    let raw: Vec<_> = records.iter().map(CleanedRecord::to_raw).collect();
    let again = Cleaner::default()
        .clean_records(Frame::from_raw_records(&raw).unwrap())
        .unwrap();
    assert_eq!(again, records);
}
