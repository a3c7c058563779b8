//! Train on a CSV file, save the artifact, predict from it.

use flight_fare::cleaning::Cleaner;
use flight_fare::config::PipelineConfig;
use flight_fare::dataset::{load_frame, load_records, split_and_save};
use flight_fare::model::ForestConfig;
use flight_fare::predictor::{predict_from_path, PredictionQuery, Predictor};
use flight_fare::schema::RawRecord;
use flight_fare::synthetic::SyntheticFlights;
use flight_fare::{train, FareError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn write_raw_csv(path: &Path, n: usize, seed: u64) {
    let records = SyntheticFlights::new(seed).records(n).unwrap();
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer.write_record(RawRecord::HEADERS).unwrap();
    for record in &records {
        let mut row: Vec<String> = record
            .text_fields()
            .iter()
            .map(|f| (*f).clone().unwrap_or_default())
            .collect();
        row.push(record.price.map(|p| p.to_string()).unwrap_or_default());
        writer.write_record(&row).unwrap();
    }
    writer.flush().unwrap();
}

fn config_in(dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig {
        model: ForestConfig {
            n_trees: 20,
            ..ForestConfig::default()
        },
        ..PipelineConfig::default()
    };
    config.data.input_path = dir.join("flight_price.csv");
    config.data.model_path = dir.join("models").join("random_forest.bin");
    config.data.split_dir = dir.join("splits");
    config
}

#[test]
fn train_save_and_predict_sample_query() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_raw_csv(&config.data.input_path, 800, 42);

    let report = train(&config).unwrap();
    assert!(config.data.model_path.exists());
    assert!(report.evaluation("test").unwrap().rmse.is_finite());

    let predictor = Predictor::load(&config.data.model_path).unwrap();
    let price = predictor.predict(&PredictionQuery::sample()).unwrap();
    assert!(price.is_finite());
    assert!(price > 0.0);

    let reloaded = predict_from_path(&config.data.model_path, &PredictionQuery::sample()).unwrap();
    assert_eq!(reloaded, price);
}

#[test]
fn predictor_is_shareable_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_raw_csv(&config.data.input_path, 400, 7);
    train(&config).unwrap();

    let predictor = Predictor::load(&config.data.model_path).unwrap();
    let expected = predictor.predict(&PredictionQuery::sample()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let predictor = predictor.clone();
            std::thread::spawn(move || predictor.predict(&PredictionQuery::sample()).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
    assert_eq!(Arc::strong_count(predictor.artifact()), 1);
}

#[test]
fn json_query_with_raw_text_values() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_raw_csv(&config.data.input_path, 400, 3);
    train(&config).unwrap();

    let predictor = Predictor::load(&config.data.model_path).unwrap();
    let price = predictor
        .predict_json(
            r#"{
                "airline": "IndiGo",
                "date_of_journey": "24/03/2019",
                "source": "Banglore",
                "destination": "New Delhi",
                "dep_time": "22:20",
                "arrival_time": "01:10 22 Mar",
                "duration_minute": "2h 50m",
                "total_stops": "non-stop"
            }"#,
        )
        .unwrap();
    assert!(price.is_finite());

    let err = predictor
        .predict_json(r#"{"airline": "IndiGo", "source": "Delhi"}"#)
        .unwrap_err();
    assert!(matches!(err, FareError::Schema(_)));
}

#[test]
fn missing_artifact_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("missing.bin");
    let err = predict_from_path(&path, &PredictionQuery::sample()).unwrap_err();
    assert!(matches!(err, FareError::NotFound(p) if p == path));
}

#[test]
fn split_files_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_raw_csv(&config.data.input_path, 500, 11);

    let records = Cleaner::new(config.cleaning.clone())
        .clean_records(load_frame(&config.data.input_path).unwrap())
        .unwrap();

    let first = split_and_save(&records, &config.split, dir.path().join("a")).unwrap();
    let second = split_and_save(&records, &config.split, dir.path().join("b")).unwrap();
    assert_eq!(first, second);

    for name in ["train.csv", "validation.csv", "test.csv"] {
        let a = std::fs::read(dir.path().join("a").join(name)).unwrap();
        let b = std::fs::read(dir.path().join("b").join(name)).unwrap();
        assert_eq!(a, b, "{} differs", name);
    }
    assert_eq!(load_records(dir.path().join("a").join("test.csv")).unwrap(), first.test);
    assert_eq!(first.test.len(), (records.len() as f64 * 0.2).ceil() as usize);
}

#[test]
fn config_file_drives_training() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("flights.csv");
    let model = dir.path().join("out").join("model.bin");
    write_raw_csv(&input, 300, 5);

    let toml = format!(
        "[data]\ninput_path = {:?}\nmodel_path = {:?}\n\n[model]\nn_trees = 5\nmax_depth = 8\n",
        input.display().to_string(),
        model.display().to_string()
    );
    let config_path = dir.path().join("flight_fare.toml");
    std::fs::write(&config_path, toml).unwrap();

    let config = PipelineConfig::from_file(&config_path).unwrap();
    assert_eq!(config.model.n_trees, 5);
    let report = train(&config).unwrap();
    assert_eq!(report.artifact.estimator.n_trees(), 5);
    assert!(model.exists());
}
