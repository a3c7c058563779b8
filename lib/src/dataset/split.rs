//! Seeded random splits.
//!
//! A split shuffles row indices with `ChaCha8Rng` and holds out the first
//! `ceil(test_size * n)` of them. The three-way split applies this twice
//! with the same seed: first `test`, then `validation` out of the rest, so
//! the defaults (0.2, 0.2) give 64 % / 16 % / 20 %.

use super::save_records;
use crate::config::SplitConfig;
use crate::error::{FareError, Result};
use crate::schema::CleanedRecord;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use tracing::info;

/// A two-way split.
#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

/// Train / validation / test split.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreeWaySplit<T> {
    pub train: Vec<T>,
    pub validation: Vec<T>,
    pub test: Vec<T>,
}

impl<T> ThreeWaySplit<T> {
    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shuffle `items` with `seed` and hold out `ceil(test_size * n)` of them.
///
/// Both sides are non-empty, so at least two items are required.
pub fn train_test_split<T: Clone>(items: &[T], test_size: f64, seed: u64) -> Result<Split<T>> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(FareError::Value(format!(
            "test_size must be within (0, 1), got {}",
            test_size
        )));
    }
    let n = items.len();
    if n < 2 {
        return Err(FareError::Value(format!(
            "cannot split {} rows into two non-empty parts",
            n
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));

    let n_test = ((test_size * n as f64).ceil() as usize).clamp(1, n - 1);
    let (test_indices, train_indices) = indices.split_at(n_test);

    Ok(Split {
        train: train_indices.iter().map(|&i| items[i].clone()).collect(),
        test: test_indices.iter().map(|&i| items[i].clone()).collect(),
    })
}

/// Split into train, validation and test with two sequential shuffles.
pub fn three_way_split<T: Clone>(items: &[T], config: &SplitConfig) -> Result<ThreeWaySplit<T>> {
    config.validate()?;
    let outer = train_test_split(items, config.test_size, config.seed)?;
    let inner = train_test_split(&outer.train, config.validation_size, config.seed)?;
    Ok(ThreeWaySplit {
        train: inner.train,
        validation: inner.test,
        test: outer.test,
    })
}

/// Split cleaned records and write `train.csv`, `validation.csv` and
/// `test.csv` under `dir`.
pub fn split_and_save(
    records: &[CleanedRecord],
    config: &SplitConfig,
    dir: impl AsRef<Path>,
) -> Result<ThreeWaySplit<CleanedRecord>> {
    let dir = dir.as_ref();
    let split = three_way_split(records, config)?;

    for (name, part) in [
        ("train.csv", &split.train),
        ("validation.csv", &split.validation),
        ("test.csv", &split.test),
    ] {
        save_records(dir.join(name), part)?;
    }
    info!(
        dir = %dir.display(),
        train = split.train.len(),
        validation = split.validation.len(),
        test = split.test.len(),
        "saved splits"
    );
    Ok(split)
}
