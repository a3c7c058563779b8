use serde::Serialize;
use std::hint::black_box;
use std::time::{Duration, Instant};

/// Timer for measuring elapsed time across one or more intervals.
#[derive(Debug, Default)]
pub struct Timer {
    start: Option<Instant>,
    total: Duration,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    /// Stop the timer and add the elapsed time to the total.
    pub fn stop(&mut self) -> Duration {
        match self.start.take() {
            Some(start) => {
                let elapsed = start.elapsed();
                self.total += elapsed;
                elapsed
            }
            None => Duration::ZERO,
        }
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn total_ms(&self) -> f64 {
        self.total.as_secs_f64() * 1000.0
    }
}

/// Run a function and measure its execution time.
pub fn time_fn<F, R>(f: F) -> (R, Duration)
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}

/// Run `f` `warmup` times unmeasured, then `iterations` times measured.
pub fn benchmark_with_warmup<F, R>(warmup: usize, iterations: usize, mut f: F) -> Option<BenchmarkStats>
where
    F: FnMut() -> R,
{
    for _ in 0..warmup {
        black_box(f());
    }
    let times = (0..iterations)
        .map(|_| time_fn(|| black_box(f())).1.as_secs_f64() * 1000.0)
        .collect();
    BenchmarkStats::from_times(times)
}

/// Latency statistics in milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkStats {
    pub iterations: usize,
    pub mean_ms: f64,
    pub std_dev_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

impl BenchmarkStats {
    /// `None` for an empty sample.
    pub fn from_times(mut times: Vec<f64>) -> Option<Self> {
        if times.is_empty() {
            return None;
        }
        times.sort_by(|a, b| a.total_cmp(b));

        let n = times.len();
        let mean = times.iter().sum::<f64>() / n as f64;
        let variance = times.iter().map(|&t| (t - mean).powi(2)).sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (times[n / 2 - 1] + times[n / 2]) / 2.0
        } else {
            times[n / 2]
        };
        let percentile = |p: f64| times[((n as f64 * p) as usize).min(n - 1)];

        Some(Self {
            iterations: n,
            mean_ms: mean,
            std_dev_ms: variance.sqrt(),
            min_ms: times[0],
            max_ms: times[n - 1],
            median_ms: median,
            p95_ms: percentile(0.95),
            p99_ms: percentile(0.99),
        })
    }
}
