//! Streaming mean/variance accumulator (Welford).
//!
//! Count, mean, and the sum of squared deviations are updated together
//! so the population standard deviation can be read at any point
//! without rescanning.

use serde::{Deserialize, Serialize};

/// Running population statistics for one numeric field
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    /// Sum of squared differences from the mean
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore persisted state
    pub fn from_parts(count: u64, mean: f64, m2: f64) -> Self {
        Self { count, mean, m2 }
    }

    /// Two-pass computation over a complete value set. This is the
    /// reference the streaming path must agree with.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        // divide before adding so large same-sign values cannot overflow the sum
        let mean = values.iter().fold(0.0, |acc, v| acc + v / n);
        let m2 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        Self {
            count: values.len() as u64,
            mean,
            m2,
        }
    }

    /// Fold one value in.
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean, 0 when empty
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sum of squared deviations from the mean
    pub fn sum_of_squares(&self) -> f64 {
        self.m2
    }

    /// Population variance (divides by N), 0 when empty
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    /// Population standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// False once mean or the squared-deviation sum left the f64 range
    pub fn is_finite(&self) -> bool {
        self.mean.is_finite() && self.m2.is_finite()
    }

    /// Agreement within a relative tolerance (absolute near zero).
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.count == other.count
            && close(self.mean, other.mean, tolerance)
            && close(self.std_dev(), other.std_dev(), tolerance)
    }
}

fn close(a: f64, b: f64, tolerance: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= tolerance * scale
}
