use serde::{Deserialize, Serialize};

/// Running population statistics (Welford's algorithm).
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub n_vals: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
        }
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    /// Report the population mean and standard deviation (divided by n).
    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            n_vals: self.n_vals,
            mean: if self.n_vals > 0 { self.mean } else { f64::NAN },
            std_dev: if self.n_vals > 0 {
                (self.diff_2_sum / self.n_vals as f64).sqrt()
            } else {
                f64::NAN
            },
        }
    }
}

impl FromIterator<f64> for Accumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Accumulator::new();
        for val in iter {
            acc.add(val);
        }
        acc
    }
}

pub fn compute_mean(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return f64::NAN;
    }
    vals.iter().sum::<f64>() / vals.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_population_std_dev() {
        let acc: Accumulator = [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().collect();
        let report = acc.report();

        assert_eq!(report.n_vals, 5);
        assert!((report.mean - 3.0).abs() < 1e-12);
        assert!((report.std_dev - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_accumulator_single_value() {
        let acc: Accumulator = [7.5].into_iter().collect();
        let report = acc.report();

        assert_eq!(report.mean, 7.5);
        assert_eq!(report.std_dev, 0.0);
    }

    #[test]
    fn test_accumulator_empty() {
        let report = Accumulator::new().report();

        assert_eq!(report.n_vals, 0);
        assert!(report.mean.is_nan());
        assert!(report.std_dev.is_nan());
    }

    #[test]
    fn test_compute_mean() {
        assert_eq!(compute_mean(&[2.0, 4.0, 9.0]), 5.0);
        assert!(compute_mean(&[]).is_nan());
    }
}
