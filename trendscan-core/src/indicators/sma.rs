//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    /// A zero period is accepted and yields no values.
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let n = closes.len();
        let mut result = vec![None; n];

        if self.period == 0 || n < self.period {
            return result;
        }

        // Running sum of the finite closes in the window plus a count of the
        // non-finite ones. The mean is defined only when that count is zero.
        let mut sum = 0.0;
        let mut invalid = 0usize;

        for i in 0..n {
            let entering = closes[i];
            if entering.is_finite() {
                sum += entering;
            } else {
                invalid += 1;
            }

            if i >= self.period {
                let leaving = closes[i - self.period];
                if leaving.is_finite() {
                    sum -= leaving;
                } else {
                    invalid -= 1;
                }
            }

            if i + 1 >= self.period && invalid == 0 {
                result[i] = Some(sum / self.period as f64);
            }
        }

        result
    }
}
