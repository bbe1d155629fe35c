//! Rate of Change (ROC).
//!
//! Percentage price change over N bars.
//! ROC[t] = (close[t] - close[t-period]) / close[t-period] * 100
//! Lookback: period.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
    name: String,
}

impl Roc {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("roc_{period}"),
        }
    }
}

impl Indicator for Roc {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let n = closes.len();
        let mut result = vec![None; n];

        if self.period == 0 {
            return result;
        }

        for i in self.period..n {
            let prev = closes[i - self.period];
            let curr = closes[i];
            if prev.is_finite() && curr.is_finite() && prev != 0.0 {
                result[i] = Some((curr - prev) / prev * 100.0);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{aroc_window_days, assert_approx, DEFAULT_EPSILON};

    #[test]
    fn four_week_roc_looks_back_twenty_sessions() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let period = aroc_window_days(4);
        assert_eq!(period, 20);

        let result = Roc::new(period).compute(&closes);
        assert!(result[..20].iter().all(Option::is_none));
        // Bar 20 against bar 0: 120 vs 100.
        assert_approx(result[20].unwrap(), 20.0, DEFAULT_EPSILON);
        // Bar 24 against bar 4: 124 vs 104.
        assert_approx(result[24].unwrap(), 20.0 / 104.0 * 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn year_roc_needs_one_bar_past_the_window() {
        let mut closes = vec![60.0; 261];
        closes[0] = 50.0;
        closes[260] = 75.0;
        let result = Roc::new(aroc_window_days(52)).compute(&closes);
        assert!(result[259].is_none());
        assert_approx(result[260].unwrap(), 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn roc_negative() {
        let result = Roc::new(1).compute(&[100.0, 90.0]);
        assert_approx(result[1].unwrap(), -10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn roc_nan_propagation() {
        let result = Roc::new(1).compute(&[100.0, f64::NAN, 120.0]);
        assert!(result[1].is_none()); // curr NaN
        assert!(result[2].is_none()); // prev NaN
    }

    #[test]
    fn roc_zero_base_is_undefined() {
        let result = Roc::new(1).compute(&[0.0, 5.0]);
        assert!(result[1].is_none());
    }

    #[test]
    fn roc_flat_series_is_zero() {
        let result = Roc::new(3).compute(&[50.0; 6]);
        assert_eq!(result[3], Some(0.0));
        assert_eq!(result[5], Some(0.0));
    }

    #[test]
    fn roc_lookback() {
        assert_eq!(Roc::new(14).lookback(), 14);
    }
}
