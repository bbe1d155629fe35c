//! Rolling high — maximum close over a trailing window.
//!
//! Uses a monotonic deque of indices so each close is pushed and popped at
//! most once. The value can fall when an old high leaves the window.
//! Lookback: period - 1.

use std::collections::VecDeque;

use super::Indicator;

#[derive(Debug, Clone)]
pub struct RollingHigh {
    period: usize,
    name: String,
}

impl RollingHigh {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("rolling_high_{period}"),
        }
    }
}

impl Indicator for RollingHigh {
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

        // Indices of finite closes, values strictly decreasing front to back.
        let mut deque: VecDeque<usize> = VecDeque::with_capacity(self.period);
        let mut last_invalid: Option<usize> = None;

        for (i, &close) in closes.iter().enumerate() {
            if close.is_finite() {
                while deque.back().is_some_and(|&j| closes[j] <= close) {
                    deque.pop_back();
                }
                deque.push_back(i);
            } else {
                last_invalid = Some(i);
            }

            if i + 1 < self.period {
                continue;
            }

            let window_start = i + 1 - self.period;
            while deque.front().is_some_and(|&j| j < window_start) {
                deque.pop_front();
            }

            if last_invalid.is_some_and(|j| j >= window_start) {
                continue;
            }

            result[i] = deque.front().map(|&j| closes[j]);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_high_basic() {
        let closes = [5.0, 7.0, 6.0, 4.0, 3.0, 8.0];
        let result = RollingHigh::new(3).compute(&closes);
        assert_eq!(
            result,
            vec![None, None, Some(7.0), Some(7.0), Some(6.0), Some(8.0)]
        );
    }

    #[test]
    fn rolling_high_drops_old_highs() {
        let closes = [10.0, 1.0, 1.0, 1.0];
        let result = RollingHigh::new(2).compute(&closes);
        assert_eq!(result[1], Some(10.0));
        assert_eq!(result[2], Some(1.0));
    }

    #[test]
    fn rolling_high_equal_values() {
        let closes = [3.0, 3.0, 3.0, 3.0];
        let result = RollingHigh::new(2).compute(&closes);
        assert_eq!(result, vec![None, Some(3.0), Some(3.0), Some(3.0)]);
    }

    #[test]
    fn rolling_high_nan_in_window() {
        let closes = [1.0, f64::NAN, 2.0, 3.0, 4.0];
        let result = RollingHigh::new(2).compute(&closes);
        assert!(result[1].is_none());
        assert!(result[2].is_none());
        assert_eq!(result[3], Some(3.0));
        assert_eq!(result[4], Some(4.0));
    }

    #[test]
    fn rolling_high_too_few_bars() {
        let result = RollingHigh::new(20).compute(&[1.0; 19]);
        assert!(result.iter().all(Option::is_none));
    }

    #[test]
    fn rolling_high_lookback() {
        assert_eq!(RollingHigh::new(100).lookback(), 99);
    }
}
