//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

use crate::constants::{METRIC_MAX, METRIC_MIN};

/// Clamp a gauge value into the metric range, treating NaN as the floor.
#[must_use]
pub fn clamp_metric(value: f64) -> f64 {
    if value.is_nan() {
        return METRIC_MIN;
    }
    value.clamp(METRIC_MIN, METRIC_MAX)
}

/// Convert a collection length to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(count: usize) -> f64 {
    cast::<usize, f64>(count).unwrap_or(0.0)
}

/// Round a value to one decimal place, the precision gauges are displayed at.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 10.0).round() / 10.0
}
