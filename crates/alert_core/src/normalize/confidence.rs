/// Resolve a producer confidence onto the 0-100 scale.
///
/// Values in `(0, 1]` are fractions and get scaled by 100; everything else is taken as already on
/// the percent scale. `0` stays `0`. Values above 100 are rounded but not clamped so that upstream
/// data-quality problems stay visible.
pub fn normalize_confidence(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    if value > 0.0 && value <= 1.0 {
        (value * 100.0).round() as i64
    } else {
        value.round() as i64
    }
}
