// ==========================================
// Production Scheduling Engine - capacity model
// ==========================================
// Pure value math: time budgets and utilization/efficiency ratios.
// Planned utilization is clamped at 100 (an overfull plan is the
// conflict detector's signal, not an inflated number here); realized
// efficiency is clamped at 200 (a >2x claim is a data anomaly, capped
// rather than trusted).
// ==========================================

/// Planned utilization clamp.
pub const PLANNED_UTILIZATION_CAP: f64 = 100.0;

/// Realized efficiency clamp.
pub const REALIZED_EFFICIENCY_CAP: f64 = 200.0;

/// Planned load as a percentage of available capacity, clamped to 100.
/// Zero capacity reports 0.
pub fn planned_utilization(planned_minutes: i64, capacity_minutes: i64) -> f64 {
    if capacity_minutes <= 0 {
        return 0.0;
    }
    let ratio = planned_minutes as f64 / capacity_minutes as f64 * 100.0;
    ratio.min(PLANNED_UTILIZATION_CAP)
}

/// Realized efficiency: planned time over actual elapsed time, as a
/// percentage clamped to 200. Zero actual time reports 0, not a
/// division error.
pub fn realized_efficiency(avg_planned_minutes: f64, avg_actual_minutes: f64) -> f64 {
    if avg_actual_minutes <= 0.0 {
        return 0.0;
    }
    let ratio = avg_planned_minutes / avg_actual_minutes * 100.0;
    ratio.min(REALIZED_EFFICIENCY_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planned_utilization_clamps_at_100() {
        // 5000 planned minutes against 480 available is reported as
        // exactly 100, never 1041.67.
        assert_eq!(planned_utilization(5000, 480), 100.0);
    }

    #[test]
    fn test_planned_utilization_below_cap() {
        assert_eq!(planned_utilization(240, 480), 50.0);
        assert_eq!(planned_utilization(0, 480), 0.0);
    }

    #[test]
    fn test_planned_utilization_zero_capacity() {
        assert_eq!(planned_utilization(100, 0), 0.0);
    }

    #[test]
    fn test_realized_efficiency_clamps_at_200() {
        assert_eq!(realized_efficiency(300.0, 100.0), 200.0);
        assert_eq!(realized_efficiency(150.0, 100.0), 150.0);
    }

    #[test]
    fn test_realized_efficiency_zero_actual_reports_zero() {
        assert_eq!(realized_efficiency(100.0, 0.0), 0.0);
    }
}
