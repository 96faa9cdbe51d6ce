// ==========================================
// Production Scheduling Engine - working-day calendar
// ==========================================
// Monday-Friday working weeks; no holiday table. Used to size the
// conflict detector's scheduling horizon.
// ==========================================

use chrono::{Datelike, NaiveDate, Weekday};

/// Monday through Friday.
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekend_detection() {
        // 2024-01-06 is a Saturday
        assert!(is_working_day(date(2024, 1, 5)));
        assert!(!is_working_day(date(2024, 1, 6)));
        assert!(!is_working_day(date(2024, 1, 7)));
        assert!(is_working_day(date(2024, 1, 8)));
    }

}
