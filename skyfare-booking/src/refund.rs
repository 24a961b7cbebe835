use chrono::{DateTime, Utc};

/// Refund percentage by time remaining until departure:
/// more than 72 hours 100 %, 24-72 hours 75 %, 2-24 hours 50 %, under
/// 2 hours (or already departed) nothing.
pub fn refund_percentage(departure: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let hours = (departure - now).num_hours();
    if hours > 72 {
        100
    } else if hours >= 24 {
        75
    } else if hours >= 2 {
        50
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn refund_tiers() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(refund_percentage(now + Duration::hours(100), now), 100);
        assert_eq!(refund_percentage(now + Duration::hours(48), now), 75);
        assert_eq!(refund_percentage(now + Duration::hours(12), now), 50);
        assert_eq!(refund_percentage(now + Duration::hours(1), now), 0);
        assert_eq!(refund_percentage(now - Duration::hours(5), now), 0);
    }
}
