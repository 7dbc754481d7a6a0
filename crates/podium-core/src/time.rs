use chrono::{DateTime, Days, Utc};

/// Compact date label used in snapshot keys, e.g. `20260821`.
pub fn day_label(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d").to_string()
}

/// Label for the day before `now`. Snapshots are always named after the
/// previous day.
pub fn yesterday_label(now: DateTime<Utc>) -> String {
    let yesterday = now.checked_sub_days(Days::new(1)).unwrap_or(now);
    day_label(yesterday)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn labels_use_compact_date_format() {
        let now = Utc.with_ymd_and_hms(2026, 8, 21, 12, 0, 0).unwrap();
        assert_eq!(day_label(now), "20260821");
        assert_eq!(yesterday_label(now), "20260820");
    }

    #[test]
    fn yesterday_crosses_month_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 30, 0).unwrap();
        assert_eq!(yesterday_label(now), "20260228");
    }

    #[test]
    fn yesterday_crosses_year_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap();
        assert_eq!(yesterday_label(now), "20251231");
    }
}
