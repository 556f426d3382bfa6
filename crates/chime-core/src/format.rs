//! Human-readable timestamp formatting for list rows and notifications.

use chrono::NaiveDateTime;

use crate::schedule::{TimeStatus, time_status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeFormat {
    /// DD/MM/YYYY HH:MM
    Full,
    DateOnly,
    TimeOnly,
}

#[must_use]
pub fn format_date_time(dt: NaiveDateTime, format: DateTimeFormat) -> String {
    match format {
        DateTimeFormat::Full => dt.format("%d/%m/%Y %H:%M").to_string(),
        DateTimeFormat::DateOnly => dt.format("%d/%m/%Y").to_string(),
        DateTimeFormat::TimeOnly => dt.format("%H:%M").to_string(),
    }
}

/// "in 5 minutes" / "2 hours ago" style phrasing, falling back to the full
/// timestamp beyond a week either way.
#[must_use]
pub fn relative_time(target: NaiveDateTime, now: NaiveDateTime) -> String {
    let diff_secs = (target - now).num_seconds();
    let mins = div_round(diff_secs, 60);
    let hours = div_round(diff_secs, 60 * 60);
    let days = div_round(diff_secs, 60 * 60 * 24);

    if mins == 0 {
        "just now".to_string()
    } else if mins.abs() < 60 {
        spell(mins, "minute")
    } else if hours.abs() < 24 {
        spell(hours, "hour")
    } else if days.abs() < 7 {
        spell(days, "day")
    } else {
        format_date_time(target, DateTimeFormat::Full)
    }
}

fn spell(amount: i64, unit: &str) -> String {
    let magnitude = amount.abs();
    let plural = if magnitude == 1 { "" } else { "s" };
    if amount > 0 {
        format!("in {magnitude} {unit}{plural}")
    } else {
        format!("{magnitude} {unit}{plural} ago")
    }
}

// Round-half-away-from-zero, matching how the UI copy reads.
fn div_round(value: i64, divisor: i64) -> i64 {
    let half = divisor / 2;
    if value >= 0 {
        (value + half) / divisor
    } else {
        (value - half) / divisor
    }
}

/// Badge icon per display status.
#[must_use]
pub fn status_icon(status: TimeStatus) -> &'static str {
    match status {
        TimeStatus::Overdue => "🚨",
        TimeStatus::Urgent => "⚠️",
        TimeStatus::DueSoon => "⏰",
        TimeStatus::DueToday => "📅",
        TimeStatus::Future => "🕐",
        TimeStatus::Completed => "✅",
        TimeStatus::NoDeadline => "📝",
    }
}

/// Convenience for rendering a task row badge.
#[must_use]
pub fn status_badge(
    due_datetime: Option<NaiveDateTime>,
    completed: bool,
    now: NaiveDateTime,
) -> (&'static str, &'static str) {
    let status = time_status(due_datetime, completed, now);
    (status.label(), status_icon(status))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .expect("valid date")
            .and_hms_opt(12, 0, 0)
            .expect("valid time")
    }

    #[test]
    fn full_format_is_day_first() {
        assert_eq!(
            format_date_time(now(), DateTimeFormat::Full),
            "02/03/2026 12:00"
        );
        assert_eq!(format_date_time(now(), DateTimeFormat::DateOnly), "02/03/2026");
        assert_eq!(format_date_time(now(), DateTimeFormat::TimeOnly), "12:00");
    }

    #[test]
    fn relative_phrasing_scales_with_distance() {
        let now = now();
        assert_eq!(relative_time(now + Duration::seconds(10), now), "just now");
        assert_eq!(relative_time(now + Duration::minutes(5), now), "in 5 minutes");
        assert_eq!(relative_time(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_time(now + Duration::hours(2), now), "in 2 hours");
        assert_eq!(relative_time(now - Duration::days(3), now), "3 days ago");
        assert_eq!(
            relative_time(now + Duration::days(10), now),
            "12/03/2026 12:00"
        );
    }

    #[test]
    fn badge_pairs_label_with_icon() {
        let now = now();
        assert_eq!(
            status_badge(Some(now + Duration::minutes(5)), false, now),
            ("urgent", "⚠️")
        );
        assert_eq!(status_badge(None, false, now), ("no-deadline", "📝"));
        assert_eq!(
            status_badge(Some(now - Duration::hours(1)), true, now),
            ("completed", "✅")
        );
    }

    #[test]
    fn rounding_matches_the_nearest_unit() {
        let now = now();
        // 90 seconds rounds to 2 minutes.
        assert_eq!(
            relative_time(now + Duration::seconds(90), now),
            "in 2 minutes"
        );
        // 100 minutes rounds to 2 hours.
        assert_eq!(
            relative_time(now + Duration::minutes(100), now),
            "in 2 hours"
        );
    }
}
