//! Time-based evaluation: due-datetime derivation, the seven-way urgency
//! status used for display, and the reminder trigger rule.
//!
//! Everything here is a pure function of an explicit `now` so the behavior
//! is deterministic under test. Callers obtain `now` from a [`crate::clock::Clock`].

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::trace;

use crate::task::Task;

const URGENT_WINDOW_MINS: i64 = 15;
const DUE_SOON_WINDOW_MINS: i64 = 60;
const DUE_TODAY_WINDOW_MINS: i64 = 1440;

/// Fine-grained urgency classification used for display styling.
///
/// Deliberately coarser bucketing is used for sorting; see [`crate::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeStatus {
    NoDeadline,
    Completed,
    Overdue,
    Urgent,
    DueSoon,
    DueToday,
    Future,
}

impl TimeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoDeadline => "no-deadline",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
            Self::Urgent => "urgent",
            Self::DueSoon => "due-soon",
            Self::DueToday => "due-today",
            Self::Future => "future",
        }
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).expect("23:59:00 is a valid time")
}

/// The single derivation rule for the `due_datetime` field: `None` iff the
/// date is absent; a date without a time defaults to 23:59:00 of that day.
#[must_use]
pub fn derive_due_datetime(
    due_date: Option<NaiveDate>,
    due_time: Option<NaiveTime>,
) -> Option<NaiveDateTime> {
    due_date.map(|date| date.and_time(due_time.unwrap_or_else(end_of_day)))
}

/// Classify a task's urgency at `now`.
///
/// Evaluation order matters: a missing deadline wins over everything, then
/// completion, then the time bands. Each band is inclusive at its lower
/// bound, so exactly 15 minutes remaining is `Urgent`, not `DueSoon`.
#[must_use]
pub fn time_status(
    due_datetime: Option<NaiveDateTime>,
    completed: bool,
    now: NaiveDateTime,
) -> TimeStatus {
    let Some(due) = due_datetime else {
        return TimeStatus::NoDeadline;
    };
    if completed {
        return TimeStatus::Completed;
    }

    let remaining = due - now;
    let status = if remaining < Duration::zero() {
        TimeStatus::Overdue
    } else if remaining <= Duration::minutes(URGENT_WINDOW_MINS) {
        TimeStatus::Urgent
    } else if remaining <= Duration::minutes(DUE_SOON_WINDOW_MINS) {
        TimeStatus::DueSoon
    } else if remaining <= Duration::minutes(DUE_TODAY_WINDOW_MINS) {
        TimeStatus::DueToday
    } else {
        TimeStatus::Future
    };
    trace!(?status, remaining_secs = remaining.num_seconds(), "classified task");
    status
}

#[must_use]
pub fn is_overdue(due_datetime: Option<NaiveDateTime>, completed: bool, now: NaiveDateTime) -> bool {
    match due_datetime {
        Some(due) if !completed => due < now,
        _ => false,
    }
}

#[must_use]
pub fn is_due_soon(
    due_datetime: Option<NaiveDateTime>,
    threshold_mins: i64,
    now: NaiveDateTime,
) -> bool {
    let Some(due) = due_datetime else {
        return false;
    };
    let remaining = due - now;
    remaining > Duration::zero() && remaining <= Duration::minutes(threshold_mins)
}

/// Decide whether a reminder should fire at `now`.
///
/// The lead-time window is closed on entry and open at the due instant, so
/// a reminder never fires once the task is already overdue. Comparing
/// `last_reminder_shown` against the window start (not against `now`) makes
/// the decision idempotent under repeated polling, while an edit that moves
/// the due time forward produces a later window start and re-arms the
/// reminder.
#[must_use]
pub fn should_fire(
    due_datetime: Option<NaiveDateTime>,
    reminder_minutes: u32,
    last_reminder_shown: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> bool {
    let Some(due) = due_datetime else {
        return false;
    };
    if reminder_minutes == 0 {
        return false;
    }

    let reminder_time = due - Duration::minutes(i64::from(reminder_minutes));
    now >= reminder_time
        && now < due
        && last_reminder_shown.is_none_or(|shown| shown < reminder_time)
}

/// Tasks whose due timestamp falls on `now`'s calendar day.
pub fn tasks_due_today<'a>(tasks: &'a [Task], now: NaiveDateTime) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| task.due_datetime.is_some_and(|due| due.date() == now.date()))
        .collect()
}

/// Tasks due strictly after `now` and within `days_ahead` days, soonest
/// first. Completion is not consulted; filter beforehand if needed.
pub fn upcoming_tasks<'a>(tasks: &'a [Task], days_ahead: i64, now: NaiveDateTime) -> Vec<&'a Task> {
    let horizon = now + Duration::days(days_ahead);
    let mut upcoming: Vec<&Task> = tasks
        .iter()
        .filter(|task| {
            task.due_datetime
                .is_some_and(|due| due > now && due <= horizon)
        })
        .collect();
    upcoming.sort_by_key(|task| task.due_datetime);
    upcoming
}
