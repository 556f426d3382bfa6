//! Total order over tasks for the main view.
//!
//! Sorting uses a coarse three-way urgency split (overdue / urgent / due
//! soon) rather than the seven-state [`crate::schedule::TimeStatus`] used
//! for display. The two classifications are intentionally kept separate:
//! the display status distinguishes due-today from future, while the sort
//! only needs to pull imminent work to the top and lets everything else
//! fall through to priority.

use std::cmp::Ordering;

use chrono::{Duration, NaiveDateTime};

use crate::task::Task;

/// Coarse urgency precedence for sorting, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum UrgencyBucket {
    Overdue,
    Urgent,
    DueSoon,
    Other,
}

fn urgency_bucket(task: &Task, now: NaiveDateTime) -> UrgencyBucket {
    let Some(due) = task.due_datetime else {
        return UrgencyBucket::Other;
    };
    let remaining = due - now;
    if remaining < Duration::zero() {
        UrgencyBucket::Overdue
    } else if remaining <= Duration::minutes(15) {
        UrgencyBucket::Urgent
    } else if remaining <= Duration::minutes(60) {
        UrgencyBucket::DueSoon
    } else {
        UrgencyBucket::Other
    }
}

/// Compare two tasks for display order at `now`.
///
/// Tie-break chain, each step consulted only when the previous is equal:
/// completion (incomplete first), urgency bucket (incomplete pairs only),
/// priority (high first), due timestamp (present before absent, earlier
/// first), creation timestamp (newest first). Deterministic and transitive;
/// stability beyond that is left to the underlying sort.
#[must_use]
pub fn compare(a: &Task, b: &Task, now: NaiveDateTime) -> Ordering {
    let by_completion = a.completed.cmp(&b.completed);
    if by_completion != Ordering::Equal {
        return by_completion;
    }

    if !a.completed && !b.completed {
        let by_bucket = urgency_bucket(a, now).cmp(&urgency_bucket(b, now));
        if by_bucket != Ordering::Equal {
            return by_bucket;
        }
    }

    let by_priority = b.priority.cmp(&a.priority);
    if by_priority != Ordering::Equal {
        return by_priority;
    }

    let by_due = cmp_optional(a.due_datetime.as_ref(), b.due_datetime.as_ref());
    if by_due != Ordering::Equal {
        return by_due;
    }

    b.created_at.cmp(&a.created_at)
}

/// Present values sort before absent ones.
fn cmp_optional<T: Ord>(left: Option<&T>, right: Option<&T>) -> Ordering {
    match (left, right) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
