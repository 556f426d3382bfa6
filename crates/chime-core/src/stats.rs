//! Dashboard numbers derived from the task list. Pure and recomputed per
//! render; nothing here is cached or persisted.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::schedule::{TimeStatus, tasks_due_today, time_status, upcoming_tasks};
use crate::task::{Category, Task};

const UPCOMING_DAYS: i64 = 7;
const UPCOMING_CAP: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCount {
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub overdue: usize,
    pub urgent: usize,
    /// Urgent and due-soon combined, the "needs attention within the hour"
    /// number on the dashboard.
    pub due_soon: usize,
    pub completion_rate: f64,
    pub due_today: Vec<Task>,
    /// Incomplete tasks due within the next week, soonest first, capped.
    pub upcoming: Vec<Task>,
    pub by_category: HashMap<Category, CategoryCount>,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], now: NaiveDateTime) -> Self {
        let mut stats = Self {
            total: tasks.len(),
            ..Self::default()
        };

        for task in tasks {
            if task.completed {
                stats.completed += 1;
            } else {
                stats.active += 1;
            }

            match time_status(task.due_datetime, task.completed, now) {
                TimeStatus::Overdue => stats.overdue += 1,
                TimeStatus::Urgent => {
                    stats.urgent += 1;
                    stats.due_soon += 1;
                }
                TimeStatus::DueSoon => stats.due_soon += 1,
                _ => {}
            }

            let entry = stats.by_category.entry(task.category).or_default();
            entry.total += 1;
            if task.completed {
                entry.completed += 1;
            }
        }

        stats.completion_rate = if stats.total > 0 {
            stats.completed as f64 / stats.total as f64 * 100.0
        } else {
            0.0
        };

        stats.due_today = tasks_due_today(tasks, now)
            .into_iter()
            .cloned()
            .collect();

        let actives: Vec<Task> = tasks.iter().filter(|t| !t.completed).cloned().collect();
        stats.upcoming = upcoming_tasks(&actives, UPCOMING_DAYS, now)
            .into_iter()
            .take(UPCOMING_CAP)
            .cloned()
            .collect();

        stats
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::task::TaskDraft;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .expect("valid date")
            .and_hms_opt(12, 0, 0)
            .expect("valid time")
    }

    fn task_due(text: &str, category: Category, due_in: Duration, completed: bool) -> Task {
        let due = now() + due_in;
        let mut t = Task::from_draft(
            TaskDraft {
                text: text.to_string(),
                category,
                due_date: Some(due.date()),
                due_time: Some(due.time()),
                ..TaskDraft::default()
            },
            now(),
        );
        t.completed = completed;
        t
    }

    #[test]
    fn counts_split_by_urgency_and_category() {
        let tasks = vec![
            task_due("late", Category::Work, Duration::minutes(-30), false),
            task_due("urgent", Category::Work, Duration::minutes(10), false),
            task_due("soon", Category::Personal, Duration::minutes(45), false),
            task_due("done", Category::Work, Duration::hours(3), true),
        ];

        let stats = TaskStats::compute(&tasks, now());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.active, 3);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.urgent, 1);
        assert_eq!(stats.due_soon, 2);
        assert!((stats.completion_rate - 25.0).abs() < f64::EPSILON);

        let work = stats.by_category[&Category::Work];
        assert_eq!(work.total, 3);
        assert_eq!(work.completed, 1);
    }

    #[test]
    fn upcoming_is_incomplete_capped_and_sorted() {
        let mut tasks: Vec<Task> = (1..=8)
            .map(|d| {
                task_due(
                    &format!("day {d}"),
                    Category::Study,
                    Duration::days(9 - d),
                    false,
                )
            })
            .collect();
        // Due 8,7,...,1 days ahead; the 8-day one is beyond the horizon.
        tasks.push(task_due(
            "done tomorrow",
            Category::Study,
            Duration::days(1),
            true,
        ));

        let stats = TaskStats::compute(&tasks, now());
        assert_eq!(stats.upcoming.len(), 5);
        assert_eq!(stats.upcoming[0].text, "day 8"); // due in 1 day
        assert!(stats.upcoming.iter().all(|t| !t.completed));
    }

    #[test]
    fn due_today_matches_calendar_day() {
        let tasks = vec![
            task_due("tonight", Category::Personal, Duration::hours(5), false),
            task_due("tomorrow", Category::Personal, Duration::hours(20), false),
        ];
        let stats = TaskStats::compute(&tasks, now());
        assert_eq!(stats.due_today.len(), 1);
        assert_eq!(stats.due_today[0].text, "tonight");
    }

    #[test]
    fn empty_list_has_zero_rate() {
        let stats = TaskStats::compute(&[], now());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_rate, 0.0);
    }
}
