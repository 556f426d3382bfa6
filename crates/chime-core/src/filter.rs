//! View filtering, composed ahead of ranking for every read of the list.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::rank;
use crate::task::{Category, Task};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

/// Pure view parameters; not owned by any task and persisted as part of
/// the app snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ViewFilter {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub query: String,
}

impl ViewFilter {
    /// Each stage narrows; empty or absent stages are no-ops.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        match self.status {
            StatusFilter::All => {}
            StatusFilter::Active => {
                if task.completed {
                    return false;
                }
            }
            StatusFilter::Completed => {
                if !task.completed {
                    return false;
                }
            }
        }

        if let Some(category) = self.category
            && task.category != category
        {
            return false;
        }

        let query = self.query.trim();
        if !query.is_empty()
            && !task
                .text
                .to_lowercase()
                .contains(&query.to_lowercase())
        {
            return false;
        }

        true
    }
}

/// Filter then rank. The main view never ranks an unfiltered list or shows
/// a filtered list unranked, so the two are composed here.
#[must_use]
pub fn apply(tasks: &[Task], filter: &ViewFilter, now: NaiveDateTime) -> Vec<Task> {
    let mut visible: Vec<Task> = tasks
        .iter()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect();
    visible.sort_by(|a, b| rank::compare(a, b, now));
    trace!(
        total = tasks.len(),
        visible = visible.len(),
        "applied view filter"
    );
    visible
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    use super::{StatusFilter, ViewFilter, apply};
    use crate::task::{Category, Task, TaskDraft};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .expect("valid date")
            .and_hms_opt(12, 0, 0)
            .expect("valid time")
    }

    fn task(text: &str, category: Category, completed: bool) -> Task {
        let mut t = Task::from_draft(
            TaskDraft {
                text: text.to_string(),
                category,
                ..TaskDraft::default()
            },
            now(),
        );
        t.completed = completed;
        t
    }

    #[test]
    fn status_stage_narrows_by_completion() {
        let open = task("write report", Category::Work, false);
        let done = task("buy milk", Category::Shopping, true);

        let active = ViewFilter {
            status: StatusFilter::Active,
            ..ViewFilter::default()
        };
        assert!(active.matches(&open));
        assert!(!active.matches(&done));

        let completed = ViewFilter {
            status: StatusFilter::Completed,
            ..ViewFilter::default()
        };
        assert!(!completed.matches(&open));
        assert!(completed.matches(&done));
    }

    #[test]
    fn category_stage_is_equality() {
        let work = task("write report", Category::Work, false);
        let filter = ViewFilter {
            category: Some(Category::Health),
            ..ViewFilter::default()
        };
        assert!(!filter.matches(&work));

        let filter = ViewFilter {
            category: Some(Category::Work),
            ..ViewFilter::default()
        };
        assert!(filter.matches(&work));
    }

    #[test]
    fn query_is_case_insensitive_substring() {
        let t = task("Write the Quarterly Report", Category::Work, false);

        let hit = ViewFilter {
            query: "quarterly".to_string(),
            ..ViewFilter::default()
        };
        assert!(hit.matches(&t));

        let miss = ViewFilter {
            query: "invoice".to_string(),
            ..ViewFilter::default()
        };
        assert!(!miss.matches(&t));

        // Whitespace-only queries are a no-op, not a match-nothing.
        let blank = ViewFilter {
            query: "   ".to_string(),
            ..ViewFilter::default()
        };
        assert!(blank.matches(&t));
    }

    #[test]
    fn apply_filters_then_ranks() {
        let now = now();
        let mut urgent = task("urgent work", Category::Work, false);
        urgent.due_date = Some((now + Duration::minutes(10)).date());
        urgent.due_time = Some((now + Duration::minutes(10)).time());
        urgent.rederive_due_datetime();

        let relaxed = task("relaxed work", Category::Work, false);
        let other = task("groceries", Category::Shopping, false);

        let tasks = vec![relaxed.clone(), other, urgent.clone()];
        let filter = ViewFilter {
            category: Some(Category::Work),
            ..ViewFilter::default()
        };

        let visible = apply(&tasks, &filter, now);
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].id, urgent.id);
        assert_eq!(visible[1].id, relaxed.id);
    }
}
