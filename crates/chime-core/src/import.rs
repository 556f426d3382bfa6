//! Import and export of task records.
//!
//! Import is deliberately forgiving: a record must carry a string `text`
//! and a boolean `completed` with exactly those types; everything else is
//! coerced or defaulted. Malformed records are dropped, not escalated, but
//! the drop count is part of the outcome so callers can report partial
//! success instead of losing data silently.

use anyhow::{Context, bail};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::task::{Category, Priority, Task};

#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub tasks: Vec<Task>,
    pub dropped: usize,
}

/// Accepts either a bare JSON array of records or a `{"todos": [...]}`
/// envelope (the export shape). Anything else is a descriptive error.
#[instrument(skip(raw))]
pub fn parse_import(raw: &str, now: NaiveDateTime) -> anyhow::Result<ImportOutcome> {
    let value: Value = serde_json::from_str(raw).context("failed to parse JSON import")?;

    let records = match value {
        Value::Array(records) => records,
        Value::Object(mut map) => match map.remove("todos").or_else(|| map.remove("tasks")) {
            Some(Value::Array(records)) => records,
            _ => bail!("invalid import format: expected an array or a \"todos\" array"),
        },
        _ => bail!("invalid import format: expected an array or a \"todos\" array"),
    };

    Ok(import_records(records, now))
}

/// Validate and coerce a sequence of task-like records.
pub fn import_records(records: Vec<Value>, now: NaiveDateTime) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();
    for record in records {
        match coerce_record(&record, now) {
            Some(task) => outcome.tasks.push(task),
            None => {
                warn!(?record, "dropped malformed import record");
                outcome.dropped += 1;
            }
        }
    }
    debug!(
        imported = outcome.tasks.len(),
        dropped = outcome.dropped,
        "import records processed"
    );
    outcome
}

fn coerce_record(record: &Value, now: NaiveDateTime) -> Option<Task> {
    let obj = record.as_object()?;

    // Required fields must have exactly the right type; `completed: "no"`
    // is malformed, not falsy.
    let text = obj.get("text")?.as_str()?;
    if text.trim().is_empty() {
        return None;
    }
    let completed = obj.get("completed")?.as_bool()?;

    let category = obj
        .get("category")
        .and_then(Value::as_str)
        .and_then(parse_category)
        .unwrap_or_default();
    let priority = obj
        .get("priority")
        .and_then(Value::as_str)
        .and_then(parse_priority)
        .unwrap_or_default();
    let due_date = obj
        .get("due_date")
        .or_else(|| obj.get("dueDate"))
        .and_then(Value::as_str)
        .and_then(parse_date);
    let due_time = obj
        .get("due_time")
        .or_else(|| obj.get("dueTime"))
        .and_then(Value::as_str)
        .and_then(parse_time);
    let reminder_minutes = obj
        .get("reminder_minutes")
        .or_else(|| obj.get("reminderMinutes"))
        .and_then(Value::as_u64)
        .and_then(|raw| u32::try_from(raw).ok())
        .unwrap_or(0);
    let created_at = obj
        .get("created_at")
        .or_else(|| obj.get("createdAt"))
        .and_then(Value::as_str)
        .and_then(parse_datetime)
        .unwrap_or(now);

    let mut task = Task {
        id: Uuid::new_v4(),
        text: text.to_string(),
        completed,
        category,
        priority,
        due_date,
        due_time,
        due_datetime: None,
        reminder_minutes,
        last_reminder_shown: None,
        created_at,
    };
    task.rederive_due_datetime();
    Some(task)
}

fn parse_category(raw: &str) -> Option<Category> {
    match raw.trim().to_lowercase().as_str() {
        "personal" => Some(Category::Personal),
        "work" => Some(Category::Work),
        "shopping" => Some(Category::Shopping),
        "health" => Some(Category::Health),
        "study" => Some(Category::Study),
        _ => None,
    }
}

fn parse_priority(raw: &str) -> Option<Priority> {
    match raw.trim().to_lowercase().as_str() {
        "low" => Some(Priority::Low),
        "medium" => Some(Priority::Medium),
        "high" => Some(Priority::High),
        _ => None,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.fZ"))
        .ok()
}

#[derive(Debug, Serialize)]
struct ExportEnvelope<'a> {
    todos: &'a [Task],
    export_date: NaiveDateTime,
}

pub fn export_json(tasks: &[Task], now: NaiveDateTime) -> anyhow::Result<String> {
    serde_json::to_string_pretty(&ExportEnvelope {
        todos: tasks,
        export_date: now,
    })
    .context("failed serializing export")
}

const CSV_HEADER: &str = "ID,Text,Completed,Category,Priority,Due Date,Created At";

pub fn export_csv(tasks: &[Task]) -> String {
    let mut out = String::from(CSV_HEADER);
    for task in tasks {
        let due = task
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        out.push('\n');
        out.push_str(&format!(
            "{},\"{}\",{},{},{},{},{}",
            task.id,
            task.text.replace('"', "\"\""),
            if task.completed { "Yes" } else { "No" },
            category_label(task.category),
            priority_label(task.priority),
            due,
            task.created_at.format("%Y-%m-%dT%H:%M:%S"),
        ));
    }
    out
}

/// Header row plus at least one data row; rows with fewer than three
/// fields are dropped like any other malformed record.
#[instrument(skip(raw))]
pub fn import_csv(raw: &str, now: NaiveDateTime) -> anyhow::Result<ImportOutcome> {
    let mut lines = raw.lines().filter(|line| !line.trim().is_empty());
    if lines.next().is_none() {
        bail!("CSV import needs a header row and at least one data row");
    }

    let mut outcome = ImportOutcome::default();
    for line in lines {
        let fields = split_csv_line(line);
        let record = csv_fields_to_record(&fields);
        match record.and_then(|r| coerce_record(&r, now)) {
            Some(task) => outcome.tasks.push(task),
            None => {
                warn!(line, "dropped malformed CSV row");
                outcome.dropped += 1;
            }
        }
    }
    if outcome.tasks.is_empty() && outcome.dropped == 0 {
        bail!("CSV import needs a header row and at least one data row");
    }
    Ok(outcome)
}

fn csv_fields_to_record(fields: &[String]) -> Option<Value> {
    if fields.len() < 3 {
        return None;
    }
    let mut map = serde_json::Map::new();
    map.insert("text".to_string(), Value::String(fields[1].clone()));
    map.insert(
        "completed".to_string(),
        Value::Bool(fields[2].trim().eq_ignore_ascii_case("yes")),
    );
    if let Some(category) = fields.get(3) {
        map.insert("category".to_string(), Value::String(category.clone()));
    }
    if let Some(priority) = fields.get(4) {
        map.insert("priority".to_string(), Value::String(priority.clone()));
    }
    if let Some(due) = fields.get(5) {
        map.insert("due_date".to_string(), Value::String(due.clone()));
    }
    if let Some(created) = fields.get(6) {
        map.insert("created_at".to_string(), Value::String(created.clone()));
    }
    Some(Value::Object(map))
}

/// Minimal quote-aware splitter matching the export shape: fields separated
/// by commas, text quoted with doubled inner quotes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

fn category_label(category: Category) -> &'static str {
    match category {
        Category::Personal => "personal",
        Category::Work => "work",
        Category::Shopping => "shopping",
        Category::Health => "health",
        Category::Study => "study",
    }
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
    }
}
