use chime_core::app::App;
use chime_core::clock::FixedClock;
use chime_core::config::Settings;
use chime_core::persist::StateFile;
use chime_core::task::{NotificationKind, TaskDraft};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tempfile::tempdir;

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .expect("valid date")
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
}

fn app_with_clock(dir: &std::path::Path, clock: FixedClock) -> App {
    App::with_parts(
        Box::new(clock),
        StateFile::at(dir.join("state.json")),
        &Settings::default(),
    )
    .expect("app boots")
}

#[test]
fn reminder_fires_once_then_autodismisses() {
    let temp = tempdir().expect("tempdir");
    let clock = FixedClock::new(start());
    let mut app = app_with_clock(temp.path(), clock.clone());

    let due = start() + Duration::minutes(10);
    app.add_task(TaskDraft {
        text: "join the call".to_string(),
        due_date: Some(due.date()),
        due_time: Some(due.time()),
        reminder_minutes: 30,
        ..TaskDraft::default()
    })
    .expect("add");

    app.tick().expect("tick");
    let snap = app.snapshot();
    assert_eq!(snap.notifications.len(), 1);
    let notification = &snap.notifications[0];
    assert_eq!(notification.kind, NotificationKind::Reminder);
    assert!(notification.message.contains("join the call"));
    assert_eq!(notification.task_id, Some(snap.tasks[0].id));
    assert_eq!(snap.tasks[0].last_reminder_shown, Some(start()));

    // Ten seconds on screen, then gone; no second reminder follows.
    clock.advance(Duration::seconds(10));
    app.tick().expect("tick");
    assert!(app.snapshot().notifications.is_empty());

    clock.advance(Duration::seconds(60));
    app.tick().expect("tick");
    assert!(
        app.snapshot().notifications.is_empty(),
        "one reminder per lead-time crossing"
    );
}

#[test]
fn snoozing_reschedules_and_rearms_the_reminder() {
    let temp = tempdir().expect("tempdir");
    let clock = FixedClock::new(start());
    let mut app = app_with_clock(temp.path(), clock.clone());

    let due = start() + Duration::minutes(10);
    let snap = app
        .add_task(TaskDraft {
            text: "send the draft".to_string(),
            due_date: Some(due.date()),
            due_time: Some(due.time()),
            reminder_minutes: 30,
            ..TaskDraft::default()
        })
        .expect("add");
    let id = snap.tasks[0].id;

    app.tick().expect("tick");
    assert_eq!(app.snapshot().notifications.len(), 1);
    let notification_id = app.snapshot().notifications[0].id;

    // User hits "+1h": due moves out, the stale notification is dismissed.
    app.snooze_task(id).expect("snooze");
    app.dismiss_notification(notification_id);
    assert!(app.snapshot().notifications.is_empty());

    let new_due = due + Duration::hours(1);
    assert_eq!(app.snapshot().tasks[0].due_datetime, Some(new_due));

    // The new lead-time window opens 30 minutes before the new due time;
    // the reminder fires again on entry despite the old shown timestamp.
    clock.set(new_due - Duration::minutes(30));
    app.tick().expect("tick");
    assert_eq!(app.snapshot().notifications.len(), 1);
}

#[test]
fn completing_a_task_from_its_reminder_silences_it() {
    let temp = tempdir().expect("tempdir");
    let clock = FixedClock::new(start());
    let mut app = app_with_clock(temp.path(), clock.clone());

    let due = start() + Duration::minutes(10);
    let snap = app
        .add_task(TaskDraft {
            text: "pay the invoice".to_string(),
            due_date: Some(due.date()),
            due_time: Some(due.time()),
            reminder_minutes: 60,
            ..TaskDraft::default()
        })
        .expect("add");
    let id = snap.tasks[0].id;

    app.tick().expect("tick");
    let notification_id = app.snapshot().notifications[0].id;

    // "Done" straight from the notification.
    app.toggle_completed(id).expect("toggle");
    app.dismiss_notification(notification_id);

    clock.advance(Duration::seconds(90));
    app.tick().expect("tick");
    assert!(app.snapshot().notifications.is_empty());
}

#[test]
fn shutdown_cancels_timers_and_clears_notifications() {
    let temp = tempdir().expect("tempdir");
    let clock = FixedClock::new(start());
    let mut app = app_with_clock(temp.path(), clock.clone());

    let due = start() + Duration::minutes(5);
    app.add_task(TaskDraft {
        text: "stretch".to_string(),
        due_date: Some(due.date()),
        due_time: Some(due.time()),
        reminder_minutes: 15,
        ..TaskDraft::default()
    })
    .expect("add");

    app.tick().expect("tick");
    assert_eq!(app.snapshot().notifications.len(), 1);

    app.shutdown_notifications();
    assert!(app.snapshot().notifications.is_empty());

    // Nothing stale fires after the timers are gone.
    clock.advance(Duration::seconds(30));
    app.tick().expect("tick");
    assert!(app.snapshot().notifications.is_empty());
}
