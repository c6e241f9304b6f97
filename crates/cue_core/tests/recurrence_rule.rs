use chrono::NaiveDate;
use cue_core::{
    Anchor, DeliveryMode, InvalidRuleError, RecurrenceRule, Reminder, ReminderValidationError,
    Weekday,
};
use serde_json::json;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn rules_serialize_with_kind_tag() {
    assert_eq!(
        serde_json::to_value(RecurrenceRule::once()).unwrap(),
        json!({ "kind": "once" })
    );
    assert_eq!(
        serde_json::to_value(RecurrenceRule::weekly(2, [Weekday::Friday, Weekday::Monday]).unwrap())
            .unwrap(),
        json!({ "kind": "weekly", "interval_weeks": 2, "weekdays": [2, 6] })
    );
    assert_eq!(
        serde_json::to_value(RecurrenceRule::monthly([31, 1, 15]).unwrap()).unwrap(),
        json!({ "kind": "monthly", "days_of_month": [1, 15, 31] })
    );
}

#[test]
fn deserialization_rejects_invalid_rules() {
    let invalid = [
        json!({ "kind": "weekly", "interval_weeks": 0, "weekdays": [2] }),
        json!({ "kind": "weekly", "interval_weeks": 1, "weekdays": [] }),
        json!({ "kind": "weekly", "interval_weeks": 1, "weekdays": [8] }),
        json!({ "kind": "monthly", "days_of_month": [] }),
        json!({ "kind": "monthly", "days_of_month": [0] }),
        json!({ "kind": "monthly", "days_of_month": [32] }),
        json!({ "kind": "yearly" }),
    ];
    for value in invalid {
        assert!(
            serde_json::from_value::<RecurrenceRule>(value.clone()).is_err(),
            "{value} should be rejected"
        );
    }
}

#[test]
fn duplicate_days_collapse_into_sets() {
    let rule: RecurrenceRule = serde_json::from_value(json!({
        "kind": "weekly",
        "interval_weeks": 1,
        "weekdays": [2, 2, 4]
    }))
    .unwrap();
    let RecurrenceRule::Weekly(weekly) = rule else {
        panic!("expected weekly rule");
    };
    assert_eq!(weekly.weekdays().len(), 2);
    assert!(weekly.contains(Weekday::Monday));
    assert!(weekly.contains(Weekday::Wednesday));
}

#[test]
fn factories_report_specific_errors() {
    assert_eq!(
        RecurrenceRule::weekly_from_numbers(1, &[0]).unwrap_err(),
        InvalidRuleError::WeekdayOutOfRange(0)
    );
    assert_eq!(
        RecurrenceRule::monthly([12, 40]).unwrap_err(),
        InvalidRuleError::DayOfMonthOutOfRange(40)
    );
    assert_eq!(
        RecurrenceRule::monthly(Vec::new()).unwrap_err(),
        InvalidRuleError::EmptyDaysOfMonth
    );
    assert_eq!(
        Anchor::new(date(2026, 1, 1), 24, 0).unwrap_err(),
        InvalidRuleError::InvalidTimeOfDay {
            hour: 24,
            minute: 0
        }
    );
}

#[test]
fn reminder_json_applies_defaults() {
    let id = Uuid::new_v4();
    let reminder: Reminder = serde_json::from_value(json!({
        "id": id,
        "title": "stretch",
        "anchor": { "date": "2026-01-05", "hour": 7, "minute": 15 },
        "rule": { "kind": "monthly", "days_of_month": [5] }
    }))
    .unwrap();

    assert_eq!(reminder.id, id);
    assert_eq!(reminder.snooze_minutes, 10);
    assert_eq!(reminder.delivery, DeliveryMode::Notification);
    assert!(reminder.is_active());
    assert_eq!(reminder.anchor.date(), date(2026, 1, 5));
}

#[test]
fn reminder_json_rejects_invalid_snapshots() {
    let too_long_snooze = json!({
        "id": Uuid::new_v4(),
        "title": "nap",
        "anchor": { "date": "2026-01-05", "hour": 7, "minute": 15 },
        "rule": { "kind": "once" },
        "snooze_minutes": 1441
    });
    assert!(serde_json::from_value::<Reminder>(too_long_snooze).is_err());

    let bad_time = json!({
        "id": Uuid::new_v4(),
        "title": "nap",
        "anchor": { "date": "2026-01-05", "hour": 7, "minute": 60 },
        "rule": { "kind": "once" }
    });
    assert!(serde_json::from_value::<Reminder>(bad_time).is_err());
}

#[test]
fn reminder_with_id_rejects_nil_and_soft_delete_toggles_activity() {
    let anchor = Anchor::new(date(2026, 1, 5), 8, 0).unwrap();
    assert_eq!(
        Reminder::with_id(Uuid::nil(), "x", anchor, RecurrenceRule::once()).unwrap_err(),
        ReminderValidationError::NilId
    );

    let mut reminder = Reminder::new("x", anchor, RecurrenceRule::once());
    reminder.soft_delete();
    assert!(!reminder.is_active());
    reminder.restore();
    assert!(reminder.is_active());
}
