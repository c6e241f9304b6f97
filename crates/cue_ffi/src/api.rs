//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose recurrence evaluation and trigger planning to Dart via FRB.
//! - Flatten core types into FRB-friendly envelopes (strings, numbers, lists).
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Dates cross the boundary as `YYYY-MM-DD` strings, weekdays as `1..=7`
//!   with `1 = Sunday`.
//! - Malformed input yields `ok = false` with a diagnostic message, never a
//!   partial result.

use chrono::NaiveDate;
use cue_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, plan_backends,
    ping as ping_inner, Anchor, DateWindow, ReconcileGate, ReconcileTicket, ReconciliationPlan,
    RecurrenceRule, RegisteredTrigger, Reminder, ReminderId, ReminderPlans, SchedulingConfig,
    StableKey, TriggerDescriptor, TriggerSchedule, Weekday,
};
use log::warn;
use std::sync::OnceLock;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DUE_DATES_LIMIT_MAX: u32 = 366;
static PLAN_GATE: OnceLock<ReconcileGate> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Single-date due check response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueCheckResponse {
    pub ok: bool,
    pub due: bool,
    pub message: String,
}

/// Due-date listing response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueDatesResponse {
    pub ok: bool,
    /// `YYYY-MM-DD` dates in ascending order.
    pub dates: Vec<String>,
    pub message: String,
}

impl DueDatesResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            dates: Vec::new(),
            message: message.into(),
        }
    }
}

/// Flat trigger shape shared by plan output and registered input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerItem {
    pub key: String,
    /// `at|every_week|every_month`.
    pub kind: String,
    /// Set for `at`.
    pub date: Option<String>,
    /// Set for `every_week`, `1..=7` with `1 = Sunday`.
    pub weekday: Option<u8>,
    /// Set for `every_month`.
    pub day_of_month: Option<u8>,
    pub hour: u8,
    pub minute: u8,
}

/// Trigger currently registered on a backend.
///
/// `trigger` is `None` when the backend can only report keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredTriggerItem {
    pub key: String,
    pub trigger: Option<TriggerItem>,
}

/// Cancel/create operations for one backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendPlan {
    /// Apply after `cancel`.
    pub create: Vec<TriggerItem>,
    pub cancel: Vec<String>,
}

impl BackendPlan {
    fn from_plan(plan: &ReconciliationPlan) -> Self {
        Self {
            create: plan.create.iter().map(to_trigger_item).collect(),
            cancel: plan.cancel.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Reconciliation plans for one reminder on both backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPlansResponse {
    pub ok: bool,
    pub notification: BackendPlan,
    pub alarm: BackendPlan,
    /// Shared by both plans. Check with [`trigger_plan_is_current`] before
    /// applying and release with [`trigger_plan_finish`] afterwards.
    pub generation: u64,
    pub message: String,
}

impl TriggerPlansResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            notification: BackendPlan::default(),
            alarm: BackendPlan::default(),
            generation: 0,
            message: message.into(),
        }
    }
}

/// Checks whether `rule_json` is due on `date`.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn recurrence_is_due(
    rule_json: String,
    anchor_date: String,
    hour: u8,
    minute: u8,
    date: String,
) -> DueCheckResponse {
    let evaluated = (|| -> Result<bool, String> {
        let rule = parse_rule(&rule_json)?;
        let anchor = parse_anchor(&anchor_date, hour, minute)?;
        let date = parse_date(&date, "date")?;
        Ok(load_config()?.engine().is_due(&rule, &anchor, date))
    })();

    match evaluated {
        Ok(due) => DueCheckResponse {
            ok: true,
            due,
            message: String::new(),
        },
        Err(message) => DueCheckResponse {
            ok: false,
            due: false,
            message: format!("recurrence_is_due failed: {message}"),
        },
    }
}

/// Lists due dates inside the inclusive `[window_start, window_end]` range.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Returns at most `limit` dates (default and max 366).
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn recurrence_due_dates(
    rule_json: String,
    anchor_date: String,
    hour: u8,
    minute: u8,
    window_start: String,
    window_end: String,
    limit: Option<u32>,
) -> DueDatesResponse {
    let listed = (|| -> Result<Vec<String>, String> {
        let rule = parse_rule(&rule_json)?;
        let anchor = parse_anchor(&anchor_date, hour, minute)?;
        let window = DateWindow::through(
            parse_date(&window_start, "window_start")?,
            parse_date(&window_end, "window_end")?,
        );
        let limit = normalize_due_dates_limit(limit) as usize;
        Ok(load_config()?
            .engine()
            .due_dates(&rule, &anchor, window)
            .take(limit)
            .map(format_date)
            .collect())
    })();

    match listed {
        Ok(dates) => DueDatesResponse {
            ok: true,
            message: format!("Found {} due date(s).", dates.len()),
            dates,
        },
        Err(message) => DueDatesResponse::failure(format!("recurrence_due_dates failed: {message}")),
    }
}

/// First due date on or after `from`; `dates` is empty when none exists.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn recurrence_next_due(
    rule_json: String,
    anchor_date: String,
    hour: u8,
    minute: u8,
    from: String,
) -> DueDatesResponse {
    let next = (|| -> Result<Option<NaiveDate>, String> {
        let rule = parse_rule(&rule_json)?;
        let anchor = parse_anchor(&anchor_date, hour, minute)?;
        let from = parse_date(&from, "from")?;
        Ok(load_config()?.engine().next_due(&rule, &anchor, from))
    })();

    match next {
        Ok(next) => DueDatesResponse {
            ok: true,
            dates: next.into_iter().map(format_date).collect(),
            message: String::new(),
        },
        Err(message) => DueDatesResponse::failure(format!("recurrence_next_due failed: {message}")),
    }
}

/// Plans the trigger changes for one reminder on both backends.
///
/// Input semantics:
/// - `reminder_json`: serialized reminder snapshot (deleted reminders plan
///   cancellations only).
/// - `registered_notification` / `registered_alarm`: what each backend
///   reports; entries of other reminders are ignored.
/// - `today`: start of the interval-week horizon.
///
/// # FFI contract
/// - Sync call, pure computation apart from the generation counter.
/// - The generation is taken before planning, so a later call for the same
///   reminder always supersedes this one.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn trigger_plans(
    reminder_json: String,
    registered_notification: Vec<RegisteredTriggerItem>,
    registered_alarm: Vec<RegisteredTriggerItem>,
    today: String,
) -> TriggerPlansResponse {
    let reminder: Reminder = match serde_json::from_str(&reminder_json) {
        Ok(reminder) => reminder,
        Err(err) => {
            warn!("event=trigger_plans module=ffi status=error");
            return TriggerPlansResponse::failure(format!(
                "trigger_plans failed: invalid reminder: {err}"
            ));
        }
    };
    let ticket = plan_gate().begin(reminder.id);

    let planned = (|| -> Result<ReminderPlans, String> {
        let today = parse_date(&today, "today")?;
        let notifications = to_registered_triggers(registered_notification)?;
        let alarms = to_registered_triggers(registered_alarm)?;
        let config = load_config()?;
        Ok(plan_backends(
            &config.generator(),
            config.horizon(today),
            &reminder,
            &notifications,
            &alarms,
        ))
    })();

    match planned {
        Ok(plans) => TriggerPlansResponse {
            ok: true,
            message: format!(
                "Plan: notification create {} cancel {}, alarm create {} cancel {}.",
                plans.notification.create.len(),
                plans.notification.cancel.len(),
                plans.alarm.create.len(),
                plans.alarm.cancel.len()
            ),
            notification: BackendPlan::from_plan(&plans.notification),
            alarm: BackendPlan::from_plan(&plans.alarm),
            generation: ticket.generation,
        },
        Err(message) => {
            plan_gate().finish(&ticket);
            warn!(
                "event=trigger_plans module=ffi status=error reminder_id={}",
                reminder.id
            );
            TriggerPlansResponse::failure(format!("trigger_plans failed: {message}"))
        }
    }
}

/// Whether a plan from [`trigger_plans`] is still the newest for its reminder.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Returns `false` for malformed ids.
#[flutter_rust_bridge::frb(sync)]
pub fn trigger_plan_is_current(reminder_id: String, generation: u64) -> bool {
    match parse_ticket(&reminder_id, generation) {
        Some(ticket) => plan_gate().is_current(&ticket),
        None => false,
    }
}

/// Releases a plan from [`trigger_plans`] after it was applied.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Returns `false` when the plan was already superseded or released, or
///   the id is malformed.
#[flutter_rust_bridge::frb(sync)]
pub fn trigger_plan_finish(reminder_id: String, generation: u64) -> bool {
    match parse_ticket(&reminder_id, generation) {
        Some(ticket) => plan_gate().finish(&ticket),
        None => false,
    }
}

fn parse_ticket(reminder_id: &str, generation: u64) -> Option<ReconcileTicket> {
    let reminder_id = reminder_id.trim().parse::<ReminderId>().ok()?;
    Some(ReconcileTicket {
        reminder_id,
        generation,
    })
}

fn plan_gate() -> &'static ReconcileGate {
    PLAN_GATE.get_or_init(ReconcileGate::new)
}

fn load_config() -> Result<SchedulingConfig, String> {
    SchedulingConfig::from_env().map_err(|err| err.to_string())
}

fn normalize_due_dates_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => DUE_DATES_LIMIT_MAX,
        Some(value) => value.min(DUE_DATES_LIMIT_MAX),
    }
}

fn parse_rule(rule_json: &str) -> Result<RecurrenceRule, String> {
    serde_json::from_str(rule_json).map_err(|err| format!("invalid rule: {err}"))
}

fn parse_anchor(anchor_date: &str, hour: u8, minute: u8) -> Result<Anchor, String> {
    let date = parse_date(anchor_date, "anchor_date")?;
    Anchor::new(date, hour, minute).map_err(|err| err.to_string())
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|err| format!("{field} must be YYYY-MM-DD: {err}"))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn to_trigger_item(descriptor: &TriggerDescriptor) -> TriggerItem {
    let (date, weekday, day_of_month) = match descriptor.schedule {
        TriggerSchedule::At { date } => (Some(format_date(date)), None, None),
        TriggerSchedule::EveryWeek { weekday } => (None, Some(weekday.number()), None),
        TriggerSchedule::EveryMonth { day } => (None, None, Some(day)),
    };
    TriggerItem {
        key: descriptor.key.to_string(),
        kind: descriptor.schedule.kind_label().to_string(),
        date,
        weekday,
        day_of_month,
        hour: descriptor.fire_hour,
        minute: descriptor.fire_minute,
    }
}

fn to_registered_triggers(
    items: Vec<RegisteredTriggerItem>,
) -> Result<Vec<RegisteredTrigger>, String> {
    items.into_iter().map(to_registered_trigger).collect()
}

fn to_registered_trigger(item: RegisteredTriggerItem) -> Result<RegisteredTrigger, String> {
    let key = StableKey::from_raw(item.key);
    let Some(trigger) = item.trigger else {
        return Ok(RegisteredTrigger::key_only(key));
    };

    let schedule = match trigger.kind.as_str() {
        "at" => TriggerSchedule::At {
            date: parse_date(trigger.date.as_deref().unwrap_or_default(), "trigger.date")?,
        },
        "every_week" => TriggerSchedule::EveryWeek {
            weekday: trigger
                .weekday
                .and_then(Weekday::from_number)
                .ok_or_else(|| "trigger.weekday must be 1..=7".to_string())?,
        },
        "every_month" => TriggerSchedule::EveryMonth {
            day: trigger
                .day_of_month
                .ok_or_else(|| "trigger.day_of_month is required".to_string())?,
        },
        other => return Err(format!("unsupported trigger kind `{other}`")),
    };

    Ok(RegisteredTrigger {
        key,
        descriptor: Some(TriggerDescriptor {
            key: StableKey::from_raw(trigger.key),
            fire_hour: trigger.hour,
            fire_minute: trigger.minute,
            schedule,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, recurrence_due_dates, recurrence_is_due,
        recurrence_next_due, trigger_plan_finish, trigger_plan_is_current, trigger_plans,
        BackendPlan, RegisteredTriggerItem,
    };
    use uuid::Uuid;

    const BIWEEKLY_MONDAY: &str = r#"{"kind":"weekly","interval_weeks":2,"weekdays":[2]}"#;

    fn reminder_json(id: Uuid, rule_json: &str, delivery: &str, is_deleted: bool) -> String {
        format!(
            r#"{{"id":"{id}","title":"water plants","anchor":{{"date":"2026-01-05","hour":9,"minute":30}},"rule":{rule_json},"delivery":"{delivery}","is_deleted":{is_deleted}}}"#
        )
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn is_due_follows_interval_weeks() {
        let check = |date: &str| {
            recurrence_is_due(
                BIWEEKLY_MONDAY.to_string(),
                "2026-01-05".to_string(),
                9,
                30,
                date.to_string(),
            )
        };
        assert!(check("2026-01-19").due);
        let off_week = check("2026-01-12");
        assert!(off_week.ok, "{}", off_week.message);
        assert!(!off_week.due);
    }

    #[test]
    fn is_due_reports_malformed_rule() {
        let response = recurrence_is_due(
            r#"{"kind":"weekly","interval_weeks":0,"weekdays":[2]}"#.to_string(),
            "2026-01-05".to_string(),
            9,
            0,
            "2026-01-05".to_string(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("invalid rule"));
    }

    #[test]
    fn due_dates_skip_short_months() {
        let response = recurrence_due_dates(
            r#"{"kind":"monthly","days_of_month":[31]}"#.to_string(),
            "2026-01-01".to_string(),
            8,
            0,
            "2026-01-01".to_string(),
            "2026-04-30".to_string(),
            None,
        );
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.dates, vec!["2026-01-31", "2026-03-31"]);
    }

    #[test]
    fn next_due_returns_single_date() {
        let response = recurrence_next_due(
            BIWEEKLY_MONDAY.to_string(),
            "2026-01-05".to_string(),
            9,
            30,
            "2026-01-06".to_string(),
        );
        assert_eq!(response.dates, vec!["2026-01-19"]);
    }

    fn registered(keys: &[String]) -> Vec<RegisteredTriggerItem> {
        keys.iter()
            .map(|key| RegisteredTriggerItem {
                key: key.clone(),
                trigger: None,
            })
            .collect()
    }

    #[test]
    fn trigger_plans_create_weekly_triggers_and_cancel_strays() {
        let id = Uuid::new_v4();
        let stray = format!("{id}_5");
        let foreign = format!("{}_5", Uuid::new_v4());
        let response = trigger_plans(
            reminder_json(id, r#"{"kind":"weekly","interval_weeks":1,"weekdays":[2,4]}"#, "notification", false),
            registered(&[stray.clone(), foreign]),
            Vec::new(),
            "2026-01-05".to_string(),
        );

        assert!(response.ok, "{}", response.message);
        assert_eq!(response.notification.cancel, vec![stray]);
        let keys = response
            .notification
            .create
            .iter()
            .map(|item| item.key.clone())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec![format!("{id}_2"), format!("{id}_4")]);
        assert!(response.notification.create.iter().all(|item| item.kind == "every_week"));
        assert_eq!(response.alarm, BackendPlan::default());
        assert!(trigger_plan_is_current(id.to_string(), response.generation));
    }

    #[test]
    fn delivery_switch_plans_both_backends_under_one_generation() {
        let id = Uuid::new_v4();
        let response = trigger_plans(
            reminder_json(id, r#"{"kind":"weekly","interval_weeks":1,"weekdays":[2]}"#, "notification", false),
            Vec::new(),
            registered(&[format!("{id}_2")]),
            "2026-01-05".to_string(),
        );

        assert!(response.ok, "{}", response.message);
        assert_eq!(response.alarm.cancel, vec![format!("{id}_2")]);
        assert!(response.alarm.create.is_empty());
        assert_eq!(response.notification.create.len(), 1);
        assert!(trigger_plan_is_current(id.to_string(), response.generation));

        assert!(trigger_plan_finish(id.to_string(), response.generation));
        assert!(!trigger_plan_is_current(id.to_string(), response.generation));
        assert!(!trigger_plan_finish(id.to_string(), response.generation));
    }

    #[test]
    fn later_plan_supersedes_earlier_one_for_same_reminder() {
        let id = Uuid::new_v4();
        let keys = registered(&[format!("{id}_2")]);

        let live = trigger_plans(
            reminder_json(id, BIWEEKLY_MONDAY, "notification", false),
            keys.clone(),
            Vec::new(),
            "2026-01-05".to_string(),
        );
        let deleted = trigger_plans(
            reminder_json(id, BIWEEKLY_MONDAY, "notification", true),
            keys,
            Vec::new(),
            "2026-01-05".to_string(),
        );
        assert!(deleted.notification.create.is_empty());
        assert_eq!(deleted.notification.cancel.len(), 1);

        assert!(!trigger_plan_is_current(id.to_string(), live.generation));
        assert!(trigger_plan_is_current(id.to_string(), deleted.generation));
    }

    #[test]
    fn trigger_plans_reject_malformed_input() {
        let id = Uuid::new_v4();
        let response = trigger_plans(
            reminder_json(id, r#"{"kind":"once"}"#, "notification", false),
            Vec::new(),
            Vec::new(),
            "01/01/2026".to_string(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("today must be YYYY-MM-DD"));

        let response = trigger_plans("{}".to_string(), Vec::new(), Vec::new(), "2026-01-01".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid reminder"));
        assert!(!trigger_plan_is_current("not-a-uuid".to_string(), 1));
    }
}
