//! Core domain logic for Cue reminders.
//! This crate is the single source of truth for recurrence and trigger
//! scheduling invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod recurrence;
pub mod service;
pub mod trigger;

pub use config::{ConfigError, SchedulingConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::reminder::{DeliveryMode, Reminder, ReminderId, ReminderValidationError};
pub use reconcile::gate::{ReconcileGate, ReconcileTicket};
pub use reconcile::planner::{reconcile, reconcile_keys, ReconciliationPlan};
pub use recurrence::anchor::{Anchor, DueInstance};
pub use recurrence::engine::{DueDates, RecurrenceEngine};
pub use recurrence::rule::{InvalidRuleError, MonthlyRule, RecurrenceRule, WeeklyRule};
pub use recurrence::weekday::Weekday;
pub use recurrence::window::DateWindow;
pub use service::backend::{BackendError, BackendOperation, TriggerBackend};
pub use service::schedule_service::{
    plan_backends, ReminderPlans, ScheduleError, ScheduleService, SyncReport,
};
pub use trigger::descriptor::{RegisteredTrigger, TriggerDescriptor, TriggerSchedule};
pub use trigger::generator::{TriggerGenerator, TriggerHorizon};
pub use trigger::key::StableKey;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
