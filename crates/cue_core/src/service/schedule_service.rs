//! Reminder scheduling use-case service.
//!
//! # Responsibility
//! - Turn reminder mutations into applied trigger plans on the notification
//!   and alarm backends.
//! - Roll interval-week horizons forward on periodic refresh.
//!
//! # Invariants
//! - Backends are injected; the service holds no global state.
//! - A reminder's triggers live only in the backend matching its delivery
//!   mode; the other backend is planned against an empty desired set.
//! - An unreadable registered set is treated as empty, never as an error.
//! - Plans for one reminder are applied cancel-then-create under a
//!   generation ticket; stale plans are discarded unapplied.

use crate::config::SchedulingConfig;
use crate::model::reminder::{DeliveryMode, Reminder, ReminderId};
use crate::reconcile::gate::{ReconcileGate, ReconcileTicket};
use crate::reconcile::planner::{reconcile, ReconciliationPlan};
use crate::service::backend::{BackendError, TriggerBackend};
use crate::trigger::descriptor::RegisteredTrigger;
use crate::trigger::generator::{TriggerGenerator, TriggerHorizon};
use crate::trigger::key::StableKey;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::{BTreeSet, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for scheduling use-cases.
#[derive(Debug)]
pub enum ScheduleError {
    /// A backend rejected a cancel/create call.
    Backend(BackendError),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ScheduleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
        }
    }
}

impl From<BackendError> for ScheduleError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

/// Plans for both backends computed for one reminder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderPlans {
    pub notification: ReconciliationPlan,
    pub alarm: ReconciliationPlan,
}

impl ReminderPlans {
    pub fn is_empty(&self) -> bool {
        self.notification.is_empty() && self.alarm.is_empty()
    }
}

/// Outcome of one reminder synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub reminder_id: ReminderId,
    pub created: usize,
    pub cancelled: usize,
    /// A newer mutation of the same reminder superseded this plan.
    pub discarded: bool,
}

impl SyncReport {
    fn discarded(reminder_id: ReminderId) -> Self {
        Self {
            reminder_id,
            created: 0,
            cancelled: 0,
            discarded: true,
        }
    }
}

/// Scheduling facade over notification and alarm backends.
pub struct ScheduleService<N: TriggerBackend, A: TriggerBackend> {
    notifications: N,
    alarms: A,
    config: SchedulingConfig,
    generator: TriggerGenerator,
    gate: ReconcileGate,
}

impl<N: TriggerBackend, A: TriggerBackend> ScheduleService<N, A> {
    pub fn new(notifications: N, alarms: A, config: SchedulingConfig) -> Self {
        Self {
            notifications,
            alarms,
            generator: config.generator(),
            config,
            gate: ReconcileGate::new(),
        }
    }

    pub fn notifications(&self) -> &N {
        &self.notifications
    }

    pub fn alarms(&self) -> &A {
        &self.alarms
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    pub fn gate(&self) -> &ReconcileGate {
        &self.gate
    }

    /// Computes, without applying, the plans that would bring both backends
    /// in line with `reminder` as of `today`.
    pub fn plan_reminder(&self, reminder: &Reminder, today: NaiveDate) -> ReminderPlans {
        plan_backends(
            &self.generator,
            self.config.horizon(today),
            reminder,
            &registered_for(&self.notifications, reminder.id),
            &registered_for(&self.alarms, reminder.id),
        )
    }

    /// Reconciles one created/updated/deleted reminder.
    pub fn sync_reminder(
        &self,
        reminder: &Reminder,
        today: NaiveDate,
    ) -> Result<SyncReport, ScheduleError> {
        let ticket = self.gate.begin(reminder.id);
        let plans = self.plan_reminder(reminder, today);
        self.commit(&ticket, &plans, Some(reminder))
    }

    /// Cancels every trigger of a reminder that no longer exists.
    ///
    /// Supersedes any in-flight sync of the same reminder.
    pub fn remove_reminder(&self, reminder_id: ReminderId) -> Result<SyncReport, ScheduleError> {
        let ticket = self.gate.begin(reminder_id);
        let nothing = BTreeSet::new();
        let plans = ReminderPlans {
            notification: reconcile(&nothing, &registered_for(&self.notifications, reminder_id)),
            alarm: reconcile(&nothing, &registered_for(&self.alarms, reminder_id)),
        };
        self.commit(&ticket, &plans, None)
    }

    /// Periodic horizon refresh (e.g. app foreground).
    ///
    /// Syncs every supplied reminder, then cancels triggers owned by
    /// reminders absent from `reminders`.
    pub fn refresh_all(
        &self,
        reminders: &[Reminder],
        today: NaiveDate,
    ) -> Result<Vec<SyncReport>, ScheduleError> {
        let reports = reminders
            .iter()
            .map(|reminder| self.sync_reminder(reminder, today))
            .collect::<Result<Vec<_>, _>>()?;

        let known = reminders
            .iter()
            .map(|reminder| reminder.id)
            .collect::<HashSet<_>>();
        let orphans =
            cancel_orphans(&self.notifications, &known)? + cancel_orphans(&self.alarms, &known)?;

        info!(
            "event=schedule_refresh module=schedule status=ok reminders={} orphans_cancelled={}",
            reminders.len(),
            orphans
        );
        Ok(reports)
    }

    fn commit(
        &self,
        ticket: &ReconcileTicket,
        plans: &ReminderPlans,
        reminder: Option<&Reminder>,
    ) -> Result<SyncReport, ScheduleError> {
        let applied = self.gate.commit(ticket, || -> Result<SyncReport, ScheduleError> {
            let (created_n, cancelled_n) =
                apply_plan(&self.notifications, &plans.notification, reminder)?;
            let (created_a, cancelled_a) = apply_plan(&self.alarms, &plans.alarm, reminder)?;
            Ok(SyncReport {
                reminder_id: ticket.reminder_id,
                created: created_n + created_a,
                cancelled: cancelled_n + cancelled_a,
                discarded: false,
            })
        });

        match applied {
            Some(Ok(report)) => {
                info!(
                    "event=reminder_sync module=schedule status=ok reminder_id={} generation={} created={} cancelled={}",
                    report.reminder_id, ticket.generation, report.created, report.cancelled
                );
                Ok(report)
            }
            Some(Err(err)) => {
                warn!(
                    "event=reminder_sync module=schedule status=error reminder_id={} error={}",
                    ticket.reminder_id, err
                );
                Err(err)
            }
            None => {
                debug!(
                    "event=reminder_sync module=schedule status=discarded reminder_id={} generation={}",
                    ticket.reminder_id, ticket.generation
                );
                Ok(SyncReport::discarded(ticket.reminder_id))
            }
        }
    }
}

/// Plans both backends for one reminder snapshot.
///
/// Registered entries owned by other reminders are ignored, so a full
/// backend dump may be passed. The backend not matching the reminder's
/// delivery mode is planned against an empty desired set.
pub fn plan_backends(
    generator: &TriggerGenerator,
    horizon: TriggerHorizon,
    reminder: &Reminder,
    notifications: &[RegisteredTrigger],
    alarms: &[RegisteredTrigger],
) -> ReminderPlans {
    let desired = generator.generate_for(reminder, horizon);
    let (notification_desired, alarm_desired) = match reminder.delivery {
        DeliveryMode::Notification => (desired, BTreeSet::new()),
        DeliveryMode::Alarm => (BTreeSet::new(), desired),
    };
    let owned = |registered: &[RegisteredTrigger]| {
        registered
            .iter()
            .filter(|trigger| trigger.key.belongs_to(reminder.id))
            .cloned()
            .collect::<Vec<_>>()
    };

    ReminderPlans {
        notification: reconcile(&notification_desired, &owned(notifications)),
        alarm: reconcile(&alarm_desired, &owned(alarms)),
    }
}

/// Registered triggers of one reminder; empty when the backend cannot be read.
fn registered_for(backend: &impl TriggerBackend, reminder_id: ReminderId) -> Vec<RegisteredTrigger> {
    match backend.registered() {
        Ok(all) => all
            .into_iter()
            .filter(|trigger| trigger.key.belongs_to(reminder_id))
            .collect(),
        Err(err) => {
            warn!(
                "event=registered_query module=schedule status=fallback backend={} reminder_id={} error={}",
                backend.backend_id(),
                reminder_id,
                err
            );
            Vec::new()
        }
    }
}

/// Applies cancel then create. Returns `(created, cancelled)`.
///
/// Creates are skipped without a reminder snapshot (removal path).
fn apply_plan(
    backend: &impl TriggerBackend,
    plan: &ReconciliationPlan,
    reminder: Option<&Reminder>,
) -> Result<(usize, usize), BackendError> {
    if !plan.cancel.is_empty() {
        backend.cancel(&plan.cancel)?;
    }

    let mut created = 0;
    if let Some(reminder) = reminder {
        for descriptor in &plan.create {
            backend.create(reminder, descriptor)?;
            created += 1;
        }
    }
    Ok((created, plan.cancel.len()))
}

fn cancel_orphans(
    backend: &impl TriggerBackend,
    known: &HashSet<ReminderId>,
) -> Result<usize, ScheduleError> {
    let registered = match backend.registered() {
        Ok(registered) => registered,
        Err(err) => {
            warn!(
                "event=orphan_scan module=schedule status=skipped backend={} error={}",
                backend.backend_id(),
                err
            );
            return Ok(0);
        }
    };

    let orphans = registered
        .into_iter()
        .map(|trigger| trigger.key)
        .filter(|key| !key.reminder_id().is_some_and(|id| known.contains(&id)))
        .collect::<BTreeSet<StableKey>>();
    if !orphans.is_empty() {
        backend.cancel(&orphans)?;
    }
    Ok(orphans.len())
}
