//! Per-reminder reconciliation ordering.
//!
//! Plans for one reminder must be applied as a unit, and a plan computed
//! before a newer mutation of the same reminder must never be applied after
//! it. A plan carries the generation it was computed under and is dropped if
//! a newer one started meanwhile.
//!
//! # Invariants
//! - Generations come from one gate-wide counter and are never reused, so a
//!   reminder's entry can be evicted without reviving old tickets.
//! - Only reminders with an unfinished plan hold an entry.

use crate::model::reminder::ReminderId;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Proof of which generation a plan was computed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileTicket {
    pub reminder_id: ReminderId,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct Generations {
    last: u64,
    current: HashMap<ReminderId, u64>,
}

/// Newest outstanding generation per reminder.
#[derive(Debug, Default)]
pub struct ReconcileGate {
    generations: Mutex<Generations>,
}

impl ReconcileGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation for `reminder_id`, superseding older tickets.
    pub fn begin(&self, reminder_id: ReminderId) -> ReconcileTicket {
        let mut generations = self.lock();
        generations.last += 1;
        let generation = generations.last;
        generations.current.insert(reminder_id, generation);
        ReconcileTicket {
            reminder_id,
            generation,
        }
    }

    /// Supersedes every outstanding ticket for `reminder_id`.
    pub fn invalidate(&self, reminder_id: ReminderId) {
        self.lock().current.remove(&reminder_id);
    }

    pub fn is_current(&self, ticket: &ReconcileTicket) -> bool {
        self.lock().current.get(&ticket.reminder_id).copied() == Some(ticket.generation)
    }

    /// Releases `ticket` once its plan was applied.
    ///
    /// Returns `false` and keeps the newer entry when `ticket` is stale.
    pub fn finish(&self, ticket: &ReconcileTicket) -> bool {
        let mut generations = self.lock();
        if generations.current.get(&ticket.reminder_id).copied() != Some(ticket.generation) {
            return false;
        }
        generations.current.remove(&ticket.reminder_id);
        true
    }

    /// Runs `apply` if `ticket` is still the newest for its reminder, then
    /// releases it.
    ///
    /// Returns `None` when the ticket is stale. Application is serialized
    /// under the gate lock, so no other commit interleaves with it.
    pub fn commit<T>(&self, ticket: &ReconcileTicket, apply: impl FnOnce() -> T) -> Option<T> {
        let mut generations = self.lock();
        if generations.current.get(&ticket.reminder_id).copied() != Some(ticket.generation) {
            return None;
        }
        let result = apply();
        generations.current.remove(&ticket.reminder_id);
        drop(generations);
        Some(result)
    }

    /// Reminders with an unfinished plan.
    pub fn pending(&self) -> usize {
        self.lock().current.len()
    }

    fn lock(&self) -> MutexGuard<'_, Generations> {
        // Counters stay consistent even if an apply closure panicked.
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
