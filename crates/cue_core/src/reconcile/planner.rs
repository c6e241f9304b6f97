//! Desired-vs-registered trigger diff.
//!
//! # Responsibility
//! - Compute the minimal cancel/create plan that moves a backend from its
//!   registered trigger set to the desired one.
//!
//! # Invariants
//! - Pure function of its inputs; nothing is retained between calls.
//! - A registered key absent from the desired set is cancelled.
//! - A registered key whose reported descriptor differs from the desired
//!   one is both cancelled and re-created.
//! - Applying a plan (cancel, then create) and planning again against the
//!   result yields an empty plan.

use crate::trigger::descriptor::{RegisteredTrigger, TriggerDescriptor};
use crate::trigger::key::StableKey;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Cancel/create operations for a scheduling backend.
///
/// Applied as one unit: every `cancel` first, then every `create`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationPlan {
    pub create: BTreeSet<TriggerDescriptor>,
    pub cancel: BTreeSet<StableKey>,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.cancel.is_empty()
    }

    /// Applies the plan to a registered key set the way a backend would.
    ///
    /// Idempotent: applying the same plan twice leaves the set unchanged the
    /// second time.
    pub fn apply_to(&self, registered: &mut BTreeSet<StableKey>) {
        for key in &self.cancel {
            registered.remove(key);
        }
        for descriptor in &self.create {
            registered.insert(descriptor.key.clone());
        }
    }

    /// Cancel-only copy, used when the reminder was deleted while its plan
    /// was being computed.
    pub fn without_creates(&self) -> Self {
        Self {
            create: BTreeSet::new(),
            cancel: self.cancel.clone(),
        }
    }
}

/// Plans against backend-reported triggers, comparing full descriptors when
/// the backend reports them.
pub fn reconcile(
    desired: &BTreeSet<TriggerDescriptor>,
    registered: &[RegisteredTrigger],
) -> ReconciliationPlan {
    let desired_by_key = desired
        .iter()
        .map(|descriptor| (&descriptor.key, descriptor))
        .collect::<BTreeMap<_, _>>();

    let mut plan = ReconciliationPlan::default();
    let mut registered_keys = BTreeSet::new();

    for entry in registered {
        registered_keys.insert(&entry.key);
        match desired_by_key.get(&entry.key) {
            None => {
                plan.cancel.insert(entry.key.clone());
            }
            Some(wanted) => {
                let drifted = entry
                    .descriptor
                    .as_ref()
                    .is_some_and(|reported| reported != *wanted);
                if drifted {
                    plan.cancel.insert(entry.key.clone());
                    plan.create.insert((*wanted).clone());
                }
            }
        }
    }

    for (key, descriptor) in desired_by_key {
        if !registered_keys.contains(key) {
            plan.create.insert(descriptor.clone());
        }
    }

    debug!(
        "event=reconcile_planned module=reconcile desired={} registered={} create={} cancel={}",
        desired.len(),
        registered.len(),
        plan.create.len(),
        plan.cancel.len()
    );
    plan
}

/// Plans against a bare registered key set.
///
/// A key present on both sides is kept as-is.
pub fn reconcile_keys(
    desired: &BTreeSet<TriggerDescriptor>,
    registered: &BTreeSet<StableKey>,
) -> ReconciliationPlan {
    let registered = registered
        .iter()
        .cloned()
        .map(RegisteredTrigger::key_only)
        .collect::<Vec<_>>();
    reconcile(desired, &registered)
}
