//! Scheduling backend contract.
//!
//! Implemented by the app's notification-center and alarm-manager adapters.
//! The core only decides which triggers should exist; delivery mechanics and
//! native trigger types stay behind this trait.

use crate::model::reminder::Reminder;
use crate::trigger::descriptor::{RegisteredTrigger, TriggerDescriptor};
use crate::trigger::key::StableKey;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Backend call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendOperation {
    Query,
    Cancel,
    Create,
}

impl BackendOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Cancel => "cancel",
            Self::Create => "create",
        }
    }
}

/// Failure reported by a scheduling backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub backend_id: String,
    pub operation: BackendOperation,
    pub message: String,
}

impl BackendError {
    pub fn new(
        backend_id: impl Into<String>,
        operation: BackendOperation,
        message: impl Into<String>,
    ) -> Self {
        Self {
            backend_id: backend_id.into(),
            operation,
            message: message.into(),
        }
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "backend `{}` {} failed: {}",
            self.backend_id,
            self.operation.as_str(),
            self.message
        )
    }
}

impl Error for BackendError {}

/// OS-level trigger registry adapter.
///
/// `cancel` and `create` must be idempotent by key: cancelling an unknown key
/// is a no-op, creating an existing key overwrites it.
pub trait TriggerBackend {
    /// Stable backend id for diagnostics (`notification`, `alarm`, ...).
    fn backend_id(&self) -> &str;

    /// Every trigger currently registered by this app.
    fn registered(&self) -> Result<Vec<RegisteredTrigger>, BackendError>;

    fn cancel(&self, keys: &BTreeSet<StableKey>) -> Result<(), BackendError>;

    /// Registers one trigger; `reminder` supplies title and snooze for the
    /// native payload.
    fn create(&self, reminder: &Reminder, descriptor: &TriggerDescriptor)
        -> Result<(), BackendError>;
}
