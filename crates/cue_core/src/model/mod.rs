//! Domain snapshots consumed by the scheduling core.
//!
//! # Responsibility
//! - Define the reminder shape supplied by the app's persistence layer.
//!
//! # Invariants
//! - Every reminder is identified by a stable `ReminderId`.
//! - Deletion is represented by a tombstone flag, not by absence.

pub mod reminder;
