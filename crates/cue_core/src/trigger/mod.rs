//! Trigger descriptors handed to notification and alarm backends.
//!
//! # Responsibility
//! - Derive deterministic trigger keys from reminder id + discriminator.
//! - Expand recurrence rules into backend-neutral trigger descriptors.
//!
//! # Invariants
//! - Recomputing from the same rule yields the same key set, which is what
//!   makes key-based reconciliation possible.

pub mod descriptor;
pub mod generator;
pub mod key;
