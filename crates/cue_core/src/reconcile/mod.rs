//! Reconciliation of desired triggers against backend state.
//!
//! # Responsibility
//! - Diff desired trigger descriptors against what a backend has registered.
//! - Order plan application per reminder so stale plans are discarded.
//!
//! # Invariants
//! - Planning never fails; an unreadable backend is planned against as an
//!   empty registered set by the caller.

pub mod gate;
pub mod planner;
