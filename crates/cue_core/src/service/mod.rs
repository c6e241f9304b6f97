//! Scheduling use-case services.
//!
//! # Responsibility
//! - Orchestrate generation, reconciliation and backend application into
//!   use-case level APIs (sync, remove, refresh).
//! - Keep FFI/app layers decoupled from planning details.

pub mod backend;
pub mod schedule_service;
