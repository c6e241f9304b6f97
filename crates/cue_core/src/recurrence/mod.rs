//! Recurrence rules and the single recurrence engine.
//!
//! # Responsibility
//! - Define validated recurrence input (`RecurrenceRule`, `Anchor`).
//! - Answer calendar membership and due-date enumeration for every caller
//!   (calendar rendering, notification triggers, alarm validation).
//!
//! # Invariants
//! - All recurrence semantics live in `engine`; other modules never
//!   re-implement week or month math.

pub mod anchor;
pub mod engine;
pub mod rule;
pub mod weekday;
pub mod window;
