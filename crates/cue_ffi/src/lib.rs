//! Flutter bridge crate for the Cue reminders core.

pub mod api;
