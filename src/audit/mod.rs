//! Audit logging system
//!
//! Records every create, update, and delete - including every stock
//! movement - with before/after values in an append-only JSONL log. The log
//! is also where commit-recovery warnings land, so a failed compensation is
//! never silent.

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
