//! Domain records owned by core.
//!
//! # Invariants
//! - Every record carries a stable UUID that is never reused.

pub mod health_metric;
pub mod medication;
