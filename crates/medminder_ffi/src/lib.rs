//! Flutter-facing FFI surface for MedMinder.

pub mod api;
