//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate stores and the reminder scheduler into use-case APIs.
//! - Keep UI/FFI layers decoupled from storage and timer details.

pub mod medication_service;
