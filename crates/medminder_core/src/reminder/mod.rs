//! Client-side medication reminder subsystem.
//!
//! # Responsibility
//! - Turn daily medication times into one-shot timers.
//! - Coordinate notification permission, audible alert and the in-app
//!   confirmation dialog when a reminder fires.
//!
//! # Invariants
//! - Single event loop: the host drives time through `tick`, nothing here
//!   spawns threads or sleeps.
//! - Failures degrade toward "less loud" and are logged, never raised.

pub mod alert;
pub mod dialog;
pub mod permission;
pub mod platform;
pub mod scheduler;
pub mod time_of_day;
pub mod timer;
