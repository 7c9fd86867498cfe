//! Host platform seams used by the reminder subsystem.
//!
//! The core never talks to a browser, OS notification center or audio
//! device directly. Hosts implement these traits; tests substitute
//! recording fakes.

use crate::model::medication::MedicationId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Platform notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// User has not decided yet; asking will show a prompt.
    Undecided,
}

/// Outcome of issuing a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionPrompt {
    /// The platform answered synchronously.
    Resolved(PermissionState),
    /// The prompt is on screen; the host reports the answer later.
    Pending,
}

/// Payload for one platform notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    /// Ask the platform to keep the notification until dismissed.
    pub require_interaction: bool,
    /// Medication routed back through "mark taken" when clicked.
    pub medication_id: Option<MedicationId>,
}

/// Notification delivery failure reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    Unsupported,
    PermissionDenied,
    Platform(String),
}

impl Display for DeliveryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported => write!(f, "notifications are not supported on this platform"),
            Self::PermissionDenied => write!(f, "notification permission not granted"),
            Self::Platform(message) => write!(f, "notification delivery failed: {message}"),
        }
    }
}

impl Error for DeliveryError {}

/// Audio playback failure reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Platform refused autoplay.
    Blocked,
    Device(String),
}

impl Display for PlaybackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocked => write!(f, "audio playback blocked by platform"),
            Self::Device(message) => write!(f, "audio playback failed: {message}"),
        }
    }
}

impl Error for PlaybackError {}

/// Platform notification capability.
pub trait NotificationPlatform {
    fn is_supported(&self) -> bool;
    fn permission(&self) -> PermissionState;
    fn request_permission(&mut self) -> PermissionPrompt;
    fn send(&mut self, notification: &ReminderNotification) -> Result<(), DeliveryError>;
}

/// Single fire-and-forget alarm playback.
pub trait AlarmPlayer {
    fn play(&mut self) -> Result<(), PlaybackError>;
}

/// Severity of a user-facing toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// In-app toast surface.
pub trait ToastSink {
    fn toast(&mut self, level: ToastLevel, message: &str);
}
