//! Notification permission gate.
//!
//! # Responsibility
//! - Collapse platform permission query/request into a yes/no capability.
//! - Prompt at most once per session unless the user explicitly asks again.
//!
//! # Invariants
//! - Unsupported platforms are never prompted.
//! - Already-granted platforms are never prompted.
//! - `ensure_granted` issues at most one prompt per session.

use crate::reminder::platform::{NotificationPlatform, PermissionPrompt, PermissionState};
use log::{info, warn};

/// Result of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionCheck {
    Granted,
    Denied,
    Unsupported,
    /// A prompt is on screen; wait for `PermissionGate::resolve`.
    Pending,
}

impl PermissionCheck {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Session-scoped permission gate.
#[derive(Debug, Default)]
pub struct PermissionGate {
    asked_this_session: bool,
    awaiting_answer: bool,
}

impl PermissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks permission, prompting only if this session never asked.
    pub fn ensure_granted(&mut self, platform: &mut impl NotificationPlatform) -> PermissionCheck {
        if let Some(check) = Self::check_without_prompt(platform) {
            return check;
        }
        if self.asked_this_session {
            return if self.awaiting_answer {
                PermissionCheck::Pending
            } else {
                PermissionCheck::Denied
            };
        }
        self.prompt(platform)
    }

    /// Re-prompts on explicit user request (settings toggle).
    pub fn request_explicitly(
        &mut self,
        platform: &mut impl NotificationPlatform,
    ) -> PermissionCheck {
        if let Some(check) = Self::check_without_prompt(platform) {
            return check;
        }
        self.prompt(platform)
    }

    /// Records the user's answer for a pending prompt.
    pub fn resolve(&mut self, granted: bool) -> PermissionCheck {
        if !self.awaiting_answer {
            warn!("event=permission_resolve module=reminder status=skip reason=no_pending_prompt");
        }
        self.asked_this_session = true;
        self.awaiting_answer = false;
        info!(
            "event=permission_resolve module=reminder status=ok granted={}",
            granted
        );
        if granted {
            PermissionCheck::Granted
        } else {
            PermissionCheck::Denied
        }
    }

    /// Non-prompting check used before arming or sending.
    pub fn is_granted(&self, platform: &impl NotificationPlatform) -> bool {
        platform.is_supported() && platform.permission() == PermissionState::Granted
    }

    pub fn has_asked(&self) -> bool {
        self.asked_this_session
    }

    pub fn is_awaiting_answer(&self) -> bool {
        self.awaiting_answer
    }

    /// Forgets the session so the next sign-in may prompt again.
    pub fn reset(&mut self) {
        self.asked_this_session = false;
        self.awaiting_answer = false;
    }

    fn check_without_prompt(platform: &impl NotificationPlatform) -> Option<PermissionCheck> {
        if !platform.is_supported() {
            info!("event=permission_check module=reminder status=unsupported");
            return Some(PermissionCheck::Unsupported);
        }
        match platform.permission() {
            PermissionState::Granted => Some(PermissionCheck::Granted),
            PermissionState::Denied | PermissionState::Undecided => None,
        }
    }

    fn prompt(&mut self, platform: &mut impl NotificationPlatform) -> PermissionCheck {
        self.asked_this_session = true;
        info!("event=permission_prompt module=reminder status=start");
        match platform.request_permission() {
            PermissionPrompt::Resolved(PermissionState::Granted) => {
                self.awaiting_answer = false;
                PermissionCheck::Granted
            }
            PermissionPrompt::Resolved(_) => {
                self.awaiting_answer = false;
                PermissionCheck::Denied
            }
            PermissionPrompt::Pending => {
                self.awaiting_answer = true;
                PermissionCheck::Pending
            }
        }
    }
}
