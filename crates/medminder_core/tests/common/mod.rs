#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use medminder_core::{
    AlarmPlayer, DeliveryError, LoopingAlertChannel, Medication, MedicationDraft,
    NotificationPlatform, PermissionPrompt, PermissionState, PlaybackError,
    ReminderConfig, ReminderNotification, ReminderScheduler, ToastLevel, ToastSink,
};

pub type TestScheduler = ReminderScheduler<RecordingPlatform, LoopingAlertChannel<CountingPlayer>>;

/// Notification platform that records every prompt and delivery.
#[derive(Debug)]
pub struct RecordingPlatform {
    pub supported: bool,
    pub state: PermissionState,
    pub answer: PermissionPrompt,
    pub prompts: usize,
    pub sent: Vec<ReminderNotification>,
    pub fail_delivery: bool,
}

impl RecordingPlatform {
    pub fn granted() -> Self {
        Self::with_state(PermissionState::Granted, PermissionPrompt::Pending)
    }

    pub fn undecided(answer: PermissionPrompt) -> Self {
        Self::with_state(PermissionState::Undecided, answer)
    }

    pub fn unsupported() -> Self {
        let mut platform = Self::undecided(PermissionPrompt::Pending);
        platform.supported = false;
        platform
    }

    fn with_state(state: PermissionState, answer: PermissionPrompt) -> Self {
        Self {
            supported: true,
            state,
            answer,
            prompts: 0,
            sent: Vec::new(),
            fail_delivery: false,
        }
    }

    pub fn titles(&self) -> Vec<&str> {
        self.sent.iter().map(|n| n.title.as_str()).collect()
    }
}

impl NotificationPlatform for RecordingPlatform {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn permission(&self) -> PermissionState {
        self.state
    }

    fn request_permission(&mut self) -> PermissionPrompt {
        self.prompts += 1;
        if let PermissionPrompt::Resolved(state) = self.answer {
            self.state = state;
        }
        self.answer
    }

    fn send(&mut self, notification: &ReminderNotification) -> Result<(), DeliveryError> {
        if self.fail_delivery {
            return Err(DeliveryError::Platform("offline".to_string()));
        }
        self.sent.push(notification.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CountingPlayer {
    pub plays: usize,
    pub blocked: bool,
}

impl AlarmPlayer for CountingPlayer {
    fn play(&mut self) -> Result<(), PlaybackError> {
        self.plays += 1;
        if self.blocked {
            return Err(PlaybackError::Blocked);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingToasts {
    pub entries: Vec<(ToastLevel, String)>,
}

impl RecordingToasts {
    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, message)| message.as_str()).collect()
    }

    pub fn last(&self) -> Option<(ToastLevel, &str)> {
        self.entries
            .last()
            .map(|(level, message)| (*level, message.as_str()))
    }
}

impl ToastSink for RecordingToasts {
    fn toast(&mut self, level: ToastLevel, message: &str) {
        self.entries.push((level, message.to_string()));
    }
}

/// 2024-03-14 at the given local wall-clock time.
pub fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 14)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .unwrap()
}

pub fn medication(name: &str, time: &str) -> Medication {
    Medication::new(MedicationDraft::new(name, "500mg", time))
}

pub fn scheduler(platform: RecordingPlatform) -> TestScheduler {
    let config = ReminderConfig::default();
    let alert = LoopingAlertChannel::new(CountingPlayer::default(), &config);
    ReminderScheduler::new(platform, alert, config)
}
