//! In-app reminder confirmation surface.
//!
//! # Responsibility
//! - Hold the single "currently due" reminder shown to the user.
//! - Silence the alert channel on every way the dialog can close.
//!
//! # Invariants
//! - At most one `ReminderEvent` is open; opening another replaces it.
//!   Overlapping reminders are not queued for sequential review.
//! - Closing by any path (taken, decline, dismissal) stops the alert.

use crate::model::medication::{Medication, MedicationId};
use crate::reminder::alert::AlertChannel;
use chrono::NaiveDateTime;
use log::info;

/// The due medication presented for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEvent {
    pub medication_id: MedicationId,
    pub name: String,
    pub dosage: String,
    pub instructions: Option<String>,
    pub fired_at: NaiveDateTime,
}

impl ReminderEvent {
    pub fn for_medication(medication: &Medication, fired_at: NaiveDateTime) -> Self {
        Self {
            medication_id: medication.id.clone(),
            name: medication.name.clone(),
            dosage: medication.dosage.clone(),
            instructions: medication.instructions.clone(),
            fired_at,
        }
    }
}

/// User action on the open dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Taken,
    Decline,
}

/// How the open dialog was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResolution {
    /// Caller must run the acknowledge path for this medication.
    Taken(MedicationId),
    Declined(MedicationId),
    Dismissed(MedicationId),
}

/// Single-slot confirmation dialog state.
#[derive(Debug, Default)]
pub struct ConfirmationSurface {
    current: Option<ReminderEvent>,
}

impl ConfirmationSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `event`, returning the event it replaced, if any.
    pub fn open(&mut self, event: ReminderEvent) -> Option<ReminderEvent> {
        let previous = self.current.replace(event);
        if let Some(previous) = previous.as_ref() {
            info!(
                "event=reminder_dialog module=reminder status=replaced previous_id={}",
                previous.medication_id
            );
        }
        previous
    }

    pub fn current(&self) -> Option<&ReminderEvent> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn respond(
        &mut self,
        action: DialogAction,
        alert: &mut dyn AlertChannel,
    ) -> Option<DialogResolution> {
        alert.stop();
        let event = self.current.take()?;
        info!(
            "event=reminder_dialog module=reminder status=closed action={:?} medication_id={}",
            action, event.medication_id
        );
        Some(match action {
            DialogAction::Taken => DialogResolution::Taken(event.medication_id),
            DialogAction::Decline => DialogResolution::Declined(event.medication_id),
        })
    }

    /// Closes without a user choice; the alert still stops.
    pub fn dismiss(&mut self, alert: &mut dyn AlertChannel) -> Option<DialogResolution> {
        alert.stop();
        let event = self.current.take()?;
        info!(
            "event=reminder_dialog module=reminder status=dismissed medication_id={}",
            event.medication_id
        );
        Some(DialogResolution::Dismissed(event.medication_id))
    }

    /// Closes the dialog only if it currently shows `medication_id`.
    pub fn close_for(&mut self, medication_id: &MedicationId, alert: &mut dyn AlertChannel) -> bool {
        let showing = self
            .current
            .as_ref()
            .is_some_and(|event| &event.medication_id == medication_id);
        if showing {
            self.dismiss(alert);
        }
        showing
    }
}
