//! Medication use-case service.
//!
//! # Responsibility
//! - Apply medication list mutations and rebuild reminders after each one.
//! - Own the session lifecycle: permission pre-flight on sign-in, full
//!   reminder teardown on sign-out.
//! - Route dialog and notification actions into the acknowledge path.
//!
//! # Invariants
//! - Reminders are only armed while a session is active.
//! - Deleting a medication cancels its timer before the list changes.
//! - User feedback goes through the toast sink; medication names never
//!   reach the log.

use crate::clock::Clock;
use crate::model::medication::{Medication, MedicationDraft, MedicationId};
use crate::reminder::alert::AlertChannel;
use crate::reminder::dialog::{DialogAction, DialogResolution, ReminderEvent};
use crate::reminder::permission::PermissionCheck;
use crate::reminder::platform::{NotificationPlatform, ReminderNotification, ToastLevel, ToastSink};
use crate::reminder::scheduler::{RebuildSummary, ReminderScheduler};
use crate::repo::kv_store::KeyValueStore;
use crate::repo::medication_store::MedicationStore;
use crate::repo::RepoError;
use chrono::NaiveDateTime;
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const SOUND_ENABLED_KEY: &str = "sound_enabled";

const PERMISSION_GRANTED_MESSAGE: &str =
    "Notification permissions granted! You will receive reminders when medications are due.";
const PERMISSION_MISSING_MESSAGE: &str =
    "Please enable notifications to receive medication reminders";
const PERMISSION_FAILED_MESSAGE: &str =
    "Failed to enable notifications. Please check your browser settings.";

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    MedicationNotFound(MedicationId),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MedicationNotFound(id) => write!(f, "medication not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::MedicationNotFound(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::MedicationNotFound(MedicationId::from(id)),
            other => Self::Repo(other),
        }
    }
}

/// Medication list, reminder scheduler and session state in one place.
pub struct MedicationService<S, N, A, T, C>
where
    S: KeyValueStore,
    N: NotificationPlatform,
    A: AlertChannel,
    T: ToastSink,
    C: Clock,
{
    store: MedicationStore<S>,
    scheduler: ReminderScheduler<N, A>,
    toasts: T,
    clock: C,
    signed_in: bool,
    /// Who asked for the prompt still on screen.
    pending_feedback: Option<PermissionFeedback>,
}

impl<S, N, A, T, C> MedicationService<S, N, A, T, C>
where
    S: KeyValueStore,
    N: NotificationPlatform,
    A: AlertChannel,
    T: ToastSink,
    C: Clock,
{
    /// Wires the service and applies the stored sound preference.
    pub fn new(
        store: MedicationStore<S>,
        mut scheduler: ReminderScheduler<N, A>,
        toasts: T,
        clock: C,
    ) -> Self {
        scheduler
            .alert_mut()
            .set_sound_enabled(load_sound_enabled(store.kv()));
        Self {
            store,
            scheduler,
            toasts,
            clock,
            signed_in: false,
            pending_feedback: None,
        }
    }

    /// Starts a session and runs the once-per-session permission check.
    ///
    /// Signing in again while a session is active only reports the current
    /// permission state.
    pub fn sign_in(&mut self) -> PermissionCheck {
        if self.signed_in {
            info!("event=session_start module=service status=skip reason=already_signed_in");
            return self.scheduler.ensure_permission();
        }
        self.signed_in = true;
        info!("event=session_start module=service status=ok");
        let check = self.scheduler.ensure_permission();
        self.apply_permission(check, PermissionFeedback::SessionStart);
        check
    }

    /// Ends the session: every timer is cancelled, the alert stops.
    pub fn sign_out(&mut self) {
        self.signed_in = false;
        self.pending_feedback = None;
        self.scheduler.teardown();
        info!("event=session_end module=service status=ok");
    }

    /// Host callback for an answered permission prompt.
    pub fn permission_resolved(&mut self, granted: bool) -> PermissionCheck {
        let check = self.scheduler.resolve_permission(granted);
        let feedback = self
            .pending_feedback
            .take()
            .unwrap_or(PermissionFeedback::SessionStart);
        if self.signed_in {
            self.apply_permission(check, feedback);
        }
        check
    }

    /// Explicit re-prompt from settings.
    pub fn request_notifications(&mut self) -> PermissionCheck {
        let check = self.scheduler.request_permission_explicitly();
        self.apply_permission(check, PermissionFeedback::Settings);
        check
    }

    pub fn add_medication(&mut self, draft: MedicationDraft) -> ServiceResult<Medication> {
        let medication = self.store.add(draft)?;
        self.toast(
            ToastLevel::Success,
            &format!("Added {} to your medication list", medication.name),
        );
        if self.signed_in && !self.scheduler.permission_granted() {
            let check = self.scheduler.ensure_permission();
            self.apply_permission(check, PermissionFeedback::Quiet);
        }
        self.rebuild();
        Ok(medication)
    }

    pub fn update_medication(
        &mut self,
        id: &MedicationId,
        draft: MedicationDraft,
    ) -> ServiceResult<Medication> {
        let medication = self.store.update(id, draft)?;
        self.toast(ToastLevel::Success, &format!("Updated {}", medication.name));
        self.rebuild();
        Ok(medication)
    }

    pub fn delete_medication(&mut self, id: &MedicationId) -> ServiceResult<Medication> {
        if self.store.get(id).is_none() {
            return Err(ServiceError::MedicationNotFound(id.clone()));
        }
        self.scheduler.cancel(id);
        let removed = self.store.delete(id)?;
        if self
            .scheduler
            .current_reminder()
            .is_some_and(|event| &event.medication_id == id)
        {
            self.scheduler.dismiss();
        }
        self.toast(
            ToastLevel::Success,
            &format!("Removed {} from your medication list", removed.name),
        );
        self.rebuild();
        Ok(removed)
    }

    /// Toggles acknowledged-today; a second call undoes the first.
    pub fn mark_taken(&mut self, id: &MedicationId) -> ServiceResult<Medication> {
        let medication = self.store.toggle_acknowledged(id)?;
        if medication.acknowledged_today {
            self.scheduler.stop_alert();
            self.toast(
                ToastLevel::Success,
                &format!("Marked {} as taken", medication.name),
            );
        } else {
            self.toast(ToastLevel::Info, &format!("Unmarked {}", medication.name));
        }
        self.rebuild();
        Ok(medication)
    }

    /// Applies the user's choice on the open reminder dialog.
    pub fn respond_to_reminder(
        &mut self,
        action: DialogAction,
    ) -> ServiceResult<Option<DialogResolution>> {
        let resolution = self.scheduler.respond(action);
        if let Some(DialogResolution::Taken(id)) = &resolution {
            self.acknowledge_if_present(id)?;
        }
        Ok(resolution)
    }

    /// Closes the dialog without a choice; the alert still stops.
    pub fn dismiss_reminder(&mut self) -> Option<DialogResolution> {
        self.scheduler.dismiss()
    }

    /// Click on a delivered notification: same path as "Taken".
    pub fn notification_clicked(&mut self, id: &MedicationId) -> ServiceResult<()> {
        self.scheduler.notification_clicked(id);
        self.acknowledge_if_present(id)
    }

    /// Event-loop turn: drives the alert cadence and fires due reminders.
    pub fn tick(&mut self) -> Vec<ReminderEvent> {
        let now = self.clock.now();
        let fired = self.scheduler.tick(self.store.list(), now);
        for event in &fired {
            let message = format!("Time to take {}", event.name);
            self.toasts.toast(ToastLevel::Info, &message);
        }
        fired
    }

    /// Full recompute of the reminder set from the current list.
    pub fn rebuild(&mut self) -> RebuildSummary {
        let now = self.clock.now();
        self.scheduler
            .rebuild(self.store.list(), self.signed_in, now)
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) -> ServiceResult<()> {
        self.store
            .kv()
            .put(SOUND_ENABLED_KEY, if enabled { "true" } else { "false" })?;
        self.scheduler.alert_mut().set_sound_enabled(enabled);
        let message = if enabled {
            "Sound alerts enabled"
        } else {
            "Sound alerts disabled"
        };
        self.toast(ToastLevel::Success, message);
        Ok(())
    }

    pub fn sound_enabled(&self) -> bool {
        self.scheduler.alert().sound_enabled()
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    pub fn medications(&self) -> &[Medication] {
        self.store.list()
    }

    /// Medications relevant today. Every schedule is daily, so this is
    /// the whole list.
    pub fn today_medications(&self) -> Vec<&Medication> {
        self.store.list().iter().collect()
    }

    pub fn scheduled_reminders(&self) -> BTreeMap<MedicationId, NaiveDateTime> {
        self.scheduler.pending_timers()
    }

    pub fn current_reminder(&self) -> Option<&ReminderEvent> {
        self.scheduler.current_reminder()
    }

    pub fn next_wakeup(&self) -> Option<NaiveDateTime> {
        self.scheduler.next_wakeup()
    }

    pub fn scheduler(&self) -> &ReminderScheduler<N, A> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut ReminderScheduler<N, A> {
        &mut self.scheduler
    }

    pub fn toasts(&self) -> &T {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut T {
        &mut self.toasts
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn acknowledge_if_present(&mut self, id: &MedicationId) -> ServiceResult<()> {
        match self.mark_taken(id) {
            Ok(_) => Ok(()),
            Err(ServiceError::MedicationNotFound(_)) => {
                info!(
                    "event=reminder_ack module=service status=skip reason=stale medication_id={}",
                    id
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn apply_permission(&mut self, check: PermissionCheck, feedback: PermissionFeedback) {
        match check {
            PermissionCheck::Granted => {
                self.rebuild();
                match feedback {
                    // Already-granted platforms were never prompted: stay quiet.
                    PermissionFeedback::SessionStart if !self.scheduler.has_asked_permission() => {}
                    PermissionFeedback::SessionStart => {
                        self.toast(ToastLevel::Success, PERMISSION_GRANTED_MESSAGE);
                        self.send_setup_notification();
                    }
                    PermissionFeedback::Settings => {
                        self.toast(ToastLevel::Success, "Notification permissions granted!");
                    }
                    PermissionFeedback::Quiet => {}
                }
            }
            PermissionCheck::Denied | PermissionCheck::Unsupported => {
                self.rebuild();
                match feedback {
                    PermissionFeedback::SessionStart => {
                        self.toast(ToastLevel::Warning, PERMISSION_MISSING_MESSAGE)
                    }
                    PermissionFeedback::Settings => {
                        self.toast(ToastLevel::Error, PERMISSION_FAILED_MESSAGE)
                    }
                    PermissionFeedback::Quiet => {}
                }
            }
            PermissionCheck::Pending => {
                // An explicit request takes over a prompt that is already up.
                if feedback == PermissionFeedback::Settings || self.pending_feedback.is_none() {
                    self.pending_feedback = Some(feedback);
                }
                info!(
                    "event=permission_check module=service status=pending origin={:?}",
                    feedback
                );
            }
        }
    }

    fn send_setup_notification(&mut self) {
        if !self.scheduler.config().setup_notification {
            return;
        }
        let notification = ReminderNotification {
            title: "Medication Reminder Setup".to_string(),
            body: "You will now receive alerts when it's time to take your medication"
                .to_string(),
            icon: self.scheduler.config().notification_icon.clone(),
            require_interaction: false,
            medication_id: None,
        };
        self.scheduler.send_notification(notification);
    }

    fn toast(&mut self, level: ToastLevel, message: &str) {
        self.toasts.toast(level, message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PermissionFeedback {
    SessionStart,
    Settings,
    /// Background re-check after adding a medication: rebuild only.
    Quiet,
}

fn load_sound_enabled(kv: &impl KeyValueStore) -> bool {
    match kv.get(SOUND_ENABLED_KEY) {
        Ok(Some(value)) => value != "false",
        Ok(None) => true,
        Err(err) => {
            warn!(
                "event=settings_load module=service status=error key={} error={}",
                SOUND_ENABLED_KEY, err
            );
            true
        }
    }
}
