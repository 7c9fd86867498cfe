//! Reminder scheduler state machine.
//!
//! # Responsibility
//! - Keep one pending timer per medication consistent with the current
//!   medication list and session state.
//! - At trigger time, raise a notification, start the alert channel and
//!   open the confirmation surface.
//!
//! # Invariants
//! - At most one `PendingTimer` per medication id.
//! - `rebuild` cancels every timer before arming new ones, in one call.
//! - A cancelled timer never fires.
//! - Cancelled (deleted) ids are never re-armed, even from a stale list.
//! - Timer handles never leave this module.
//!
//! ```text
//! unscheduled ──rebuild──► pending ──timer──► fired ──taken───► acknowledged
//!                             │                 └────decline──► declined
//!                             └──cancel/rebuild──► unscheduled
//! ```

use crate::config::ReminderConfig;
use crate::model::medication::{Medication, MedicationId};
use crate::reminder::alert::AlertChannel;
use crate::reminder::dialog::{
    ConfirmationSurface, DialogAction, DialogResolution, ReminderEvent,
};
use crate::reminder::permission::{PermissionCheck, PermissionGate};
use crate::reminder::platform::{NotificationPlatform, ReminderNotification};
use crate::reminder::timer::{TimerArena, TimerHandle};
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Armed, not-yet-fired reminder for one medication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    handle: TimerHandle,
    target: NaiveDateTime,
}

impl PendingTimer {
    pub fn target(&self) -> NaiveDateTime {
        self.target
    }
}

/// Why a rebuild armed nothing at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildBlock {
    SignedOut,
    PermissionNotGranted,
}

/// Per-rebuild accounting, mainly for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    pub cancelled: usize,
    pub armed: usize,
    pub skipped_acknowledged: usize,
    pub skipped_passed: usize,
    pub skipped_invalid: usize,
    pub skipped_deleted: usize,
    pub blocked: Option<RebuildBlock>,
}

/// Central reminder state machine.
pub struct ReminderScheduler<N: NotificationPlatform, A: AlertChannel> {
    platform: N,
    alert: A,
    gate: PermissionGate,
    surface: ConfirmationSurface,
    config: ReminderConfig,
    timers: TimerArena<MedicationId>,
    pending: HashMap<MedicationId, PendingTimer>,
    deleted: HashSet<MedicationId>,
}

impl<N: NotificationPlatform, A: AlertChannel> ReminderScheduler<N, A> {
    pub fn new(platform: N, alert: A, config: ReminderConfig) -> Self {
        Self {
            platform,
            alert,
            gate: PermissionGate::new(),
            surface: ConfirmationSurface::new(),
            config,
            timers: TimerArena::new(),
            pending: HashMap::new(),
            deleted: HashSet::new(),
        }
    }

    /// Replaces the whole timer set from `medications`.
    ///
    /// Arms only while authenticated with permission granted, and only for
    /// unacknowledged medications whose time is still ahead today.
    pub fn rebuild(
        &mut self,
        medications: &[Medication],
        is_authenticated: bool,
        now: NaiveDateTime,
    ) -> RebuildSummary {
        let mut summary = RebuildSummary {
            cancelled: self.cancel_all(),
            ..RebuildSummary::default()
        };

        if !is_authenticated {
            summary.blocked = Some(RebuildBlock::SignedOut);
        } else if !self.gate.is_granted(&self.platform) {
            summary.blocked = Some(RebuildBlock::PermissionNotGranted);
        }
        if let Some(block) = summary.blocked {
            info!(
                "event=reminder_rebuild module=reminder status=blocked reason={:?} cancelled={}",
                block, summary.cancelled
            );
            return summary;
        }

        for medication in medications {
            if self.deleted.contains(&medication.id) {
                summary.skipped_deleted += 1;
                continue;
            }
            if medication.acknowledged_today {
                summary.skipped_acknowledged += 1;
                continue;
            }
            let time = match medication.trigger_time() {
                Ok(time) => time,
                Err(err) => {
                    warn!(
                        "event=reminder_arm module=reminder status=skip reason=invalid_time medication_id={} error={}",
                        medication.id, err
                    );
                    summary.skipped_invalid += 1;
                    continue;
                }
            };
            let Some(target) = time.trigger_today(now) else {
                debug!(
                    "event=reminder_arm module=reminder status=skip reason=passed medication_id={}",
                    medication.id
                );
                summary.skipped_passed += 1;
                continue;
            };

            self.arm(medication.id.clone(), target);
            summary.armed += 1;
        }

        info!(
            "event=reminder_rebuild module=reminder status=ok cancelled={} armed={} acknowledged={} passed={} invalid={}",
            summary.cancelled,
            summary.armed,
            summary.skipped_acknowledged,
            summary.skipped_passed,
            summary.skipped_invalid
        );
        summary
    }

    /// Fires the reminder for `medication_id` against the current list.
    ///
    /// Returns `None` when the medication no longer exists.
    pub fn fire(
        &mut self,
        medication_id: &MedicationId,
        medications: &[Medication],
        now: NaiveDateTime,
    ) -> Option<ReminderEvent> {
        let medication = medications
            .iter()
            .find(|medication| &medication.id == medication_id)
            .filter(|_| !self.deleted.contains(medication_id));
        let Some(medication) = medication else {
            info!(
                "event=reminder_fire module=reminder status=skip reason=stale medication_id={}",
                medication_id
            );
            return None;
        };

        let notification = reminder_notification(medication, &self.config);
        self.send_notification(notification);

        let event = ReminderEvent::for_medication(medication, now);
        if self.surface.open(event.clone()).is_some() {
            // The new subject gets its own full alert window.
            self.alert.stop();
        }
        self.alert.start(now);

        info!(
            "event=reminder_fire module=reminder status=ok medication_id={}",
            medication_id
        );
        Some(event)
    }

    /// Cancels the pending timer for a deleted medication.
    ///
    /// The id is remembered so a later rebuild from a stale list cannot
    /// re-arm it. Ids are never reused, so this never hides a new record.
    pub fn cancel(&mut self, medication_id: &MedicationId) -> bool {
        self.deleted.insert(medication_id.clone());
        let Some(timer) = self.pending.remove(medication_id) else {
            return false;
        };
        self.timers.disarm(timer.handle);
        debug!(
            "event=reminder_cancel module=reminder status=ok medication_id={}",
            medication_id
        );
        true
    }

    /// Advances time: fires due reminders in deadline order and drives the
    /// alert cadence. Returns the events that fired.
    pub fn tick(&mut self, medications: &[Medication], now: NaiveDateTime) -> Vec<ReminderEvent> {
        self.alert.tick(now);

        let mut fired = Vec::new();
        for (handle, medication_id) in self.timers.take_due(now) {
            let owned = self
                .pending
                .get(&medication_id)
                .is_some_and(|timer| timer.handle == handle);
            if !owned {
                continue;
            }
            self.pending.remove(&medication_id);
            if let Some(event) = self.fire(&medication_id, medications, now) {
                fired.push(event);
            }
        }
        fired
    }

    /// Session teardown: cancel every timer, silence and close everything.
    pub fn teardown(&mut self) {
        let cancelled = self.cancel_all();
        self.alert.stop();
        self.surface.dismiss(&mut self.alert);
        self.gate.reset();
        info!(
            "event=reminder_teardown module=reminder status=ok cancelled={}",
            cancelled
        );
    }

    pub fn respond(&mut self, action: DialogAction) -> Option<DialogResolution> {
        self.surface.respond(action, &mut self.alert)
    }

    pub fn dismiss(&mut self) -> Option<DialogResolution> {
        self.surface.dismiss(&mut self.alert)
    }

    /// Handles a click on a delivered notification for `medication_id`.
    pub fn notification_clicked(&mut self, medication_id: &MedicationId) {
        self.alert.stop();
        self.surface.close_for(medication_id, &mut self.alert);
    }

    pub fn stop_alert(&mut self) {
        self.alert.stop();
    }

    pub fn ensure_permission(&mut self) -> PermissionCheck {
        self.gate.ensure_granted(&mut self.platform)
    }

    pub fn request_permission_explicitly(&mut self) -> PermissionCheck {
        self.gate.request_explicitly(&mut self.platform)
    }

    pub fn resolve_permission(&mut self, granted: bool) -> PermissionCheck {
        self.gate.resolve(granted)
    }

    pub fn permission_granted(&self) -> bool {
        self.gate.is_granted(&self.platform)
    }

    pub fn has_asked_permission(&self) -> bool {
        self.gate.has_asked()
    }

    /// Sends a notification if permitted; delivery failures are swallowed.
    pub fn send_notification(&mut self, notification: ReminderNotification) -> bool {
        if !self.gate.is_granted(&self.platform) {
            info!("event=notification_send module=reminder status=skip reason=permission");
            return false;
        }
        match self.platform.send(&notification) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "event=notification_send module=reminder status=error error={}",
                    err
                );
                false
            }
        }
    }

    /// Snapshot of armed reminders: medication id -> target instant.
    pub fn pending_timers(&self) -> BTreeMap<MedicationId, NaiveDateTime> {
        self.pending
            .iter()
            .map(|(id, timer)| (id.clone(), timer.target()))
            .collect()
    }

    pub fn pending_timer(&self, medication_id: &MedicationId) -> Option<PendingTimer> {
        self.pending.get(medication_id).copied()
    }

    /// Earliest instant at which `tick` has work to do.
    pub fn next_wakeup(&self) -> Option<NaiveDateTime> {
        match (self.timers.next_deadline(), self.alert.next_wakeup()) {
            (Some(timer), Some(alert)) => Some(timer.min(alert)),
            (timer, alert) => timer.or(alert),
        }
    }

    pub fn current_reminder(&self) -> Option<&ReminderEvent> {
        self.surface.current()
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    pub fn alert(&self) -> &A {
        &self.alert
    }

    pub fn alert_mut(&mut self) -> &mut A {
        &mut self.alert
    }

    pub fn platform(&self) -> &N {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut N {
        &mut self.platform
    }

    fn arm(&mut self, medication_id: MedicationId, target: NaiveDateTime) {
        if let Some(previous) = self.pending.remove(&medication_id) {
            self.timers.disarm(previous.handle);
        }
        debug!(
            "event=reminder_arm module=reminder status=ok medication_id={} target={}",
            medication_id, target
        );
        let handle = self.timers.arm(medication_id.clone(), target);
        self.pending
            .insert(medication_id, PendingTimer { handle, target });
    }

    fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        self.timers.clear();
        cancelled
    }
}

/// Builds the platform notification for a due medication.
pub fn reminder_notification(
    medication: &Medication,
    config: &ReminderConfig,
) -> ReminderNotification {
    ReminderNotification {
        title: format!("Time to take {}", medication.name),
        body: format!(
            "{} - {}",
            medication.dosage,
            medication.instructions_or_default()
        ),
        icon: config.notification_icon.clone(),
        require_interaction: true,
        medication_id: Some(medication.id.clone()),
    }
}
