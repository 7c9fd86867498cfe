//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the medication list, session and reminder loop to Dart via FRB.
//! - Bridge core platform traits to outboxes the Dart side drains on tick.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One reminder session per process, guarded by a mutex.
//! - Side effects (notifications, alarm plays, toasts) are only observable
//!   through `reminder_tick`.

use chrono::NaiveDateTime;
use log::warn;
use medminder_core::db::open_db;
use medminder_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AlarmPlayer, AlertChannel, DeliveryError, DialogAction, LoopingAlertChannel, Medication,
    MedicationDraft, MedicationId, MedicationService, MedicationStore, NotificationPlatform,
    PermissionCheck, PermissionPrompt, PermissionState, PlaybackError, ReminderConfig,
    ReminderEvent, ReminderNotification, ReminderScheduler, ServiceError, SqliteKeyValueStore,
    SystemClock, ToastLevel, ToastSink,
};
use std::mem;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

const DB_FILE_NAME: &str = "medminder.sqlite3";
const DB_PATH_ENV: &str = "MEDMINDER_DB_PATH";
const WAKEUP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

type FfiService = MedicationService<
    SqliteKeyValueStore,
    OutboxPlatform,
    LoopingAlertChannel<OutboxPlayer>,
    OutboxToasts,
    SystemClock,
>;

static SESSION: Mutex<Option<FfiService>> = Mutex::new(None);

/// Notification platform whose deliveries are queued for the Dart side.
#[derive(Debug)]
struct OutboxPlatform {
    supported: bool,
    permission: PermissionState,
    outbox: Vec<ReminderNotification>,
}

impl NotificationPlatform for OutboxPlatform {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn permission(&self) -> PermissionState {
        self.permission
    }

    fn request_permission(&mut self) -> PermissionPrompt {
        // Dart shows the system prompt and answers via `permission_resolved`.
        PermissionPrompt::Pending
    }

    fn send(&mut self, notification: &ReminderNotification) -> Result<(), DeliveryError> {
        if !self.supported {
            return Err(DeliveryError::Unsupported);
        }
        self.outbox.push(notification.clone());
        Ok(())
    }
}

/// Counts requested alarm plays; Dart performs the playback.
#[derive(Debug, Default)]
struct OutboxPlayer {
    pending_plays: u32,
}

impl AlarmPlayer for OutboxPlayer {
    fn play(&mut self) -> Result<(), PlaybackError> {
        self.pending_plays = self.pending_plays.saturating_add(1);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct OutboxToasts {
    outbox: Vec<ToastItem>,
}

impl ToastSink for OutboxToasts {
    fn toast(&mut self, level: ToastLevel, message: &str) {
        self.outbox.push(ToastItem {
            level: toast_level_label(level).to_string(),
            message: message.to_string(),
        });
    }
}

/// Medication projection for list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationItem {
    pub id: String,
    pub name: String,
    pub dosage: String,
    pub instructions: Option<String>,
    /// Daily trigger time as `HH:MM`.
    pub time: String,
    pub taken: bool,
    /// Local `YYYY-MM-DDTHH:MM:SS` of today's armed reminder, if any.
    pub scheduled_at: Option<String>,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Medication the action touched, when there is one.
    pub medication_id: Option<String>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, medication_id: Option<MedicationId>) -> Self {
        Self {
            ok: true,
            medication_id: medication_id.map(|id| id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            medication_id: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub require_interaction: bool,
    /// Passed back to `notification_clicked` when the user taps it.
    pub medication_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastItem {
    /// `success|info|warning|error`.
    pub level: String,
    pub message: String,
}

/// Subject of the confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub medication_id: String,
    pub name: String,
    pub dosage: String,
    pub instructions: Option<String>,
}

/// Everything Dart must render or perform after one loop turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReminderPoll {
    pub ok: bool,
    pub message: String,
    pub notifications: Vec<NotificationItem>,
    /// Alarm plays requested since the previous poll.
    pub alarm_plays: u32,
    pub toasts: Vec<ToastItem>,
    pub current_reminder: Option<ReminderItem>,
    pub alert_active: bool,
    /// Local `YYYY-MM-DDTHH:MM:SS` of the next instant worth ticking at.
    pub next_wakeup: Option<String>,
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Idempotent for the same `level + log_dir`.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Opens the medication database and creates the reminder session.
///
/// Input semantics:
/// - `db_path`: optional override; falls back to `MEDMINDER_DB_PATH`, then
///   the system temp directory.
/// - `notifications_supported`: whether the host has a notification API.
/// - `permission`: current host permission, `granted|denied|default`.
///
/// # FFI contract
/// - Replaces any previously opened session.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_open(
    db_path: Option<String>,
    notifications_supported: bool,
    permission: String,
) -> ActionResponse {
    let path = resolve_db_path(db_path);
    let conn = match open_db(&path) {
        Ok(conn) => conn,
        Err(err) => return ActionResponse::failure(format!("reminders_open failed: {err}")),
    };
    let store = match MedicationStore::open(SqliteKeyValueStore::new(conn)) {
        Ok(store) => store,
        Err(err) => return ActionResponse::failure(format!("reminders_open failed: {err}")),
    };

    let config = ReminderConfig::default();
    let platform = OutboxPlatform {
        supported: notifications_supported,
        permission: parse_permission(&permission),
        outbox: Vec::new(),
    };
    let alert = LoopingAlertChannel::new(OutboxPlayer::default(), &config);
    let scheduler = ReminderScheduler::new(platform, alert, config);
    let service = MedicationService::new(store, scheduler, OutboxToasts::default(), SystemClock);

    match lock_session() {
        Ok(mut session) => {
            *session = Some(service);
            ActionResponse::success("Reminders ready.", None)
        }
        Err(err) => ActionResponse::failure(err),
    }
}

/// Starts the signed-in session and runs the permission pre-flight.
#[flutter_rust_bridge::frb(sync)]
pub fn session_sign_in() -> ActionResponse {
    with_service(|service| {
        let check = service.sign_in();
        Ok(ActionResponse::success(permission_label(check), None))
    })
}

/// Ends the session; every pending reminder is cancelled.
#[flutter_rust_bridge::frb(sync)]
pub fn session_sign_out() -> ActionResponse {
    with_service(|service| {
        service.sign_out();
        Ok(ActionResponse::success("Signed out.", None))
    })
}

/// Reports the answer to a permission prompt shown by Dart.
#[flutter_rust_bridge::frb(sync)]
pub fn permission_resolved(granted: bool) -> ActionResponse {
    with_service(|service| {
        service.scheduler_mut().platform_mut().permission = if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
        let check = service.permission_resolved(granted);
        Ok(ActionResponse::success(permission_label(check), None))
    })
}

/// Settings action: asks for notification permission again.
#[flutter_rust_bridge::frb(sync)]
pub fn settings_request_notifications() -> ActionResponse {
    with_service(|service| {
        let check = service.request_notifications();
        Ok(ActionResponse::success(permission_label(check), None))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn settings_set_sound_enabled(enabled: bool) -> ActionResponse {
    with_service(|service| {
        service.set_sound_enabled(enabled).map_err(|err| err.to_string())?;
        Ok(ActionResponse::success("Sound preference saved.", None))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn medication_add(
    name: String,
    dosage: String,
    instructions: Option<String>,
    time: String,
) -> ActionResponse {
    let draft = build_draft(name, dosage, instructions, time);
    with_service(|service| {
        let medication = service.add_medication(draft).map_err(describe)?;
        Ok(ActionResponse::success("Medication added.", Some(medication.id)))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn medication_update(
    medication_id: String,
    name: String,
    dosage: String,
    instructions: Option<String>,
    time: String,
) -> ActionResponse {
    let draft = build_draft(name, dosage, instructions, time);
    with_service(|service| {
        let id = parse_medication_id(&medication_id)?;
        let medication = service.update_medication(&id, draft).map_err(describe)?;
        Ok(ActionResponse::success("Medication updated.", Some(medication.id)))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn medication_delete(medication_id: String) -> ActionResponse {
    with_service(|service| {
        let id = parse_medication_id(&medication_id)?;
        let removed = service.delete_medication(&id).map_err(describe)?;
        Ok(ActionResponse::success("Medication removed.", Some(removed.id)))
    })
}

/// Toggles taken-today; calling it twice undoes the first call.
#[flutter_rust_bridge::frb(sync)]
pub fn medication_toggle_taken(medication_id: String) -> ActionResponse {
    with_service(|service| {
        let id = parse_medication_id(&medication_id)?;
        let medication = service.mark_taken(&id).map_err(describe)?;
        let message = if medication.acknowledged_today {
            "Marked as taken."
        } else {
            "Unmarked."
        };
        Ok(ActionResponse::success(message, Some(medication.id)))
    })
}

/// Lists medications with today's armed reminder time.
///
/// Returns an empty list when no session is open.
#[flutter_rust_bridge::frb(sync)]
pub fn medication_list() -> Vec<MedicationItem> {
    let Ok(session) = lock_session() else {
        return Vec::new();
    };
    let Some(service) = session.as_ref() else {
        return Vec::new();
    };
    let scheduled = service.scheduled_reminders();
    service
        .today_medications()
        .into_iter()
        .map(|medication| to_medication_item(medication, scheduled.get(&medication.id).copied()))
        .collect()
}

/// Event-loop turn: fires due reminders, advances the alarm cadence and
/// drains every outbox.
///
/// # FFI contract
/// - Call on a timer (at least every `next_wakeup`) and after user actions.
/// - Never panics; `ok=false` when no session is open.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_tick() -> ReminderPoll {
    let mut session = match lock_session() {
        Ok(session) => session,
        Err(err) => return poll_failure(err),
    };
    let Some(service) = session.as_mut() else {
        return poll_failure("reminders not opened".to_string());
    };
    service.tick();
    drain_poll(service)
}

/// Answers the confirmation dialog: `taken=true` acknowledges, `false` declines.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_respond(taken: bool) -> ActionResponse {
    let action = if taken {
        DialogAction::Taken
    } else {
        DialogAction::Decline
    };
    with_service(|service| {
        let resolution = service.respond_to_reminder(action).map_err(describe)?;
        let message = match resolution {
            Some(_) => "Reminder answered.",
            None => "No reminder open.",
        };
        Ok(ActionResponse::success(message, None))
    })
}

/// Closes the dialog without an answer; the alarm still stops.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_dismiss() -> ActionResponse {
    with_service(|service| {
        service.dismiss_reminder();
        Ok(ActionResponse::success("Reminder dismissed.", None))
    })
}

/// A delivered notification was tapped; same path as "Taken".
#[flutter_rust_bridge::frb(sync)]
pub fn notification_clicked(medication_id: String) -> ActionResponse {
    with_service(|service| {
        let id = parse_medication_id(&medication_id)?;
        service.notification_clicked(&id).map_err(describe)?;
        Ok(ActionResponse::success("Marked as taken.", Some(id)))
    })
}

fn lock_session() -> Result<MutexGuard<'static, Option<FfiService>>, String> {
    SESSION.lock().map_err(|_| {
        warn!("event=ffi_session module=ffi status=error reason=poisoned");
        "reminder session is unavailable".to_string()
    })
}

fn with_service(
    f: impl FnOnce(&mut FfiService) -> Result<ActionResponse, String>,
) -> ActionResponse {
    let mut session = match lock_session() {
        Ok(session) => session,
        Err(err) => return ActionResponse::failure(err),
    };
    let Some(service) = session.as_mut() else {
        return ActionResponse::failure("reminders not opened");
    };
    f(service).unwrap_or_else(ActionResponse::failure)
}

fn drain_poll(service: &mut FfiService) -> ReminderPoll {
    let notifications = mem::take(&mut service.scheduler_mut().platform_mut().outbox)
        .into_iter()
        .map(to_notification_item)
        .collect();
    let alarm_plays = mem::take(
        &mut service
            .scheduler_mut()
            .alert_mut()
            .player_mut()
            .pending_plays,
    );
    let toasts = mem::take(&mut service.toasts_mut().outbox);

    ReminderPoll {
        ok: true,
        message: String::new(),
        notifications,
        alarm_plays,
        toasts,
        current_reminder: service.current_reminder().map(to_reminder_item),
        alert_active: service.scheduler().alert().is_active(),
        next_wakeup: service.next_wakeup().map(format_local),
    }
}

fn poll_failure(message: String) -> ReminderPoll {
    ReminderPoll {
        ok: false,
        message,
        ..ReminderPoll::default()
    }
}

fn build_draft(
    name: String,
    dosage: String,
    instructions: Option<String>,
    time: String,
) -> MedicationDraft {
    let draft = MedicationDraft::new(name, dosage, time);
    match instructions {
        Some(text) => draft.with_instructions(text),
        None => draft,
    }
}

fn resolve_db_path(explicit: Option<String>) -> PathBuf {
    let from_env = std::env::var(DB_PATH_ENV).ok();
    [explicit, from_env]
        .into_iter()
        .flatten()
        .map(|raw| raw.trim().to_string())
        .find(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME))
}

fn parse_permission(value: &str) -> PermissionState {
    match value.trim().to_ascii_lowercase().as_str() {
        "granted" => PermissionState::Granted,
        "denied" => PermissionState::Denied,
        _ => PermissionState::Undecided,
    }
}

fn parse_medication_id(value: &str) -> Result<MedicationId, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("invalid medication id: empty".to_string());
    }
    Ok(MedicationId::from(value))
}

fn describe(err: ServiceError) -> String {
    err.to_string()
}

fn permission_label(check: PermissionCheck) -> &'static str {
    match check {
        PermissionCheck::Granted => "granted",
        PermissionCheck::Denied => "denied",
        PermissionCheck::Unsupported => "unsupported",
        PermissionCheck::Pending => "pending",
    }
}

fn toast_level_label(level: ToastLevel) -> &'static str {
    match level {
        ToastLevel::Success => "success",
        ToastLevel::Info => "info",
        ToastLevel::Warning => "warning",
        ToastLevel::Error => "error",
    }
}

fn format_local(value: NaiveDateTime) -> String {
    value.format(WAKEUP_FORMAT).to_string()
}

fn to_medication_item(
    medication: &Medication,
    scheduled_at: Option<NaiveDateTime>,
) -> MedicationItem {
    MedicationItem {
        id: medication.id.to_string(),
        name: medication.name.clone(),
        dosage: medication.dosage.clone(),
        instructions: medication.instructions.clone(),
        time: medication.time.clone(),
        taken: medication.acknowledged_today,
        scheduled_at: scheduled_at.map(format_local),
    }
}

fn to_notification_item(notification: ReminderNotification) -> NotificationItem {
    NotificationItem {
        title: notification.title,
        body: notification.body,
        icon: notification.icon,
        require_interaction: notification.require_interaction,
        medication_id: notification.medication_id.map(|id| id.to_string()),
    }
}

fn to_reminder_item(event: &ReminderEvent) -> ReminderItem {
    ReminderItem {
        medication_id: event.medication_id.to_string(),
        name: event.name.clone(),
        dosage: event.dosage.clone(),
        instructions: event.instructions.clone(),
    }
}
