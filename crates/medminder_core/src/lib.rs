//! Core domain logic for MedMinder.
//! Owns the medication list, the reminder scheduler and their storage.

pub mod chat;
pub mod clock;
pub mod config;
pub mod db;
pub mod directory;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod repo;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ReminderConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::health_metric::{HealthMetric, MetricKind, MetricValidationError};
pub use model::medication::{
    Medication, MedicationDraft, MedicationId, MedicationValidationError,
};
pub use reminder::alert::{AlertChannel, AlertState, LoopingAlertChannel};
pub use reminder::dialog::{DialogAction, DialogResolution, ReminderEvent};
pub use reminder::permission::PermissionCheck;
pub use reminder::platform::{
    AlarmPlayer, DeliveryError, NotificationPlatform, PermissionPrompt, PermissionState,
    PlaybackError, ReminderNotification, ToastLevel, ToastSink,
};
pub use reminder::scheduler::{RebuildBlock, RebuildSummary, ReminderScheduler};
pub use reminder::time_of_day::{next_trigger_today, TimeOfDay, TimeOfDayError};
pub use repo::health_metric_repo::{HealthMetricRepository, SqliteHealthMetricRepository};
pub use repo::kv_store::{KeyValueStore, SqliteKeyValueStore};
pub use repo::medication_store::MedicationStore;
pub use repo::{RepoError, RepoResult};
pub use service::medication_service::{MedicationService, ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
