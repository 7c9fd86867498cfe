//! Persistence contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented storage contracts.
//! - Keep SQL and serialization details out of the reminder subsystem.
//!
//! # Invariants
//! - Write paths validate records before persisting them.
//! - Missing records surface as `RepoError::NotFound`, not as silent no-ops.

pub mod health_metric_repo;
pub mod kv_store;
pub mod medication_store;

use crate::db::DbError;
use crate::model::health_metric::MetricValidationError;
use crate::model::medication::MedicationValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage error shared by every store and repository.
#[derive(Debug)]
pub enum RepoError {
    Validation(MedicationValidationError),
    InvalidMetric(MetricValidationError),
    Db(DbError),
    /// Carries the missing record id in its string form.
    NotFound(String),
    /// Persisted data could not be decoded.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidMetric(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidMetric(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<MedicationValidationError> for RepoError {
    fn from(value: MedicationValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<MetricValidationError> for RepoError {
    fn from(value: MetricValidationError) -> Self {
        Self::InvalidMetric(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
