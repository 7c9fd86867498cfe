//! Health metric repository.
//!
//! # Invariants
//! - Writes call `HealthMetric::validate()` first.
//! - Lists are ordered by `recorded_at ASC, uuid ASC` for charting.

use crate::model::health_metric::{HealthMetric, HealthMetricId, MetricKind};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

pub trait HealthMetricRepository {
    fn create_metric(&self, metric: &HealthMetric) -> RepoResult<HealthMetricId>;
    fn list_metrics(&self, kind: MetricKind) -> RepoResult<Vec<HealthMetric>>;
    fn delete_metric(&self, id: HealthMetricId) -> RepoResult<()>;
}

pub struct SqliteHealthMetricRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHealthMetricRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl HealthMetricRepository for SqliteHealthMetricRepository<'_> {
    fn create_metric(&self, metric: &HealthMetric) -> RepoResult<HealthMetricId> {
        metric.validate()?;
        self.conn.execute(
            "INSERT INTO health_metrics (
                uuid, kind, value, unit, recorded_at, notes, doctor_name
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                metric.id.to_string(),
                metric.kind.as_str(),
                metric.value,
                metric.unit.as_str(),
                metric.recorded_at,
                metric.notes.as_deref(),
                metric.doctor_name.as_deref(),
            ],
        )?;
        Ok(metric.id)
    }

    fn list_metrics(&self, kind: MetricKind) -> RepoResult<Vec<HealthMetric>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, kind, value, unit, recorded_at, notes, doctor_name
             FROM health_metrics
             WHERE kind = ?1
             ORDER BY recorded_at ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([kind.as_str()])?;
        let mut metrics = Vec::new();
        while let Some(row) = rows.next()? {
            metrics.push(parse_metric_row(row)?);
        }
        Ok(metrics)
    }

    fn delete_metric(&self, id: HealthMetricId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM health_metrics WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn parse_metric_row(row: &Row<'_>) -> RepoResult<HealthMetric> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid `{uuid_text}` in health_metrics.uuid"))
    })?;
    let kind_text: String = row.get("kind")?;
    let kind = MetricKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid metric kind `{kind_text}` in health_metrics.kind"))
    })?;

    let metric = HealthMetric {
        id,
        kind,
        value: row.get("value")?,
        unit: row.get("unit")?,
        recorded_at: row.get("recorded_at")?,
        notes: row.get("notes")?,
        doctor_name: row.get("doctor_name")?,
    };
    metric.validate()?;
    Ok(metric)
}
