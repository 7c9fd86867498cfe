use medminder_core::db::open_db_in_memory;
use medminder_core::{
    HealthMetric, HealthMetricRepository, MetricKind, MetricValidationError, RepoError,
    SqliteHealthMetricRepository,
};
use uuid::Uuid;

#[test]
fn list_by_kind_is_sorted_by_recorded_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHealthMetricRepository::new(&conn);

    let later = HealthMetric::new(MetricKind::HeartRate, 80.0, 2_000);
    let mut earlier = HealthMetric::new(MetricKind::HeartRate, 72.0, 1_000);
    earlier.notes = Some("resting".to_string());
    earlier.doctor_name = Some("Dr. Rao".to_string());
    let other_kind = HealthMetric::new(MetricKind::Weight, 160.0, 500);

    repo.create_metric(&later).unwrap();
    repo.create_metric(&earlier).unwrap();
    repo.create_metric(&other_kind).unwrap();

    let heart = repo.list_metrics(MetricKind::HeartRate).unwrap();
    assert_eq!(heart, vec![earlier, later]);
    assert_eq!(heart[0].unit, "bpm");

    let weight = repo.list_metrics(MetricKind::Weight).unwrap();
    assert_eq!(weight.len(), 1);
    assert_eq!(weight[0].unit, "lbs");
}

#[test]
fn create_rejects_non_finite_values_and_wrong_units() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHealthMetricRepository::new(&conn);

    let nan = HealthMetric::new(MetricKind::Temperature, f64::NAN, 1);
    assert!(matches!(
        repo.create_metric(&nan),
        Err(RepoError::InvalidMetric(MetricValidationError::NonFiniteValue(_)))
    ));

    let mut wrong_unit = HealthMetric::new(MetricKind::BloodGlucose, 95.0, 1);
    wrong_unit.unit = "mmol/L".to_string();
    assert!(matches!(
        repo.create_metric(&wrong_unit),
        Err(RepoError::InvalidMetric(MetricValidationError::UnitMismatch { .. }))
    ));

    assert!(repo.list_metrics(MetricKind::Temperature).unwrap().is_empty());
}

#[test]
fn delete_removes_metric_and_reports_missing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHealthMetricRepository::new(&conn);
    let metric = HealthMetric::new(MetricKind::BloodPressure, 120.0, 1);
    let id = repo.create_metric(&metric).unwrap();

    repo.delete_metric(id).unwrap();
    assert!(repo.list_metrics(MetricKind::BloodPressure).unwrap().is_empty());

    let missing = Uuid::new_v4();
    assert!(matches!(
        repo.delete_metric(missing),
        Err(RepoError::NotFound(id)) if id == missing.to_string()
    ));
}
