//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `medminder_core` linkage.
//! - Given a database path, print today's reminder status per medication.

use medminder_core::db::open_db;
use medminder_core::{
    next_trigger_today, Clock, Medication, MedicationStore, SqliteKeyValueStore, SystemClock,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("medminder_core ping={}", medminder_core::ping());
    println!("medminder_core version={}", medminder_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    match print_today(&db_path, &SystemClock) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("medminder: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_today(db_path: &str, clock: &impl Clock) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(db_path)?;
    let store = MedicationStore::open(SqliteKeyValueStore::new(conn))?;
    let now = clock.now();

    if store.list().is_empty() {
        println!("no medications");
        return Ok(());
    }
    for medication in store.list() {
        println!(
            "{} {} ({}) {}",
            medication.time,
            medication.name,
            medication.dosage,
            reminder_status(medication, now)
        );
    }
    Ok(())
}

fn reminder_status(medication: &Medication, now: chrono::NaiveDateTime) -> String {
    if medication.acknowledged_today {
        return "taken".to_string();
    }
    match next_trigger_today(&medication.time, now) {
        Ok(Some(at)) => format!("due {}", at.format("%H:%M")),
        Ok(None) => "passed".to_string(),
        Err(err) => format!("invalid time: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::reminder_status;
    use chrono::NaiveDate;
    use medminder_core::{Medication, MedicationDraft};

    #[test]
    fn status_reflects_acknowledgment_and_time() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 14)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .unwrap();
        let mut later = Medication::new(MedicationDraft::new("A", "1 tab", "10:15"));
        let earlier = Medication::new(MedicationDraft::new("B", "1 tab", "08:00"));
        let broken = Medication::new(MedicationDraft::new("C", "1 tab", "noon"));

        assert_eq!(reminder_status(&later, now), "due 10:15");
        assert_eq!(reminder_status(&earlier, now), "passed");
        assert!(reminder_status(&broken, now).starts_with("invalid time"));

        later.toggle_acknowledged();
        assert_eq!(reminder_status(&later, now), "taken");
    }
}
