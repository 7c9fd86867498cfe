//! Medication domain model.
//!
//! # Responsibility
//! - Define the persisted medication record and its edit draft.
//! - Validate write-path input before it reaches storage.
//!
//! # Invariants
//! - `id` is generated once and never reused for another medication.
//! - Edits never touch `id` or `acknowledged_today`.
//! - `acknowledged_today` is a toggle, so "mark taken" twice is an undo.

use crate::reminder::time_of_day::{TimeOfDay, TimeOfDayError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable opaque medication identifier.
///
/// Fresh ids are UUID v4 strings, but stored lists may carry any other
/// string (for example millisecond timestamps) and must still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MedicationId(String);

impl MedicationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MedicationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MedicationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for MedicationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A medication with one daily reminder time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: MedicationId,
    pub name: String,
    pub dosage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Daily trigger time as `HH:MM`.
    pub time: String,
    /// Serialized as `taken` to match the stored list shape.
    #[serde(rename = "taken", default)]
    pub acknowledged_today: bool,
}

/// User-editable medication fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MedicationDraft {
    pub name: String,
    pub dosage: String,
    pub instructions: Option<String>,
    pub time: String,
}

impl MedicationDraft {
    pub fn new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dosage: dosage.into(),
            instructions: None,
            time: time.into(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// Write-path validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MedicationValidationError {
    EmptyName,
    EmptyDosage,
    InvalidTime(TimeOfDayError),
}

impl Display for MedicationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "medication name must not be empty"),
            Self::EmptyDosage => write!(f, "medication dosage must not be empty"),
            Self::InvalidTime(err) => write!(f, "invalid medication time: {err}"),
        }
    }
}

impl Error for MedicationValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTime(err) => Some(err),
            _ => None,
        }
    }
}

impl Medication {
    /// Creates a medication with a fresh id, not yet acknowledged.
    pub fn new(draft: MedicationDraft) -> Self {
        Self::with_id(MedicationId::generate(), draft)
    }

    /// Creates a medication with a caller-provided id (import paths).
    pub fn with_id(id: MedicationId, draft: MedicationDraft) -> Self {
        let draft = draft.normalized();
        Self {
            id,
            name: draft.name,
            dosage: draft.dosage,
            instructions: draft.instructions,
            time: draft.time,
            acknowledged_today: false,
        }
    }

    /// Replaces editable fields, keeping identity and acknowledgment.
    pub fn apply(&mut self, draft: MedicationDraft) {
        let draft = draft.normalized();
        self.name = draft.name;
        self.dosage = draft.dosage;
        self.instructions = draft.instructions;
        self.time = draft.time;
    }

    /// Flips `acknowledged_today` and returns the new value.
    pub fn toggle_acknowledged(&mut self) -> bool {
        self.acknowledged_today = !self.acknowledged_today;
        self.acknowledged_today
    }

    pub fn trigger_time(&self) -> Result<TimeOfDay, TimeOfDayError> {
        TimeOfDay::parse(&self.time)
    }

    pub fn validate(&self) -> Result<(), MedicationValidationError> {
        if self.name.trim().is_empty() {
            return Err(MedicationValidationError::EmptyName);
        }
        if self.dosage.trim().is_empty() {
            return Err(MedicationValidationError::EmptyDosage);
        }
        self.trigger_time()
            .map_err(MedicationValidationError::InvalidTime)?;
        Ok(())
    }

    /// Instructions text shown to the user, with the default fallback.
    pub fn instructions_or_default(&self) -> &str {
        match self.instructions.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => "Take as directed",
        }
    }
}

impl MedicationDraft {
    fn normalized(self) -> Self {
        let instructions = self
            .instructions
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        Self {
            name: self.name.trim().to_string(),
            dosage: self.dosage.trim().to_string(),
            instructions,
            time: self.time.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Medication, MedicationDraft, MedicationId, MedicationValidationError};

    #[test]
    fn new_medication_starts_unacknowledged_with_trimmed_fields() {
        let medication = Medication::new(
            MedicationDraft::new(" Metformin ", "500mg", "08:00").with_instructions("   "),
        );
        assert_eq!(medication.name, "Metformin");
        assert_eq!(medication.instructions, None);
        assert!(!medication.acknowledged_today);
        assert_eq!(medication.instructions_or_default(), "Take as directed");
    }

    #[test]
    fn apply_keeps_identity_and_acknowledgment() {
        let mut medication = Medication::new(MedicationDraft::new("A", "1 tab", "08:00"));
        medication.toggle_acknowledged();
        let id = medication.id.clone();

        medication.apply(MedicationDraft::new("B", "2 tabs", "09:30"));
        assert_eq!(medication.id, id);
        assert!(medication.acknowledged_today);
        assert_eq!(medication.time, "09:30");
    }

    #[test]
    fn toggle_acknowledged_is_an_undoable_flip() {
        let mut medication = Medication::new(MedicationDraft::new("A", "1 tab", "08:00"));
        assert!(medication.toggle_acknowledged());
        assert!(!medication.toggle_acknowledged());
    }

    #[test]
    fn validate_rejects_blank_fields_and_bad_time() {
        let blank_name = Medication::new(MedicationDraft::new(" ", "1 tab", "08:00"));
        assert_eq!(blank_name.validate(), Err(MedicationValidationError::EmptyName));

        let blank_dosage = Medication::new(MedicationDraft::new("A", "", "08:00"));
        assert_eq!(blank_dosage.validate(), Err(MedicationValidationError::EmptyDosage));

        let bad_time = Medication::new(MedicationDraft::new("A", "1 tab", "25:00"));
        assert!(matches!(
            bad_time.validate(),
            Err(MedicationValidationError::InvalidTime(_))
        ));
    }

    #[test]
    fn serializes_acknowledgment_as_taken() {
        let medication = Medication::new(MedicationDraft::new("A", "1 tab", "08:00"));
        let json = serde_json::to_value(&medication).expect("serialize");
        assert_eq!(json["taken"], serde_json::Value::Bool(false));
        assert!(json.get("instructions").is_none());
        assert_eq!(json["id"], serde_json::Value::String(medication.id.to_string()));
    }

    #[test]
    fn ids_are_opaque_strings() {
        let generated = Medication::new(MedicationDraft::new("A", "1 tab", "08:00")).id;
        assert!(uuid::Uuid::parse_str(generated.as_str()).is_ok());

        let raw = r#"{"id":"1700000000000","name":"A","dosage":"1 tab","time":"08:00","taken":true}"#;
        let medication: Medication = serde_json::from_str(raw).expect("timestamp id");
        assert_eq!(medication.id, MedicationId::from("1700000000000"));
        assert!(medication.acknowledged_today);
    }
}
