//! Persisted medication list.
//!
//! # Responsibility
//! - Own the in-memory medication list and mirror it to key-value storage.
//! - Provide add/update/delete/toggle with write-path validation.
//!
//! # Invariants
//! - The list is stored as one JSON array under `MEDICATIONS_KEY`.
//! - Storage is written before the in-memory list changes, so a failed
//!   write leaves both untouched.
//! - Every successful mutation bumps `revision`; the reminder scheduler
//!   rebuilds from the list whenever it changes.

use crate::model::medication::{Medication, MedicationDraft, MedicationId};
use crate::repo::kv_store::KeyValueStore;
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};

pub const MEDICATIONS_KEY: &str = "medications";

/// Medication list backed by a key-value store.
pub struct MedicationStore<S: KeyValueStore> {
    kv: S,
    medications: Vec<Medication>,
    revision: u64,
}

impl<S: KeyValueStore> MedicationStore<S> {
    /// Loads the stored list; a missing key yields an empty list.
    ///
    /// Stored records are not re-validated: a malformed time is kept so the
    /// user can fix it, and the scheduler skips it.
    pub fn open(kv: S) -> RepoResult<Self> {
        let medications = match kv.get(MEDICATIONS_KEY)? {
            Some(raw) => serde_json::from_str::<Vec<Medication>>(&raw).map_err(|err| {
                RepoError::InvalidData(format!("`{MEDICATIONS_KEY}` is not a medication list: {err}"))
            })?,
            None => Vec::new(),
        };
        info!(
            "event=medications_load module=store status=ok count={}",
            medications.len()
        );
        Ok(Self {
            kv,
            medications,
            revision: 0,
        })
    }

    pub fn list(&self) -> &[Medication] {
        &self.medications
    }

    pub fn get(&self, id: &MedicationId) -> Option<&Medication> {
        self.medications.iter().find(|medication| &medication.id == id)
    }

    /// Monotonic change counter for list subscribers.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn add(&mut self, draft: MedicationDraft) -> RepoResult<Medication> {
        let medication = Medication::new(draft);
        medication.validate()?;

        let mut next = self.medications.clone();
        next.push(medication.clone());
        self.commit(next)?;
        info!(
            "event=medication_add module=store status=ok medication_id={}",
            medication.id
        );
        Ok(medication)
    }

    /// Replaces editable fields; identity and acknowledgment are kept.
    pub fn update(&mut self, id: &MedicationId, draft: MedicationDraft) -> RepoResult<Medication> {
        self.mutate(id, |medication| {
            medication.apply(draft);
            medication.validate().map_err(RepoError::from)
        })
    }

    /// Flips acknowledged-today and returns the updated record.
    pub fn toggle_acknowledged(&mut self, id: &MedicationId) -> RepoResult<Medication> {
        self.mutate(id, |medication| {
            medication.toggle_acknowledged();
            Ok(())
        })
    }

    pub fn delete(&mut self, id: &MedicationId) -> RepoResult<Medication> {
        let position = self.position(id)?;
        let mut next = self.medications.clone();
        let removed = next.remove(position);
        self.commit(next)?;
        info!(
            "event=medication_delete module=store status=ok medication_id={}",
            id
        );
        Ok(removed)
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    fn mutate(
        &mut self,
        id: &MedicationId,
        change: impl FnOnce(&mut Medication) -> RepoResult<()>,
    ) -> RepoResult<Medication> {
        let position = self.position(id)?;
        let mut next = self.medications.clone();
        change(&mut next[position])?;
        let updated = next[position].clone();
        self.commit(next)?;
        Ok(updated)
    }

    fn position(&self, id: &MedicationId) -> RepoResult<usize> {
        self.medications
            .iter()
            .position(|medication| &medication.id == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))
    }

    fn commit(&mut self, next: Vec<Medication>) -> RepoResult<()> {
        let raw = serde_json::to_string(&next)
            .map_err(|err| RepoError::InvalidData(format!("medication list encode failed: {err}")))?;
        if let Err(err) = self.kv.put(MEDICATIONS_KEY, &raw) {
            warn!(
                "event=medications_save module=store status=error error={}",
                err
            );
            return Err(err);
        }
        self.medications = next;
        self.revision += 1;
        Ok(())
    }
}
