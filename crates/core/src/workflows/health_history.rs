//! Health history workflow.
//!
//! Records, removes and lists basic health measurements for one patient. The workflow is
//! bound to two identities at construction time: the acting personnel member, who becomes
//! the author of every record it adds, and the patient whose history is being edited.

use crate::constants::INFORMATION_RECORDED;
use crate::error::{ClinicError, ClinicResult};
use crate::gateways::{BestEffort, Directory, HealthRecordStore, OfficeVisitDates};
use crate::health_record::{HealthRecord, HealthRecordForm, NewHealthRecord};
use crate::ids::{Mid, OfficeVisitId, RecordId};
use crate::validation::{HealthRecordValidator, ValidationError};
use chrono::NaiveDate;
use std::sync::Arc;

/// Result of [`HealthHistoryWorkflow::add_health_record`].
///
/// Validation failures are ordinary outcomes, not errors: the caller is expected to show the
/// message and let the user correct the form.
#[derive(Clone, Debug, PartialEq)]
pub enum AddRecordOutcome {
    Recorded(HealthRecord),
    ValidationFailed(ValidationError),
}

impl AddRecordOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, AddRecordOutcome::Recorded(_))
    }

    /// `"Information Recorded"`, or the validation message.
    pub fn message(&self) -> String {
        match self {
            AddRecordOutcome::Recorded(_) => INFORMATION_RECORDED.to_string(),
            AddRecordOutcome::ValidationFailed(e) => e.to_string(),
        }
    }
}

pub struct HealthHistoryWorkflow {
    records: Arc<dyn HealthRecordStore>,
    directory: Arc<dyn Directory>,
    office_visits: Arc<dyn OfficeVisitDates>,
    validator: HealthRecordValidator,
    actor: Mid,
    patient: Mid,
}

impl HealthHistoryWorkflow {
    /// Creates a workflow acting as `actor` on the patient identified by `patient_id`.
    ///
    /// # Arguments
    ///
    /// * `records` - Store the health records are read from and written to
    /// * `directory` - Patient lookups used for the existence check, name and date of birth
    /// * `office_visits` - Resolves office visit dates for display
    /// * `actor` - MID of the logged-in member of personnel, recorded as the author of new records
    /// * `patient_id` - Patient MID as free text, typically straight from the caller's input
    ///
    /// # Errors
    ///
    /// - [`ClinicError::InvalidInput`] if `patient_id` is not a valid MID.
    /// - [`ClinicError::PatientNotFound`] if the directory has no such patient.
    /// - Any directory failure while checking the patient.
    pub fn new(
        records: Arc<dyn HealthRecordStore>,
        directory: Arc<dyn Directory>,
        office_visits: Arc<dyn OfficeVisitDates>,
        actor: Mid,
        patient_id: &str,
    ) -> ClinicResult<Self> {
        let patient = Mid::parse(patient_id)?;
        if !directory.patient_exists(patient)? {
            return Err(ClinicError::PatientNotFound(patient));
        }

        Ok(Self {
            records,
            directory,
            office_visits,
            validator: HealthRecordValidator::new(),
            actor,
            patient,
        })
    }

    pub fn actor(&self) -> Mid {
        self.actor
    }

    /// The patient whose history this workflow edits.
    pub fn patient(&self) -> Mid {
        self.patient
    }

    pub fn patient_name(&self) -> ClinicResult<String> {
        self.directory.patient_display_name(self.patient)
    }

    pub fn patient_date_of_birth(&self) -> ClinicResult<NaiveDate> {
        self.directory.patient_date_of_birth(self.patient)
    }

    /// Validates `form` and, if it passes, stores it as a new record for `patient_id`
    /// authored by the acting identity.
    ///
    /// Nothing is persisted when validation fails.
    ///
    /// # Returns
    ///
    /// [`AddRecordOutcome::Recorded`] with the store-assigned [`RecordId`], or
    /// [`AddRecordOutcome::ValidationFailed`] naming the first violated constraint.
    ///
    /// # Errors
    ///
    /// Only store failures are errors; validation failures come back as
    /// [`AddRecordOutcome::ValidationFailed`].
    pub fn add_health_record(
        &self,
        patient_id: Mid,
        form: &HealthRecordForm,
    ) -> ClinicResult<AddRecordOutcome> {
        let measurements = match self.validator.validate(form) {
            Ok(m) => m,
            Err(e) => {
                tracing::info!(patient = %patient_id, error = %e, "health record rejected");
                return Ok(AddRecordOutcome::ValidationFailed(e));
            }
        };

        let record = self.records.add_health_record(NewHealthRecord {
            patient_id,
            personnel_id: self.actor,
            measurements,
        })?;

        tracing::info!(
            patient = %patient_id,
            author = %self.actor,
            record = %record.record_id,
            "health record added"
        );
        Ok(AddRecordOutcome::Recorded(record))
    }

    /// Deletes a record. Failures are logged and reported, never raised.
    ///
    /// # Returns
    ///
    /// [`BestEffort::Completed`] once the store has deleted the record, otherwise
    /// [`BestEffort::Discarded`] with the store's error text. An unknown id is discarded too.
    pub fn remove_health_record(&self, record_id: RecordId) -> BestEffort {
        let outcome = BestEffort::attempt("remove health record", || {
            self.records.delete_health_record(record_id)
        });
        if outcome.is_completed() {
            tracing::info!(record = %record_id, author = %self.actor, "health record removed");
        }
        outcome
    }

    /// Fetches a single record by id.
    ///
    /// # Errors
    ///
    /// [`ClinicError::HealthRecordNotFound`] for an unknown id, or any store failure.
    pub fn health_record(&self, record_id: RecordId) -> ClinicResult<HealthRecord> {
        self.records.health_record(record_id)
    }

    pub fn all_health_records(&self, patient_id: Mid) -> ClinicResult<Vec<HealthRecord>> {
        self.records.health_records_for(patient_id)
    }

    /// The patient's records taken at `office_visit_id`, in store order.
    pub fn health_records_by_office_visit(
        &self,
        office_visit_id: OfficeVisitId,
        patient_id: Mid,
    ) -> ClinicResult<Vec<HealthRecord>> {
        let records = self.all_health_records(patient_id)?;
        let total = records.len();

        let matching: Vec<HealthRecord> = records
            .into_iter()
            .filter(|r| r.office_visit_id() == office_visit_id)
            .collect();

        tracing::debug!(
            office_visit = %office_visit_id,
            patient = %patient_id,
            total,
            matched = matching.len(),
            "filtered health records by office visit"
        );
        Ok(matching)
    }

    pub fn office_visit_date_str(&self, office_visit_id: OfficeVisitId) -> ClinicResult<String> {
        self.office_visits.visit_date_str(office_visit_id)
    }
}
