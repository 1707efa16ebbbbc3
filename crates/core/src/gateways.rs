//! Collaborator interfaces the workflows depend on.
//!
//! Workflows never own storage, delivery or directory data; they reach it through these narrow
//! traits so each deployment can supply its own implementation. The crate ships two:
//! [`InMemoryStore`](crate::repositories::memory::InMemoryStore) and
//! [`YamlStore`](crate::repositories::yaml::YamlStore).

use crate::appointment::{Appointment, ApptRequest, Message};
use crate::error::ClinicResult;
use crate::health_record::{HealthRecord, NewHealthRecord};
use crate::ids::{Mid, OfficeVisitId, RecordId, RequestId};
use chrono::NaiveDate;

/// Durable storage for health records.
pub trait HealthRecordStore: Send + Sync {
    fn health_record(&self, record_id: RecordId) -> ClinicResult<HealthRecord>;

    /// All records for a patient, in store order.
    fn health_records_for(&self, patient_id: Mid) -> ClinicResult<Vec<HealthRecord>>;

    /// Persists a record and returns it with its newly assigned [`RecordId`].
    fn add_health_record(&self, record: NewHealthRecord) -> ClinicResult<HealthRecord>;

    fn delete_health_record(&self, record_id: RecordId) -> ClinicResult<()>;
}

/// Durable storage for appointment requests and scheduled appointments.
pub trait AppointmentStore: Send + Sync {
    fn appt_request(&self, request_id: RequestId) -> ClinicResult<ApptRequest>;

    fn appt_requests_for(&self, hcp_id: Mid) -> ClinicResult<Vec<ApptRequest>>;

    /// Writes `request` back if the stored version still equals `request.version`.
    ///
    /// Returns the stored request with its version advanced, or
    /// [`ClinicError::StaleVersion`](crate::ClinicError::StaleVersion) if another writer got
    /// there first.
    fn update_appt_request(&self, request: &ApptRequest) -> ClinicResult<ApptRequest>;

    fn schedule_appointment(&self, appointment: &Appointment) -> ClinicResult<()>;
}

/// Best-effort message delivery.
pub trait Notifier: Send + Sync {
    fn send(&self, message: &Message) -> ClinicResult<()>;
}

/// Patient and personnel lookups.
pub trait Directory: Send + Sync {
    fn provider_display_name(&self, hcp_id: Mid) -> ClinicResult<String>;

    fn patient_display_name(&self, patient_id: Mid) -> ClinicResult<String>;

    fn patient_date_of_birth(&self, patient_id: Mid) -> ClinicResult<NaiveDate>;

    fn patient_exists(&self, patient_id: Mid) -> ClinicResult<bool>;
}

/// Resolves the display date of an office visit.
pub trait OfficeVisitDates: Send + Sync {
    fn visit_date_str(&self, office_visit_id: OfficeVisitId) -> ClinicResult<String>;
}

/// Outcome of an operation whose failure must not affect the enclosing workflow call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BestEffort {
    Completed,
    Discarded { reason: String },
}

impl BestEffort {
    pub fn is_completed(&self) -> bool {
        matches!(self, BestEffort::Completed)
    }

    /// Runs `op`, logging and discarding any failure under `what`.
    pub(crate) fn attempt<E: std::fmt::Display>(
        what: &str,
        op: impl FnOnce() -> Result<(), E>,
    ) -> Self {
        match op() {
            Ok(()) => BestEffort::Completed,
            Err(e) => {
                tracing::warn!(operation = what, error = %e, "best-effort operation discarded");
                BestEffort::Discarded {
                    reason: e.to_string(),
                }
            }
        }
    }
}
