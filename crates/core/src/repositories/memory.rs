//! In-process gateway implementations.
//!
//! [`InMemoryStore`] keeps every table behind a single mutex, so each gateway call is atomic
//! with respect to the others. [`RecordingNotifier`] keeps delivered messages in memory.
//! Both are suitable for embedding and for tests.

use crate::appointment::{Appointment, ApptRequest, Message};
use crate::error::{ClinicError, ClinicResult};
use crate::gateways::{AppointmentStore, Directory, HealthRecordStore, Notifier, OfficeVisitDates};
use crate::health_record::{HealthRecord, NewHealthRecord};
use crate::ids::{Mid, OfficeVisitId, RecordId, RequestId};
use crate::repositories::shared::{
    AppointmentTable, ApptRequestTable, DirectoryData, HealthRecordTable, OfficeVisitEntry,
    OfficeVisitTable, PatientEntry, PersonnelEntry,
};
use chrono::NaiveDate;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    health_records: HealthRecordTable,
    appt_requests: ApptRequestTable,
    appointments: AppointmentTable,
    directory: DirectoryData,
    office_visits: OfficeVisitTable,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> ClinicResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| ClinicError::DataAccess("in-memory store lock poisoned".into()))
    }

    pub fn register_personnel(&self, mid: Mid, name: impl Into<String>) -> ClinicResult<()> {
        self.tables()?.directory.upsert_personnel(PersonnelEntry {
            mid,
            name: name.into(),
        });
        Ok(())
    }

    pub fn register_patient(
        &self,
        mid: Mid,
        name: impl Into<String>,
        date_of_birth: NaiveDate,
    ) -> ClinicResult<()> {
        self.tables()?.directory.upsert_patient(PatientEntry {
            mid,
            name: name.into(),
            date_of_birth,
        });
        Ok(())
    }

    pub fn register_office_visit(
        &self,
        office_visit_id: OfficeVisitId,
        patient_id: Mid,
        visit_date: NaiveDate,
    ) -> ClinicResult<()> {
        self.tables()?.office_visits.upsert(OfficeVisitEntry {
            office_visit_id,
            patient_id,
            visit_date,
        });
        Ok(())
    }

    /// Stores a patient-initiated request. Requests are created outside the workflows.
    pub fn submit_appt_request(&self, request: ApptRequest) -> ClinicResult<()> {
        self.tables()?.appt_requests.insert(request)
    }

    /// Appointments scheduled so far, in scheduling order.
    pub fn scheduled_appointments(&self) -> ClinicResult<Vec<Appointment>> {
        Ok(self.tables()?.appointments.appointments.clone())
    }
}

impl HealthRecordStore for InMemoryStore {
    fn health_record(&self, record_id: RecordId) -> ClinicResult<HealthRecord> {
        self.tables()?.health_records.get(record_id)
    }

    fn health_records_for(&self, patient_id: Mid) -> ClinicResult<Vec<HealthRecord>> {
        Ok(self.tables()?.health_records.for_patient(patient_id))
    }

    fn add_health_record(&self, record: NewHealthRecord) -> ClinicResult<HealthRecord> {
        Ok(self.tables()?.health_records.insert(record))
    }

    fn delete_health_record(&self, record_id: RecordId) -> ClinicResult<()> {
        self.tables()?.health_records.remove(record_id)
    }
}

impl AppointmentStore for InMemoryStore {
    fn appt_request(&self, request_id: RequestId) -> ClinicResult<ApptRequest> {
        self.tables()?.appt_requests.get(request_id)
    }

    fn appt_requests_for(&self, hcp_id: Mid) -> ClinicResult<Vec<ApptRequest>> {
        Ok(self.tables()?.appt_requests.for_hcp(hcp_id))
    }

    fn update_appt_request(&self, request: &ApptRequest) -> ClinicResult<ApptRequest> {
        self.tables()?.appt_requests.update(request)
    }

    fn schedule_appointment(&self, appointment: &Appointment) -> ClinicResult<()> {
        self.tables()?
            .appointments
            .appointments
            .push(appointment.clone());
        Ok(())
    }
}

impl Directory for InMemoryStore {
    fn provider_display_name(&self, hcp_id: Mid) -> ClinicResult<String> {
        Ok(self.tables()?.directory.personnel(hcp_id)?.name.clone())
    }

    fn patient_display_name(&self, patient_id: Mid) -> ClinicResult<String> {
        Ok(self.tables()?.directory.patient(patient_id)?.name.clone())
    }

    fn patient_date_of_birth(&self, patient_id: Mid) -> ClinicResult<NaiveDate> {
        Ok(self.tables()?.directory.patient(patient_id)?.date_of_birth)
    }

    fn patient_exists(&self, patient_id: Mid) -> ClinicResult<bool> {
        Ok(self.tables()?.directory.has_patient(patient_id))
    }
}

impl OfficeVisitDates for InMemoryStore {
    fn visit_date_str(&self, office_visit_id: OfficeVisitId) -> ClinicResult<String> {
        self.tables()?.office_visits.visit_date_str(office_visit_id)
    }
}

/// Notifier that keeps every delivered message.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Message>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered so far, in delivery order.
    pub fn sent(&self) -> ClinicResult<Vec<Message>> {
        Ok(self.messages()?.clone())
    }

    fn messages(&self) -> ClinicResult<MutexGuard<'_, Vec<Message>>> {
        self.sent
            .lock()
            .map_err(|_| ClinicError::Notification("recording notifier lock poisoned".into()))
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, message: &Message) -> ClinicResult<()> {
        self.messages()?.push(message.clone());
        Ok(())
    }
}
