//! Table types shared by the in-memory and YAML-backed stores.
//!
//! Each table owns one collection and the rules for reading and mutating it. The stores
//! decide where a table lives (behind a mutex, or in a file) and wrap every operation in
//! their own locking.

use crate::appointment::{Appointment, ApptRequest};
use crate::constants::VISIT_DATE_FORMAT;
use crate::error::{ClinicError, ClinicResult};
use crate::health_record::{HealthRecord, NewHealthRecord};
use crate::ids::{Mid, OfficeVisitId, RecordId, RequestId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthRecordTable {
    #[serde(default)]
    pub next_record_id: u64,
    #[serde(default)]
    pub records: Vec<HealthRecord>,
}

impl HealthRecordTable {
    pub(crate) fn get(&self, record_id: RecordId) -> ClinicResult<HealthRecord> {
        self.records
            .iter()
            .find(|r| r.record_id == record_id)
            .cloned()
            .ok_or(ClinicError::HealthRecordNotFound(record_id))
    }

    pub(crate) fn for_patient(&self, patient_id: Mid) -> Vec<HealthRecord> {
        self.records
            .iter()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect()
    }

    /// Ids are never reused, even after the highest record is deleted.
    pub(crate) fn insert(&mut self, record: NewHealthRecord) -> HealthRecord {
        let after_existing = self
            .records
            .iter()
            .map(|r| r.record_id.get() + 1)
            .max()
            .unwrap_or(1);
        let id = self.next_record_id.max(after_existing);
        self.next_record_id = id + 1;

        let record = record.with_id(RecordId::new(id));
        self.records.push(record.clone());
        record
    }

    pub(crate) fn remove(&mut self, record_id: RecordId) -> ClinicResult<()> {
        let before = self.records.len();
        self.records.retain(|r| r.record_id != record_id);
        if self.records.len() == before {
            return Err(ClinicError::HealthRecordNotFound(record_id));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApptRequestTable {
    pub requests: Vec<ApptRequest>,
}

impl ApptRequestTable {
    pub(crate) fn get(&self, request_id: RequestId) -> ClinicResult<ApptRequest> {
        self.requests
            .iter()
            .find(|r| r.request_id == request_id)
            .cloned()
            .ok_or(ClinicError::ApptRequestNotFound(request_id))
    }

    pub(crate) fn for_hcp(&self, hcp_id: Mid) -> Vec<ApptRequest> {
        self.requests
            .iter()
            .filter(|r| r.requested_appt.hcp_id == hcp_id)
            .cloned()
            .collect()
    }

    pub(crate) fn insert(&mut self, request: ApptRequest) -> ClinicResult<()> {
        if self
            .requests
            .iter()
            .any(|r| r.request_id == request.request_id)
        {
            return Err(ClinicError::InvalidInput(format!(
                "appointment request {} already exists",
                request.request_id
            )));
        }
        self.requests.push(request);
        Ok(())
    }

    /// Compare-and-swap on `version`.
    pub(crate) fn update(&mut self, request: &ApptRequest) -> ClinicResult<ApptRequest> {
        let stored = self
            .requests
            .iter_mut()
            .find(|r| r.request_id == request.request_id)
            .ok_or(ClinicError::ApptRequestNotFound(request.request_id))?;

        if stored.version != request.version {
            return Err(ClinicError::StaleVersion {
                request_id: request.request_id,
                expected: request.version,
                found: stored.version,
            });
        }

        *stored = ApptRequest {
            version: request.version + 1,
            ..request.clone()
        };
        Ok(stored.clone())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentTable {
    pub appointments: Vec<Appointment>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonnelEntry {
    pub mid: Mid,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientEntry {
    pub mid: Mid,
    pub name: String,
    pub date_of_birth: NaiveDate,
}

/// Patients and personnel known to the clinic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryData {
    #[serde(default)]
    pub personnel: Vec<PersonnelEntry>,
    #[serde(default)]
    pub patients: Vec<PatientEntry>,
}

impl DirectoryData {
    pub(crate) fn personnel(&self, mid: Mid) -> ClinicResult<&PersonnelEntry> {
        self.personnel
            .iter()
            .find(|p| p.mid == mid)
            .ok_or(ClinicError::PersonnelNotFound(mid))
    }

    pub(crate) fn patient(&self, mid: Mid) -> ClinicResult<&PatientEntry> {
        self.patients
            .iter()
            .find(|p| p.mid == mid)
            .ok_or(ClinicError::PatientNotFound(mid))
    }

    pub(crate) fn has_patient(&self, mid: Mid) -> bool {
        self.patients.iter().any(|p| p.mid == mid)
    }

    /// Adds or replaces the personnel entry with the same MID.
    pub(crate) fn upsert_personnel(&mut self, entry: PersonnelEntry) {
        self.personnel.retain(|p| p.mid != entry.mid);
        self.personnel.push(entry);
    }

    /// Adds or replaces the patient entry with the same MID.
    pub(crate) fn upsert_patient(&mut self, entry: PatientEntry) {
        self.patients.retain(|p| p.mid != entry.mid);
        self.patients.push(entry);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeVisitEntry {
    pub office_visit_id: OfficeVisitId,
    pub patient_id: Mid,
    pub visit_date: NaiveDate,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfficeVisitTable {
    pub visits: Vec<OfficeVisitEntry>,
}

impl OfficeVisitTable {
    pub(crate) fn visit_date_str(&self, office_visit_id: OfficeVisitId) -> ClinicResult<String> {
        self.visits
            .iter()
            .find(|v| v.office_visit_id == office_visit_id)
            .map(|v| v.visit_date.format(VISIT_DATE_FORMAT).to_string())
            .ok_or(ClinicError::OfficeVisitNotFound(office_visit_id))
    }

    pub(crate) fn upsert(&mut self, entry: OfficeVisitEntry) {
        self.visits
            .retain(|v| v.office_visit_id != entry.office_visit_id);
        self.visits.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health_record::{HealthMeasurements, HouseholdSmokingStatus, SmokingStatus};
    use chrono::NaiveDate;

    fn new_record(patient: u64) -> NewHealthRecord {
        NewHealthRecord {
            patient_id: Mid::new(patient),
            personnel_id: Mid::new(9000000000),
            measurements: HealthMeasurements {
                office_visit_id: OfficeVisitId::new(1),
                blood_pressure_systolic: 110,
                blood_pressure_diastolic: 70,
                cholesterol_hdl: 45,
                cholesterol_ldl: 120,
                cholesterol_triglycerides: 150,
                height: 68.0,
                weight: 160.0,
                head_circumference: 21.5,
                smoker: SmokingStatus::Former,
                household_smoking_status: HouseholdSmokingStatus::OutdoorSmokers,
            },
        }
    }

    fn request(id: u64) -> ApptRequest {
        ApptRequest::new(
            RequestId::new(id),
            Appointment {
                hcp_id: Mid::new(9000000000),
                patient_id: Mid::new(2),
                date: NaiveDate::from_ymd_opt(2026, 12, 1)
                    .unwrap()
                    .and_hms_opt(14, 0, 0)
                    .unwrap(),
                description: String::new(),
            },
        )
    }

    #[test]
    fn record_ids_are_not_reused_after_delete() {
        let mut table = HealthRecordTable::default();
        let first = table.insert(new_record(1));
        let second = table.insert(new_record(1));
        assert_eq!(first.record_id, RecordId::new(1));
        assert_eq!(second.record_id, RecordId::new(2));

        table.remove(second.record_id).unwrap();
        let third = table.insert(new_record(1));
        assert_eq!(third.record_id, RecordId::new(3));
    }

    #[test]
    fn remove_missing_record_is_not_found() {
        let mut table = HealthRecordTable::default();
        let err = table.remove(RecordId::new(5)).unwrap_err();
        assert!(matches!(err, ClinicError::HealthRecordNotFound(id) if id == RecordId::new(5)));
    }

    #[test]
    fn for_patient_preserves_insertion_order() {
        let mut table = HealthRecordTable::default();
        let a = table.insert(new_record(1));
        table.insert(new_record(2));
        let c = table.insert(new_record(1));

        let ids: Vec<_> = table
            .for_patient(Mid::new(1))
            .into_iter()
            .map(|r| r.record_id)
            .collect();
        assert_eq!(ids, vec![a.record_id, c.record_id]);
    }

    #[test]
    fn update_bumps_version_and_rejects_stale_writes() {
        let mut table = ApptRequestTable::default();
        table.insert(request(7)).unwrap();

        let mut first = table.get(RequestId::new(7)).unwrap();
        let mut second = first.clone();

        first.resolve(true);
        let stored = table.update(&first).unwrap();
        assert_eq!(stored.version, 1);

        second.resolve(false);
        let err = table.update(&second).unwrap_err();
        assert!(matches!(
            err,
            ClinicError::StaleVersion {
                expected: 0,
                found: 1,
                ..
            }
        ));
        assert!(table.get(RequestId::new(7)).unwrap().accepted);
    }

    #[test]
    fn duplicate_request_ids_are_rejected() {
        let mut table = ApptRequestTable::default();
        table.insert(request(1)).unwrap();
        assert!(matches!(
            table.insert(request(1)),
            Err(ClinicError::InvalidInput(_))
        ));
    }

    #[test]
    fn visit_date_uses_month_day_year() {
        let mut visits = OfficeVisitTable::default();
        visits.upsert(OfficeVisitEntry {
            office_visit_id: OfficeVisitId::new(955),
            patient_id: Mid::new(2),
            visit_date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
        });
        assert_eq!(
            visits.visit_date_str(OfficeVisitId::new(955)).unwrap(),
            "03/09/2026"
        );
        assert!(matches!(
            visits.visit_date_str(OfficeVisitId::new(1)),
            Err(ClinicError::OfficeVisitNotFound(_))
        ));
    }
}
