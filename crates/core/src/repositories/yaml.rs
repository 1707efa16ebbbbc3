//! YAML-file gateway implementation.
//!
//! Every table lives in its own file under the configured data directory:
//!
//! ```text
//! clinic_data/
//!   health_records.yaml   # next_record_id + records, all patients
//!   appt_requests.yaml    # list of appointment requests
//!   appointments.yaml     # appointments scheduled by accepting requests
//!   directory.yaml        # personnel + patients
//!   office_visits.yaml    # office visit dates
//! ```
//!
//! A missing or empty file reads as an empty table. Each call loads the table, applies the
//! operation and, for writes, saves it back through a temporary file and a rename. An
//! in-process mutex serialises calls; cross-process writers are not coordinated.

use crate::appointment::{Appointment, ApptRequest};
use crate::config::CoreConfig;
use crate::error::{ClinicError, ClinicResult};
use crate::gateways::{AppointmentStore, Directory, HealthRecordStore, OfficeVisitDates};
use crate::health_record::{HealthRecord, NewHealthRecord};
use crate::ids::{Mid, OfficeVisitId, RecordId, RequestId};
use crate::repositories::shared::{
    AppointmentTable, ApptRequestTable, DirectoryData, HealthRecordTable, OfficeVisitEntry,
    OfficeVisitTable, PatientEntry, PersonnelEntry,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug)]
pub struct YamlStore {
    cfg: Arc<CoreConfig>,
    write_lock: Mutex<()>,
}

impl YamlStore {
    /// Creates a store over the tables in `cfg.data_dir()`.
    ///
    /// Nothing is touched on disk until the first write, which creates the data directory.
    ///
    /// # Arguments
    ///
    /// * `cfg` - Core configuration containing the data directory and table file paths
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            cfg,
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> ClinicResult<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| ClinicError::DataAccess("YAML store lock poisoned".into()))
    }

    /// Loads the table at `path`, applies `op` and saves the result if `op` succeeded.
    fn modify<T, R>(&self, path: &Path, op: impl FnOnce(&mut T) -> ClinicResult<R>) -> ClinicResult<R>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let _guard = self.lock()?;
        let mut table: T = load_table(path)?;
        let result = op(&mut table)?;
        save_table(self.cfg.data_dir(), path, &table)?;
        Ok(result)
    }

    fn read<T, R>(&self, path: &Path, op: impl FnOnce(&T) -> ClinicResult<R>) -> ClinicResult<R>
    where
        T: DeserializeOwned + Default,
    {
        let _guard = self.lock()?;
        let table: T = load_table(path)?;
        op(&table)
    }

    /// Adds a member of personnel to `directory.yaml`, replacing any entry with the same MID.
    ///
    /// # Arguments
    ///
    /// * `mid` - MID of the provider
    /// * `name` - Display name used in notification bodies
    ///
    /// # Errors
    ///
    /// Returns `ClinicError` if the directory file cannot be read, parsed or written.
    pub fn register_personnel(&self, mid: Mid, name: impl Into<String>) -> ClinicResult<()> {
        let entry = PersonnelEntry {
            mid,
            name: name.into(),
        };
        self.modify(&self.cfg.directory_file(), |d: &mut DirectoryData| {
            d.upsert_personnel(entry);
            Ok(())
        })
    }

    /// Adds a patient to `directory.yaml`, replacing any entry with the same MID.
    ///
    /// # Arguments
    ///
    /// * `mid` - MID of the patient
    /// * `name` - Display name
    /// * `date_of_birth` - Date of birth shown alongside the health history
    ///
    /// # Errors
    ///
    /// Returns `ClinicError` if the directory file cannot be read, parsed or written.
    pub fn register_patient(
        &self,
        mid: Mid,
        name: impl Into<String>,
        date_of_birth: NaiveDate,
    ) -> ClinicResult<()> {
        let entry = PatientEntry {
            mid,
            name: name.into(),
            date_of_birth,
        };
        self.modify(&self.cfg.directory_file(), |d: &mut DirectoryData| {
            d.upsert_patient(entry);
            Ok(())
        })
    }

    /// Records the date of an office visit in `office_visits.yaml`.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError` if the office visit file cannot be read, parsed or written.
    pub fn register_office_visit(
        &self,
        office_visit_id: OfficeVisitId,
        patient_id: Mid,
        visit_date: NaiveDate,
    ) -> ClinicResult<()> {
        let entry = OfficeVisitEntry {
            office_visit_id,
            patient_id,
            visit_date,
        };
        self.modify(&self.cfg.office_visits_file(), |t: &mut OfficeVisitTable| {
            t.upsert(entry);
            Ok(())
        })
    }

    /// Stores a patient-initiated request in `appt_requests.yaml`.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::InvalidInput`] if a request with the same id already exists, or
    /// any file error.
    pub fn submit_appt_request(&self, request: ApptRequest) -> ClinicResult<()> {
        self.modify(&self.cfg.appt_requests_file(), |t: &mut ApptRequestTable| {
            t.insert(request)
        })
    }

    pub fn scheduled_appointments(&self) -> ClinicResult<Vec<Appointment>> {
        self.read(&self.cfg.appointments_file(), |t: &AppointmentTable| {
            Ok(t.appointments.clone())
        })
    }
}

fn load_table<T: DeserializeOwned + Default>(path: &Path) -> ClinicResult<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(ClinicError::FileRead(e)),
    };

    if contents.trim().is_empty() {
        return Ok(T::default());
    }

    serde_yaml::from_str(&contents).map_err(ClinicError::YamlDeserialization)
}

fn save_table<T: Serialize>(data_dir: &Path, path: &Path, table: &T) -> ClinicResult<()> {
    fs::create_dir_all(data_dir).map_err(ClinicError::DirCreation)?;

    let yaml = serde_yaml::to_string(table).map_err(ClinicError::YamlSerialization)?;
    let tmp = path.with_extension("yaml.tmp");
    fs::write(&tmp, yaml).map_err(ClinicError::FileWrite)?;
    fs::rename(&tmp, path).map_err(ClinicError::FileWrite)
}

impl HealthRecordStore for YamlStore {
    fn health_record(&self, record_id: RecordId) -> ClinicResult<HealthRecord> {
        self.read(&self.cfg.health_records_file(), |t: &HealthRecordTable| {
            t.get(record_id)
        })
    }

    fn health_records_for(&self, patient_id: Mid) -> ClinicResult<Vec<HealthRecord>> {
        self.read(&self.cfg.health_records_file(), |t: &HealthRecordTable| {
            Ok(t.for_patient(patient_id))
        })
    }

    fn add_health_record(&self, record: NewHealthRecord) -> ClinicResult<HealthRecord> {
        self.modify(&self.cfg.health_records_file(), |t: &mut HealthRecordTable| {
            Ok(t.insert(record))
        })
    }

    fn delete_health_record(&self, record_id: RecordId) -> ClinicResult<()> {
        self.modify(&self.cfg.health_records_file(), |t: &mut HealthRecordTable| {
            t.remove(record_id)
        })
    }
}

impl AppointmentStore for YamlStore {
    fn appt_request(&self, request_id: RequestId) -> ClinicResult<ApptRequest> {
        self.read(&self.cfg.appt_requests_file(), |t: &ApptRequestTable| {
            t.get(request_id)
        })
    }

    fn appt_requests_for(&self, hcp_id: Mid) -> ClinicResult<Vec<ApptRequest>> {
        self.read(&self.cfg.appt_requests_file(), |t: &ApptRequestTable| {
            Ok(t.for_hcp(hcp_id))
        })
    }

    fn update_appt_request(&self, request: &ApptRequest) -> ClinicResult<ApptRequest> {
        self.modify(&self.cfg.appt_requests_file(), |t: &mut ApptRequestTable| {
            t.update(request)
        })
    }

    fn schedule_appointment(&self, appointment: &Appointment) -> ClinicResult<()> {
        self.modify(&self.cfg.appointments_file(), |t: &mut AppointmentTable| {
            t.appointments.push(appointment.clone());
            Ok(())
        })
    }
}

impl Directory for YamlStore {
    fn provider_display_name(&self, hcp_id: Mid) -> ClinicResult<String> {
        self.read(&self.cfg.directory_file(), |d: &DirectoryData| {
            Ok(d.personnel(hcp_id)?.name.clone())
        })
    }

    fn patient_display_name(&self, patient_id: Mid) -> ClinicResult<String> {
        self.read(&self.cfg.directory_file(), |d: &DirectoryData| {
            Ok(d.patient(patient_id)?.name.clone())
        })
    }

    fn patient_date_of_birth(&self, patient_id: Mid) -> ClinicResult<NaiveDate> {
        self.read(&self.cfg.directory_file(), |d: &DirectoryData| {
            Ok(d.patient(patient_id)?.date_of_birth)
        })
    }

    fn patient_exists(&self, patient_id: Mid) -> ClinicResult<bool> {
        self.read(&self.cfg.directory_file(), |d: &DirectoryData| {
            Ok(d.has_patient(patient_id))
        })
    }
}

impl OfficeVisitDates for YamlStore {
    fn visit_date_str(&self, office_visit_id: OfficeVisitId) -> ClinicResult<String> {
        self.read(&self.cfg.office_visits_file(), |t: &OfficeVisitTable| {
            t.visit_date_str(office_visit_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health_record::{HealthMeasurements, HouseholdSmokingStatus, SmokingStatus};
    use tempfile::TempDir;

    fn test_store() -> (TempDir, YamlStore) {
        let temp_dir = TempDir::new().unwrap();
        let cfg = Arc::new(CoreConfig::new(temp_dir.path().join("data")).unwrap());
        (temp_dir, YamlStore::new(cfg))
    }

    fn new_record(patient: u64, office_visit: u64) -> NewHealthRecord {
        NewHealthRecord {
            patient_id: Mid::new(patient),
            personnel_id: Mid::new(9000000000),
            measurements: HealthMeasurements {
                office_visit_id: OfficeVisitId::new(office_visit),
                blood_pressure_systolic: 118,
                blood_pressure_diastolic: 76,
                cholesterol_hdl: 60,
                cholesterol_ldl: 110,
                cholesterol_triglycerides: 140,
                height: 65.5,
                weight: 140.5,
                head_circumference: 21.0,
                smoker: SmokingStatus::Never,
                household_smoking_status: HouseholdSmokingStatus::NonSmoking,
            },
        }
    }

    #[test]
    fn reads_from_missing_data_dir_are_empty() {
        let (_temp, store) = test_store();
        assert!(store.health_records_for(Mid::new(2)).unwrap().is_empty());
        assert!(store.appt_requests_for(Mid::new(9)).unwrap().is_empty());
        assert!(!store.patient_exists(Mid::new(2)).unwrap());
    }

    #[test]
    fn health_records_persist_across_store_instances() {
        let (temp, store) = test_store();
        let added = store.add_health_record(new_record(2, 955)).unwrap();

        let cfg = Arc::new(CoreConfig::new(temp.path().join("data")).unwrap());
        let reopened = YamlStore::new(cfg);
        let records = reopened.health_records_for(Mid::new(2)).unwrap();
        assert_eq!(records, vec![added.clone()]);
        assert_eq!(reopened.health_record(added.record_id).unwrap(), added);
    }

    #[test]
    fn delete_removes_record_from_file() {
        let (_temp, store) = test_store();
        let added = store.add_health_record(new_record(2, 955)).unwrap();
        store.delete_health_record(added.record_id).unwrap();
        assert!(store.health_records_for(Mid::new(2)).unwrap().is_empty());
        assert!(matches!(
            store.delete_health_record(added.record_id),
            Err(ClinicError::HealthRecordNotFound(_))
        ));
    }

    #[test]
    fn failed_write_leaves_table_untouched() {
        let (_temp, store) = test_store();
        let request = ApptRequest::new(
            RequestId::new(1),
            Appointment {
                hcp_id: Mid::new(9),
                patient_id: Mid::new(2),
                date: NaiveDate::from_ymd_opt(2026, 10, 20)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap(),
                description: "Flu shot".into(),
            },
        );
        store.submit_appt_request(request.clone()).unwrap();

        let mut stale = request.clone();
        stale.version = 4;
        stale.resolve(true);
        assert!(matches!(
            store.update_appt_request(&stale),
            Err(ClinicError::StaleVersion { .. })
        ));
        assert_eq!(store.appt_request(RequestId::new(1)).unwrap(), request);
    }

    #[test]
    fn corrupted_file_is_a_deserialization_error() {
        let (temp, store) = test_store();
        let data_dir = temp.path().join("data");
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(data_dir.join("directory.yaml"), "patients: [not, a, patient").unwrap();

        assert!(matches!(
            store.patient_exists(Mid::new(2)),
            Err(ClinicError::YamlDeserialization(_))
        ));
    }

    #[test]
    fn directory_and_visits_round_trip_through_files() {
        let (_temp, store) = test_store();
        store.register_personnel(Mid::new(9000000000), "Kelly Doctor").unwrap();
        store
            .register_patient(
                Mid::new(2),
                "Andy Programmer",
                NaiveDate::from_ymd_opt(1984, 5, 19).unwrap(),
            )
            .unwrap();
        store
            .register_office_visit(
                OfficeVisitId::new(955),
                Mid::new(2),
                NaiveDate::from_ymd_opt(2026, 6, 10).unwrap(),
            )
            .unwrap();

        assert_eq!(
            store.provider_display_name(Mid::new(9000000000)).unwrap(),
            "Kelly Doctor"
        );
        assert_eq!(
            store.patient_date_of_birth(Mid::new(2)).unwrap(),
            NaiveDate::from_ymd_opt(1984, 5, 19).unwrap()
        );
        assert_eq!(
            store.visit_date_str(OfficeVisitId::new(955)).unwrap(),
            "06/10/2026"
        );
    }
}
