//! Fixtures shared by the unit tests.

use crate::appointment::Appointment;
use crate::health_record::HealthRecordForm;
use crate::ids::Mid;
use chrono::NaiveDate;

pub const HCP: Mid = Mid::new(9000000000);
pub const PATIENT: Mid = Mid::new(2);

/// A form that passes validation, with a total cholesterol of 180.
pub fn valid_form() -> HealthRecordForm {
    HealthRecordForm {
        office_visit_id: Some("955".into()),
        blood_pressure_systolic: Some("120".into()),
        blood_pressure_diastolic: Some("80".into()),
        cholesterol_hdl: Some("50".into()),
        cholesterol_ldl: Some("100".into()),
        cholesterol_triglycerides: Some("150".into()),
        height: Some("70.5".into()),
        weight: Some("180".into()),
        head_circumference: Some("22.1".into()),
        smoker: Some("4".into()),
        household_smoking_status: Some("1".into()),
    }
}

/// `HCP` seeing `PATIENT` on 2026-11-03 at 09:30.
pub fn appointment() -> Appointment {
    Appointment {
        hcp_id: HCP,
        patient_id: PATIENT,
        date: NaiveDate::from_ymd_opt(2026, 11, 3)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .expect("valid fixture date"),
        description: "Annual physical".into(),
    }
}
