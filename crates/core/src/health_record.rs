//! Health record types.
//!
//! A health record moves through three shapes:
//! - [`HealthRecordForm`]: raw text exactly as entered, nothing guaranteed.
//! - [`HealthMeasurements`]: the parsed, range-checked values produced by
//!   [`HealthRecordValidator`](crate::validation::HealthRecordValidator).
//! - [`NewHealthRecord`] / [`HealthRecord`]: measurements bound to a patient and author, before
//!   and after the store assigns a [`RecordId`].

use crate::ids::{Mid, OfficeVisitId, RecordId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw health history input. Blank fields are treated the same as missing ones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthRecordForm {
    pub office_visit_id: Option<String>,
    pub blood_pressure_systolic: Option<String>,
    pub blood_pressure_diastolic: Option<String>,
    pub cholesterol_hdl: Option<String>,
    pub cholesterol_ldl: Option<String>,
    pub cholesterol_triglycerides: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub head_circumference: Option<String>,
    pub smoker: Option<String>,
    pub household_smoking_status: Option<String>,
}

/// Patient smoking status, stored by its numeric code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SmokingStatus {
    CurrentEveryDay,
    CurrentSomeDay,
    Former,
    Never,
    CurrentStatusUnknown,
    Unknown,
}

impl SmokingStatus {
    pub fn code(self) -> u8 {
        match self {
            SmokingStatus::CurrentEveryDay => 1,
            SmokingStatus::CurrentSomeDay => 2,
            SmokingStatus::Former => 3,
            SmokingStatus::Never => 4,
            SmokingStatus::CurrentStatusUnknown => 5,
            SmokingStatus::Unknown => 9,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(SmokingStatus::CurrentEveryDay),
            2 => Some(SmokingStatus::CurrentSomeDay),
            3 => Some(SmokingStatus::Former),
            4 => Some(SmokingStatus::Never),
            5 => Some(SmokingStatus::CurrentStatusUnknown),
            9 => Some(SmokingStatus::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for SmokingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SmokingStatus::CurrentEveryDay => "Current every day smoker",
            SmokingStatus::CurrentSomeDay => "Current some day smoker",
            SmokingStatus::Former => "Former smoker",
            SmokingStatus::Never => "Never smoker",
            SmokingStatus::CurrentStatusUnknown => "Smoker, current status unknown",
            SmokingStatus::Unknown => "Unknown if ever smoked",
        };
        f.write_str(label)
    }
}

impl TryFrom<u8> for SmokingStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown smoking status code {code}"))
    }
}

impl From<SmokingStatus> for u8 {
    fn from(status: SmokingStatus) -> Self {
        status.code()
    }
}

/// Smoking exposure within the patient's household.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HouseholdSmokingStatus {
    NonSmoking,
    OutdoorSmokers,
    IndoorSmokers,
}

impl HouseholdSmokingStatus {
    pub fn code(self) -> u8 {
        match self {
            HouseholdSmokingStatus::NonSmoking => 1,
            HouseholdSmokingStatus::OutdoorSmokers => 2,
            HouseholdSmokingStatus::IndoorSmokers => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(HouseholdSmokingStatus::NonSmoking),
            2 => Some(HouseholdSmokingStatus::OutdoorSmokers),
            3 => Some(HouseholdSmokingStatus::IndoorSmokers),
            _ => None,
        }
    }
}

impl fmt::Display for HouseholdSmokingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HouseholdSmokingStatus::NonSmoking => "Non-smoking household",
            HouseholdSmokingStatus::OutdoorSmokers => "Outdoor smokers",
            HouseholdSmokingStatus::IndoorSmokers => "Indoor smokers",
        };
        f.write_str(label)
    }
}

impl TryFrom<u8> for HouseholdSmokingStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown household smoking status code {code}"))
    }
}

impl From<HouseholdSmokingStatus> for u8 {
    fn from(status: HouseholdSmokingStatus) -> Self {
        status.code()
    }
}

/// Validated measurements taken from a [`HealthRecordForm`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthMeasurements {
    pub office_visit_id: OfficeVisitId,
    pub blood_pressure_systolic: u32,
    pub blood_pressure_diastolic: u32,
    pub cholesterol_hdl: u32,
    pub cholesterol_ldl: u32,
    pub cholesterol_triglycerides: u32,
    pub height: f64,
    pub weight: f64,
    pub head_circumference: f64,
    pub smoker: SmokingStatus,
    pub household_smoking_status: HouseholdSmokingStatus,
}

impl HealthMeasurements {
    /// HDL + LDL + triglycerides / 5, using integer division.
    pub fn total_cholesterol(&self) -> u32 {
        total_cholesterol(
            self.cholesterol_hdl,
            self.cholesterol_ldl,
            self.cholesterol_triglycerides,
        )
    }
}

pub(crate) fn total_cholesterol(hdl: u32, ldl: u32, triglycerides: u32) -> u32 {
    hdl + ldl + triglycerides / 5
}

/// A health record that has not been persisted yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewHealthRecord {
    pub patient_id: Mid,
    /// The personnel member who recorded the measurements, never the patient.
    pub personnel_id: Mid,
    #[serde(flatten)]
    pub measurements: HealthMeasurements,
}

impl NewHealthRecord {
    pub fn with_id(self, record_id: RecordId) -> HealthRecord {
        HealthRecord {
            record_id,
            patient_id: self.patient_id,
            personnel_id: self.personnel_id,
            measurements: self.measurements,
        }
    }
}

/// A persisted health record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub record_id: RecordId,
    pub patient_id: Mid,
    pub personnel_id: Mid,
    #[serde(flatten)]
    pub measurements: HealthMeasurements,
}

impl HealthRecord {
    pub fn office_visit_id(&self) -> OfficeVisitId {
        self.measurements.office_visit_id
    }

    pub fn total_cholesterol(&self) -> u32 {
        self.measurements.total_cholesterol()
    }
}
