//! Health record form validation.
//!
//! Validation is fail-fast: fields are checked in form order and the first violated
//! constraint is reported. A successful validation yields [`HealthMeasurements`], so a record
//! built from validated input cannot carry an unparsed or out-of-range value.

use crate::health_record::{
    total_cholesterol, HealthMeasurements, HealthRecordForm, HouseholdSmokingStatus,
    SmokingStatus,
};
use crate::ids::OfficeVisitId;
use std::fmt;

pub const TOTAL_CHOLESTEROL_MIN: u32 = 100;
pub const TOTAL_CHOLESTEROL_MAX: u32 = 600;

const BLOOD_PRESSURE_MAX: u32 = 999;
const HDL_MAX: u32 = 89;
const LDL_MAX: u32 = 600;
const TRIGLYCERIDES_MIN: u32 = 100;
const TRIGLYCERIDES_MAX: u32 = 600;

/// Form fields, named the way they appear to the person filling the form in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormField {
    OfficeVisitId,
    BloodPressureSystolic,
    BloodPressureDiastolic,
    CholesterolHdl,
    CholesterolLdl,
    CholesterolTriglycerides,
    Height,
    Weight,
    HeadCircumference,
    Smoker,
    HouseholdSmokingStatus,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormField::OfficeVisitId => "Office Visit ID",
            FormField::BloodPressureSystolic => "Blood Pressure Systolic",
            FormField::BloodPressureDiastolic => "Blood Pressure Diastolic",
            FormField::CholesterolHdl => "HDL",
            FormField::CholesterolLdl => "LDL",
            FormField::CholesterolTriglycerides => "Triglycerides",
            FormField::Height => "Height",
            FormField::Weight => "Weight",
            FormField::HeadCircumference => "Head Circumference",
            FormField::Smoker => "Smoker",
            FormField::HouseholdSmokingStatus => "Household Smoking Status",
        };
        f.write_str(name)
    }
}

/// The first constraint a [`HealthRecordForm`] violated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: FormField },
    #[error("{field} must be a whole number")]
    NotAnInteger { field: FormField },
    #[error("{field} must be in [{min},{max}]")]
    OutOfRange { field: FormField, min: u32, max: u32 },
    #[error("{field} must be a number with up to {integer_digits} digits and 1 decimal place")]
    InvalidDecimal {
        field: FormField,
        integer_digits: usize,
    },
    #[error("{field} is not a recognised status code")]
    UnknownCode { field: FormField },
    #[error("Total cholesterol must be in [100,600]")]
    TotalCholesterol { total: u32 },
}

impl ValidationError {
    /// The offending form field, or `None` when a derived value was out of range.
    pub fn field(&self) -> Option<FormField> {
        match self {
            ValidationError::Missing { field }
            | ValidationError::NotAnInteger { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidDecimal { field, .. }
            | ValidationError::UnknownCode { field } => Some(*field),
            ValidationError::TotalCholesterol { .. } => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HealthRecordValidator;

impl HealthRecordValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validates `form` and returns the parsed measurements.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered. Every field is checked in form order
    /// before the derived total cholesterol, so a bad field is reported ahead of a total outside
    /// `[100, 600]` (both bounds inclusive).
    pub fn validate(&self, form: &HealthRecordForm) -> Result<HealthMeasurements, ValidationError> {
        let office_visit_id = identifier(FormField::OfficeVisitId, &form.office_visit_id)?;
        let blood_pressure_systolic = bounded(
            FormField::BloodPressureSystolic,
            &form.blood_pressure_systolic,
            0,
            BLOOD_PRESSURE_MAX,
        )?;
        let blood_pressure_diastolic = bounded(
            FormField::BloodPressureDiastolic,
            &form.blood_pressure_diastolic,
            0,
            BLOOD_PRESSURE_MAX,
        )?;
        let cholesterol_hdl = bounded(FormField::CholesterolHdl, &form.cholesterol_hdl, 0, HDL_MAX)?;
        let cholesterol_ldl = bounded(FormField::CholesterolLdl, &form.cholesterol_ldl, 0, LDL_MAX)?;
        let cholesterol_triglycerides = bounded(
            FormField::CholesterolTriglycerides,
            &form.cholesterol_triglycerides,
            TRIGLYCERIDES_MIN,
            TRIGLYCERIDES_MAX,
        )?;

        let height = decimal(FormField::Height, &form.height, 3)?;
        let weight = decimal(FormField::Weight, &form.weight, 4)?;
        let head_circumference = decimal(FormField::HeadCircumference, &form.head_circumference, 3)?;

        let smoker = SmokingStatus::from_code(code(FormField::Smoker, &form.smoker)?)
            .ok_or(ValidationError::UnknownCode {
                field: FormField::Smoker,
            })?;
        let household_smoking_status = HouseholdSmokingStatus::from_code(code(
            FormField::HouseholdSmokingStatus,
            &form.household_smoking_status,
        )?)
        .ok_or(ValidationError::UnknownCode {
            field: FormField::HouseholdSmokingStatus,
        })?;

        let total = total_cholesterol(cholesterol_hdl, cholesterol_ldl, cholesterol_triglycerides);
        if !(TOTAL_CHOLESTEROL_MIN..=TOTAL_CHOLESTEROL_MAX).contains(&total) {
            return Err(ValidationError::TotalCholesterol { total });
        }

        Ok(HealthMeasurements {
            office_visit_id,
            blood_pressure_systolic,
            blood_pressure_diastolic,
            cholesterol_hdl,
            cholesterol_ldl,
            cholesterol_triglycerides,
            height,
            weight,
            head_circumference,
            smoker,
            household_smoking_status,
        })
    }
}

fn required(field: FormField, value: &Option<String>) -> Result<&str, ValidationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::Missing { field })
}

fn integer(field: FormField, value: &Option<String>) -> Result<u32, ValidationError> {
    let raw = required(field, value)?;
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::NotAnInteger { field });
    }
    raw.parse::<u32>()
        .map_err(|_| ValidationError::NotAnInteger { field })
}

fn identifier(field: FormField, value: &Option<String>) -> Result<OfficeVisitId, ValidationError> {
    let raw = required(field, value)?;
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::NotAnInteger { field });
    }
    raw.parse::<u64>()
        .map(OfficeVisitId::new)
        .map_err(|_| ValidationError::NotAnInteger { field })
}

fn bounded(
    field: FormField,
    value: &Option<String>,
    min: u32,
    max: u32,
) -> Result<u32, ValidationError> {
    let parsed = integer(field, value)?;
    if !(min..=max).contains(&parsed) {
        return Err(ValidationError::OutOfRange { field, min, max });
    }
    Ok(parsed)
}

/// Accepts `ddd`, `ddd.d` and `.d`, with at most `integer_digits` digits before the point.
fn decimal(
    field: FormField,
    value: &Option<String>,
    integer_digits: usize,
) -> Result<f64, ValidationError> {
    let raw = required(field, value)?;
    let invalid = ValidationError::InvalidDecimal {
        field,
        integer_digits,
    };

    let (whole, fraction) = match raw.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (raw, None),
    };

    let whole_ok = whole.len() <= integer_digits && whole.bytes().all(|b| b.is_ascii_digit());
    let fraction_ok = match fraction {
        Some(f) => f.len() == 1 && f.bytes().all(|b| b.is_ascii_digit()),
        None => !whole.is_empty(),
    };
    if !whole_ok || !fraction_ok {
        return Err(invalid);
    }

    raw.parse::<f64>().map_err(|_| invalid)
}

fn code(field: FormField, value: &Option<String>) -> Result<u8, ValidationError> {
    required(field, value)?
        .parse::<u8>()
        .map_err(|_| ValidationError::UnknownCode { field })
}
