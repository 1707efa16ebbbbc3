//! # Clinic Core
//!
//! Business logic for the clinic's health history and appointment request workflows.
//!
//! This crate contains:
//! - Domain types for health records, appointment requests and notification messages
//! - Validation of raw health history input
//! - The [`HealthHistoryWorkflow`] and [`ApptRequestWorkflow`] operations
//! - Gateway traits plus in-memory and YAML file implementations
//!
//! **No presentation concerns**: argument parsing, output formatting and logging setup belong
//! in the `clinic` binary.

pub mod appointment;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateways;
pub mod health_record;
pub mod ids;
pub mod repositories;
pub mod validation;
pub mod workflows;

#[cfg(test)]
mod test_support;

pub use appointment::{Appointment, ApptRequest, ApptRequestState, Message};
pub use config::CoreConfig;
pub use error::{ClinicError, ClinicResult};
pub use gateways::{
    AppointmentStore, BestEffort, Directory, HealthRecordStore, Notifier, OfficeVisitDates,
};
pub use health_record::{
    HealthMeasurements, HealthRecord, HealthRecordForm, HouseholdSmokingStatus, NewHealthRecord,
    SmokingStatus,
};
pub use ids::{Mid, OfficeVisitId, RecordId, RequestId};
pub use validation::{FormField, HealthRecordValidator, ValidationError};
pub use workflows::{
    AddRecordOutcome, ApptRequestWorkflow, ApptResolution, HealthHistoryWorkflow,
    ResolutionOutcome,
};
