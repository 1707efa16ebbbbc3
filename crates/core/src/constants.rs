//! Constants used throughout the clinic core crate.
//!
//! File names for the YAML data directory and the fixed user-facing strings returned by the
//! workflows live here so callers and tests can match on them.

/// Default directory for clinic data when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "clinic_data";

/// Health records, all patients.
pub const HEALTH_RECORDS_FILENAME: &str = "health_records.yaml";

/// Appointment requests, all providers.
pub const APPT_REQUESTS_FILENAME: &str = "appt_requests.yaml";

/// Appointments scheduled by accepting a request.
pub const APPOINTMENTS_FILENAME: &str = "appointments.yaml";

/// Patients and personnel.
pub const DIRECTORY_FILENAME: &str = "directory.yaml";

pub const OFFICE_VISITS_FILENAME: &str = "office_visits.yaml";

/// Directory name for delivered notification messages.
pub const OUTBOX_DIR_NAME: &str = "outbox";

/// Rendering used for office visit dates.
pub const VISIT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Rendering used when an appointment date is shown to a patient, and accepted by the CLI.
pub const APPOINTMENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const INFORMATION_RECORDED: &str = "Information Recorded";

pub const APPT_REQUEST_SUBJECT: &str = "Your appointment request";

pub const APPT_ACCEPTED_MESSAGE: &str =
    "The appointment request you selected has been accepted and scheduled.";

pub const APPT_REJECTED_MESSAGE: &str = "The appointment request you selected has been rejected.";

pub const APPT_ALREADY_ACTED_UPON_MESSAGE: &str =
    "The appointment request you selected has already been acted upon.";
