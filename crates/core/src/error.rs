use crate::ids::{Mid, OfficeVisitId, RecordId, RequestId};

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("patient does not exist: {0}")]
    PatientNotFound(Mid),
    #[error("personnel does not exist: {0}")]
    PersonnelNotFound(Mid),
    #[error("health record does not exist: {0}")]
    HealthRecordNotFound(RecordId),
    #[error("appointment request does not exist: {0}")]
    ApptRequestNotFound(RequestId),
    #[error("office visit does not exist: {0}")]
    OfficeVisitNotFound(OfficeVisitId),
    #[error(
        "appointment request {request_id} was modified concurrently (expected version {expected}, found {found})"
    )]
    StaleVersion {
        request_id: RequestId,
        expected: u64,
        found: u64,
    },

    #[error("failed to create data directory: {0}")]
    DirCreation(std::io::Error),
    #[error("failed to read data file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write data file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("data access failed: {0}")]
    DataAccess(String),

    #[error("failed to deliver notification: {0}")]
    Notification(String),
}

impl ClinicError {
    /// True for failures raised by a persistence gateway rather than by the caller's input.
    pub fn is_data_access(&self) -> bool {
        matches!(
            self,
            ClinicError::DirCreation(_)
                | ClinicError::FileRead(_)
                | ClinicError::FileWrite(_)
                | ClinicError::YamlSerialization(_)
                | ClinicError::YamlDeserialization(_)
                | ClinicError::DataAccess(_)
                | ClinicError::StaleVersion { .. }
        )
    }
}

pub type ClinicResult<T> = std::result::Result<T, ClinicError>;
