//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into services as
//! `Arc<CoreConfig>`. Nothing in this crate reads environment variables while handling a
//! workflow call.

use crate::constants::{
    APPOINTMENTS_FILENAME, APPT_REQUESTS_FILENAME, DEFAULT_DATA_DIR, DIRECTORY_FILENAME,
    HEALTH_RECORDS_FILENAME, OFFICE_VISITS_FILENAME, OUTBOX_DIR_NAME,
};
use crate::{ClinicError, ClinicResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
}

impl CoreConfig {
    pub fn new(data_dir: PathBuf) -> ClinicResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(ClinicError::InvalidInput(
                "data directory cannot be empty".into(),
            ));
        }
        if data_dir.exists() && !data_dir.is_dir() {
            return Err(ClinicError::InvalidInput(format!(
                "data directory {} exists but is not a directory",
                data_dir.display()
            )));
        }

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn health_records_file(&self) -> PathBuf {
        self.data_dir.join(HEALTH_RECORDS_FILENAME)
    }

    pub fn appt_requests_file(&self) -> PathBuf {
        self.data_dir.join(APPT_REQUESTS_FILENAME)
    }

    pub fn appointments_file(&self) -> PathBuf {
        self.data_dir.join(APPOINTMENTS_FILENAME)
    }

    pub fn directory_file(&self) -> PathBuf {
        self.data_dir.join(DIRECTORY_FILENAME)
    }

    pub fn office_visits_file(&self) -> PathBuf {
        self.data_dir.join(OFFICE_VISITS_FILENAME)
    }

    pub fn outbox_dir(&self) -> PathBuf {
        self.data_dir.join(OUTBOX_DIR_NAME)
    }
}

/// Resolve the data directory from an optional override value (typically `CLINIC_DATA_DIR`).
///
/// Empty or whitespace-only values fall back to [`DEFAULT_DATA_DIR`].
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}
