//! Appointment requests, scheduled appointments and notification messages.

use crate::constants::APPOINTMENT_DATE_FORMAT;
use crate::ids::{Mid, RequestId};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// An appointment between a health care professional and a patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub hcp_id: Mid,
    pub patient_id: Mid,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub description: String,
}

impl Appointment {
    pub fn date_display(&self) -> String {
        self.date.format(APPOINTMENT_DATE_FORMAT).to_string()
    }
}

/// Resolution state derived from the `pending`/`accepted` flags of an [`ApptRequest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApptRequestState {
    Pending,
    Accepted,
    Rejected,
}

/// A patient-initiated request for an appointment.
///
/// Requests are created outside this crate and resolved exactly once. `version` is an
/// optimistic concurrency token owned by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApptRequest {
    pub request_id: RequestId,
    pub requested_appt: Appointment,
    pub pending: bool,
    pub accepted: bool,
    #[serde(default)]
    pub version: u64,
}

impl ApptRequest {
    pub fn new(request_id: RequestId, requested_appt: Appointment) -> Self {
        Self {
            request_id,
            requested_appt,
            pending: true,
            accepted: false,
            version: 0,
        }
    }

    /// Only a pending request that has not been accepted can be acted upon.
    pub fn is_actionable(&self) -> bool {
        self.pending && !self.accepted
    }

    pub fn state(&self) -> ApptRequestState {
        if self.is_actionable() {
            ApptRequestState::Pending
        } else if self.accepted {
            ApptRequestState::Accepted
        } else {
            ApptRequestState::Rejected
        }
    }

    pub(crate) fn resolve(&mut self, accepted: bool) {
        self.pending = false;
        self.accepted = accepted;
    }
}

/// A notification delivered through the notification gateway. Never persisted by this crate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: Mid,
    pub to: Mid,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}
