//! The two clinical workflows.
//!
//! Each workflow is a short-lived object built per request around the acting user. It owns no
//! storage; every read and write goes through the collaborators in [`crate::gateways`].

pub mod appt_requests;
pub mod health_history;

pub use appt_requests::{ApptRequestWorkflow, ApptResolution, ResolutionOutcome};
pub use health_history::{AddRecordOutcome, HealthHistoryWorkflow};
