//! Appointment request workflow.
//!
//! A provider reviews the appointment requests addressed to them and either accepts or
//! rejects each one. Resolution happens exactly once per request:
//!
//! ```text
//! Pending --accept--> Accepted   (appointment scheduled, patient notified)
//! Pending --reject--> Rejected   (patient notified)
//! Accepted / Rejected --accept|reject--> no change, "already acted upon"
//! ```
//!
//! Writes use the request's version token, so when two callers race to resolve the same
//! request only the first write lands; the second caller sees "already acted upon".

use crate::appointment::{Appointment, ApptRequest, Message};
use crate::constants::{
    APPT_ACCEPTED_MESSAGE, APPT_ALREADY_ACTED_UPON_MESSAGE, APPT_REJECTED_MESSAGE,
    APPT_REQUEST_SUBJECT,
};
use crate::error::{ClinicError, ClinicResult};
use crate::gateways::{AppointmentStore, BestEffort, Directory, Notifier};
use crate::ids::{Mid, RequestId};
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolutionOutcome {
    Accepted,
    Rejected,
    /// The request had already been resolved; nothing was changed.
    AlreadyActedUpon,
}

impl ResolutionOutcome {
    pub fn message(self) -> &'static str {
        match self {
            ResolutionOutcome::Accepted => APPT_ACCEPTED_MESSAGE,
            ResolutionOutcome::Rejected => APPT_REJECTED_MESSAGE,
            ResolutionOutcome::AlreadyActedUpon => APPT_ALREADY_ACTED_UPON_MESSAGE,
        }
    }
}

/// Result of accepting or rejecting a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApptResolution {
    pub request_id: RequestId,
    pub outcome: ResolutionOutcome,
    /// Delivery of the patient notification. Never affects `outcome`.
    pub notification: BestEffort,
}

impl ApptResolution {
    fn already_acted_upon(request_id: RequestId) -> Self {
        Self {
            request_id,
            outcome: ResolutionOutcome::AlreadyActedUpon,
            notification: BestEffort::Completed,
        }
    }

    pub fn message(&self) -> &'static str {
        self.outcome.message()
    }
}

pub struct ApptRequestWorkflow {
    store: Arc<dyn AppointmentStore>,
    directory: Arc<dyn Directory>,
    notifier: Arc<dyn Notifier>,
    hcp_id: Mid,
}

impl ApptRequestWorkflow {
    /// Creates a workflow acting for the provider `hcp_id`.
    ///
    /// # Arguments
    ///
    /// * `store` - Store holding the requests and the scheduled appointments
    /// * `directory` - Provides the provider's display name for notification bodies
    /// * `notifier` - Delivers the accepted/rejected message to the patient
    /// * `hcp_id` - MID of the logged-in provider; scopes [`appt_requests`](Self::appt_requests)
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        directory: Arc<dyn Directory>,
        notifier: Arc<dyn Notifier>,
        hcp_id: Mid,
    ) -> Self {
        Self {
            store,
            directory,
            notifier,
            hcp_id,
        }
    }

    pub fn hcp_id(&self) -> Mid {
        self.hcp_id
    }

    /// Requests addressed to the acting provider, in store order.
    pub fn appt_requests(&self) -> ClinicResult<Vec<ApptRequest>> {
        self.store.appt_requests_for(self.hcp_id)
    }

    /// Number of requests in `requests` still flagged pending, whatever their `accepted` flag.
    pub fn num_requests(requests: &[ApptRequest]) -> usize {
        requests.iter().filter(|r| r.pending).count()
    }

    /// Accepts a pending request and schedules its appointment.
    ///
    /// The request is written back first, then the appointment is scheduled, then the patient
    /// is notified.
    ///
    /// # Returns
    ///
    /// [`ResolutionOutcome::Accepted`], or [`ResolutionOutcome::AlreadyActedUpon`] when the
    /// request was resolved earlier or by a concurrent caller. Nothing is changed in that case.
    ///
    /// # Errors
    ///
    /// Store failures while reading, updating or scheduling. A failed notification is not
    /// an error; see [`ApptResolution::notification`].
    pub fn accept_appt_request(&self, request_id: RequestId) -> ClinicResult<ApptResolution> {
        self.resolve(request_id, true)
    }

    /// Rejects a pending request. Nothing is scheduled.
    ///
    /// # Returns
    ///
    /// [`ResolutionOutcome::Rejected`], or [`ResolutionOutcome::AlreadyActedUpon`] as for
    /// [`accept_appt_request`](Self::accept_appt_request).
    ///
    /// # Errors
    ///
    /// Store failures while reading or updating the request.
    pub fn reject_appt_request(&self, request_id: RequestId) -> ClinicResult<ApptResolution> {
        self.resolve(request_id, false)
    }

    fn resolve(&self, request_id: RequestId, accept: bool) -> ClinicResult<ApptResolution> {
        let mut request = self.store.appt_request(request_id)?;
        if !request.is_actionable() {
            tracing::info!(request = %request_id, state = ?request.state(), "appointment request already resolved");
            return Ok(ApptResolution::already_acted_upon(request_id));
        }

        request.resolve(accept);
        let stored = match self.store.update_appt_request(&request) {
            Ok(stored) => stored,
            Err(ClinicError::StaleVersion { .. }) => {
                tracing::warn!(request = %request_id, "appointment request resolved concurrently");
                return Ok(ApptResolution::already_acted_upon(request_id));
            }
            Err(e) => return Err(e),
        };

        if accept {
            self.store.schedule_appointment(&stored.requested_appt)?;
        }

        let outcome = if accept {
            ResolutionOutcome::Accepted
        } else {
            ResolutionOutcome::Rejected
        };
        tracing::info!(request = %request_id, hcp = %self.hcp_id, ?outcome, "appointment request resolved");

        let notify = || -> ClinicResult<()> {
            let message = self.construct_message(&stored.requested_appt, accept)?;
            self.notifier.send(&message)
        };
        let notification = BestEffort::attempt("appointment request notification", notify);

        Ok(ApptResolution {
            request_id,
            outcome,
            notification,
        })
    }

    fn construct_message(&self, appt: &Appointment, accepted: bool) -> ClinicResult<Message> {
        let provider = self.directory.provider_display_name(appt.hcp_id)?;
        let verdict = if accepted { "accepted." } else { "rejected." };

        Ok(Message {
            from: appt.hcp_id,
            to: appt.patient_id,
            subject: APPT_REQUEST_SUBJECT.to_string(),
            body: format!(
                "Your appointment request with {} on {} has been {}",
                provider,
                appt.date_display(),
                verdict
            ),
            sent_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::{InMemoryStore, RecordingNotifier};
    use crate::test_support::{appointment, HCP, PATIENT};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn send(&self, _: &Message) -> ClinicResult<()> {
            Err(ClinicError::Notification("mail relay down".into()))
        }
    }

    /// Store that lets a competing caller resolve the request between our read and write.
    struct RacingStore {
        inner: InMemoryStore,
        raced: AtomicBool,
    }

    impl AppointmentStore for RacingStore {
        fn appt_request(&self, request_id: RequestId) -> ClinicResult<ApptRequest> {
            let snapshot = self.inner.appt_request(request_id)?;
            if !self.raced.swap(true, Ordering::SeqCst) {
                let mut competitor = snapshot.clone();
                competitor.resolve(false);
                self.inner.update_appt_request(&competitor)?;
            }
            Ok(snapshot)
        }
        fn appt_requests_for(&self, hcp_id: Mid) -> ClinicResult<Vec<ApptRequest>> {
            self.inner.appt_requests_for(hcp_id)
        }
        fn update_appt_request(&self, request: &ApptRequest) -> ClinicResult<ApptRequest> {
            self.inner.update_appt_request(request)
        }
        fn schedule_appointment(&self, appointment: &Appointment) -> ClinicResult<()> {
            self.inner.schedule_appointment(appointment)
        }
    }

    /// Store whose reads and writes fail.
    struct OfflineStore;

    impl AppointmentStore for OfflineStore {
        fn appt_request(&self, _: RequestId) -> ClinicResult<ApptRequest> {
            Err(ClinicError::DataAccess("appointments offline".into()))
        }
        fn appt_requests_for(&self, _: Mid) -> ClinicResult<Vec<ApptRequest>> {
            Err(ClinicError::DataAccess("appointments offline".into()))
        }
        fn update_appt_request(&self, _: &ApptRequest) -> ClinicResult<ApptRequest> {
            Err(ClinicError::DataAccess("appointments offline".into()))
        }
        fn schedule_appointment(&self, _: &Appointment) -> ClinicResult<()> {
            Err(ClinicError::DataAccess("appointments offline".into()))
        }
    }

    fn seeded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store.register_personnel(HCP, "Kelly Doctor").unwrap();
        store
            .submit_appt_request(ApptRequest::new(RequestId::new(7), appointment()))
            .unwrap();
        store
    }

    fn workflow(
        store: &Arc<InMemoryStore>,
        notifier: Arc<dyn Notifier>,
    ) -> ApptRequestWorkflow {
        ApptRequestWorkflow::new(store.clone(), store.clone(), notifier, HCP)
    }

    #[test]
    fn accept_resolves_schedules_and_notifies() {
        let store = seeded_store();
        let notifier = Arc::new(RecordingNotifier::new());
        let wf = workflow(&store, notifier.clone());

        let resolution = wf.accept_appt_request(RequestId::new(7)).unwrap();
        assert_eq!(resolution.outcome, ResolutionOutcome::Accepted);
        assert_eq!(
            resolution.message(),
            "The appointment request you selected has been accepted and scheduled."
        );
        assert!(resolution.notification.is_completed());

        let stored = store.appt_request(RequestId::new(7)).unwrap();
        assert!(stored.accepted);
        assert!(!stored.pending);
        assert_eq!(store.scheduled_appointments().unwrap(), vec![appointment()]);

        let sent = notifier.sent().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, HCP);
        assert_eq!(sent[0].to, PATIENT);
        assert_eq!(sent[0].subject, "Your appointment request");
        assert_eq!(
            sent[0].body,
            "Your appointment request with Kelly Doctor on 2026-11-03 09:30:00 has been accepted."
        );
    }

    #[test]
    fn second_resolution_is_already_acted_upon() {
        let store = seeded_store();
        let notifier = Arc::new(RecordingNotifier::new());
        let wf = workflow(&store, notifier.clone());

        wf.accept_appt_request(RequestId::new(7)).unwrap();
        let after_accept = store.appt_request(RequestId::new(7)).unwrap();

        for again in [
            wf.accept_appt_request(RequestId::new(7)).unwrap(),
            wf.reject_appt_request(RequestId::new(7)).unwrap(),
        ] {
            assert_eq!(again.outcome, ResolutionOutcome::AlreadyActedUpon);
            assert_eq!(
                again.message(),
                "The appointment request you selected has already been acted upon."
            );
        }

        assert_eq!(store.appt_request(RequestId::new(7)).unwrap(), after_accept);
        assert_eq!(store.scheduled_appointments().unwrap().len(), 1);
        assert_eq!(notifier.sent().unwrap().len(), 1);
    }

    #[test]
    fn reject_resolves_without_scheduling() {
        let store = seeded_store();
        let notifier = Arc::new(RecordingNotifier::new());
        let wf = workflow(&store, notifier.clone());

        let resolution = wf.reject_appt_request(RequestId::new(7)).unwrap();
        assert_eq!(
            resolution.message(),
            "The appointment request you selected has been rejected."
        );

        let stored = store.appt_request(RequestId::new(7)).unwrap();
        assert!(!stored.accepted);
        assert!(!stored.pending);
        assert!(store.scheduled_appointments().unwrap().is_empty());
        assert!(notifier.sent().unwrap()[0].body.ends_with("has been rejected."));
    }

    #[test]
    fn notification_failure_does_not_change_result_or_state() {
        let store = seeded_store();
        let wf = workflow(&store, Arc::new(FailingNotifier));

        let resolution = wf.accept_appt_request(RequestId::new(7)).unwrap();
        assert_eq!(resolution.outcome, ResolutionOutcome::Accepted);
        assert_eq!(
            resolution.notification,
            BestEffort::Discarded {
                reason: "failed to deliver notification: mail relay down".into()
            }
        );
        assert!(store.appt_request(RequestId::new(7)).unwrap().accepted);
        assert_eq!(store.scheduled_appointments().unwrap().len(), 1);
    }

    #[test]
    fn unknown_provider_name_only_drops_the_notification() {
        let store = Arc::new(InMemoryStore::new());
        store
            .submit_appt_request(ApptRequest::new(RequestId::new(3), appointment()))
            .unwrap();
        let notifier = Arc::new(RecordingNotifier::new());
        let wf = workflow(&store, notifier.clone());

        let resolution = wf.reject_appt_request(RequestId::new(3)).unwrap();
        assert_eq!(resolution.outcome, ResolutionOutcome::Rejected);
        assert!(!resolution.notification.is_completed());
        assert!(notifier.sent().unwrap().is_empty());
    }

    #[test]
    fn concurrent_resolution_loses_to_first_writer() {
        let inner = InMemoryStore::new();
        inner
            .submit_appt_request(ApptRequest::new(RequestId::new(7), appointment()))
            .unwrap();
        let store = Arc::new(RacingStore {
            inner,
            raced: AtomicBool::new(false),
        });
        let directory = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let wf = ApptRequestWorkflow::new(store.clone(), directory, notifier.clone(), HCP);

        // Both callers observed the request as pending; the competitor rejected it first.
        let resolution = wf.accept_appt_request(RequestId::new(7)).unwrap();
        assert_eq!(resolution.outcome, ResolutionOutcome::AlreadyActedUpon);

        let stored = store.inner.appt_request(RequestId::new(7)).unwrap();
        assert!(!stored.accepted);
        assert!(!stored.pending);
        assert!(store.inner.scheduled_appointments().unwrap().is_empty());
        assert!(notifier.sent().unwrap().is_empty());
    }

    #[test]
    fn store_failures_propagate() {
        let directory = Arc::new(InMemoryStore::new());
        let wf = ApptRequestWorkflow::new(
            Arc::new(OfflineStore),
            directory,
            Arc::new(RecordingNotifier::new()),
            HCP,
        );

        assert!(wf.appt_requests().unwrap_err().is_data_access());
        assert!(wf
            .accept_appt_request(RequestId::new(7))
            .unwrap_err()
            .is_data_access());
    }

    #[test]
    fn unknown_request_is_an_error() {
        let store = seeded_store();
        let wf = workflow(&store, Arc::new(RecordingNotifier::new()));
        assert!(matches!(
            wf.reject_appt_request(RequestId::new(99)),
            Err(ClinicError::ApptRequestNotFound(_))
        ));
    }

    #[test]
    fn appt_requests_are_scoped_to_acting_provider() {
        let store = seeded_store();
        let mut other = appointment();
        other.hcp_id = Mid::new(9000000003);
        store
            .submit_appt_request(ApptRequest::new(RequestId::new(8), other))
            .unwrap();

        let wf = workflow(&store, Arc::new(RecordingNotifier::new()));
        let ids: Vec<RequestId> = wf
            .appt_requests()
            .unwrap()
            .into_iter()
            .map(|r| r.request_id)
            .collect();
        assert_eq!(ids, vec![RequestId::new(7)]);
    }

    #[test]
    fn num_requests_counts_pending_flags_only() {
        let flags = [
            (true, false),
            (true, true),
            (false, true),
            (true, false),
            (false, false),
        ];
        let requests: Vec<ApptRequest> = flags
            .iter()
            .enumerate()
            .map(|(i, &(pending, accepted))| ApptRequest {
                pending,
                accepted,
                ..ApptRequest::new(RequestId::new(i as u64), appointment())
            })
            .collect();

        assert_eq!(ApptRequestWorkflow::num_requests(&requests), 3);
        assert_eq!(ApptRequestWorkflow::num_requests(&[]), 0);
    }
}
