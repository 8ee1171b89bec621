//! Submission flow
//!
//! Per-form phase tracking (`Idle -> Validating -> Sending -> Success |
//! Failure -> Idle`) and the transport that delivers a validated payload.
//! The shipped transport is simulated: it resolves after a random delay.

use std::collections::HashMap;

use folio_dom::NodeId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::TransportError;

/// Identifies one in-flight submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionId(u64);

/// Form family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    /// `.chat-form`
    Chat,
    /// `.newsletter-form`
    Newsletter,
    /// `form[data-validate]`
    Generic,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Newsletter => "newsletter",
            Self::Generic => "form",
        }
    }
}

/// Where a form is in the submission cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Sending,
    Success,
    Failure,
}

impl SubmissionPhase {
    pub fn can_transition_to(self, next: SubmissionPhase) -> bool {
        use SubmissionPhase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Idle)
                | (Validating, Sending)
                | (Sending, Success)
                | (Sending, Failure)
                | (Success, Idle)
                | (Failure, Idle)
        )
    }
}

/// Payload handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: SubmissionId,
    pub kind: FormKind,
    pub form: NodeId,
    /// `(name, value)` pairs in form order
    pub fields: Vec<(String, String)>,
}

impl Submission {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// How and when a send resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub delay_ms: u64,
    pub outcome: Result<(), TransportError>,
}

/// Delivers submissions
pub trait Transport {
    fn send(&mut self, submission: &Submission) -> Delivery;
}

/// Transport that never leaves the page: resolves after a uniformly random
/// delay, successfully unless a failure has been injected.
#[derive(Debug)]
pub struct SimulatedTransport {
    rng: StdRng,
    min_delay_ms: u64,
    max_delay_ms: u64,
    failure: Option<TransportError>,
}

impl SimulatedTransport {
    pub fn new(min_delay_ms: u64, max_delay_ms: u64, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        Self {
            rng: StdRng::seed_from_u64(seed),
            min_delay_ms: min_delay_ms.min(max_delay_ms),
            max_delay_ms,
            failure: None,
        }
    }

    /// Make every following send fail with `error`
    pub fn fail_with(mut self, error: TransportError) -> Self {
        self.failure = Some(error);
        self
    }
}

impl Transport for SimulatedTransport {
    fn send(&mut self, submission: &Submission) -> Delivery {
        let delay_ms = self.rng.random_range(self.min_delay_ms..=self.max_delay_ms);
        tracing::debug!(
            "Simulated {} submission {:?} resolves in {}ms",
            submission.kind.as_str(),
            submission.id,
            delay_ms
        );
        Delivery {
            delay_ms,
            outcome: match &self.failure {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            },
        }
    }
}

#[derive(Debug)]
struct InFlight {
    submission: Submission,
    outcome: Result<(), TransportError>,
}

/// Per-form phases plus the submissions awaiting delivery
#[derive(Debug, Default)]
pub struct SubmissionTracker {
    next_id: u64,
    phases: HashMap<NodeId, SubmissionPhase>,
    in_flight: HashMap<SubmissionId, InFlight>,
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self, form: NodeId) -> SubmissionPhase {
        self.phases.get(&form).copied().unwrap_or_default()
    }

    /// Move `form` to `next` if the cycle allows it
    pub fn transition(&mut self, form: NodeId, next: SubmissionPhase) -> bool {
        let current = self.phase(form);
        if !current.can_transition_to(next) {
            tracing::debug!("Ignored submission transition {:?} -> {:?}", current, next);
            return false;
        }
        self.phases.insert(form, next);
        true
    }

    /// Start validating a submission. Fails while one is already in flight.
    pub fn begin(&mut self, form: NodeId) -> bool {
        self.transition(form, SubmissionPhase::Validating)
    }

    /// Hand a validated payload to `transport`; returns the id and the
    /// delay after which it resolves.
    pub fn send(
        &mut self,
        transport: &mut dyn Transport,
        kind: FormKind,
        form: NodeId,
        fields: Vec<(String, String)>,
    ) -> Option<(SubmissionId, u64)> {
        if !self.transition(form, SubmissionPhase::Sending) {
            return None;
        }
        let id = SubmissionId(self.next_id);
        self.next_id += 1;
        let submission = Submission {
            id,
            kind,
            form,
            fields,
        };
        let delivery = transport.send(&submission);
        self.in_flight.insert(
            id,
            InFlight {
                submission,
                outcome: delivery.outcome,
            },
        );
        Some((id, delivery.delay_ms))
    }

    /// Resolve a delivery, moving its form to `Success` or `Failure`
    pub fn resolve(&mut self, id: SubmissionId) -> Option<(Submission, Result<(), TransportError>)> {
        let InFlight { submission, outcome } = self.in_flight.remove(&id)?;
        let phase = if outcome.is_ok() {
            SubmissionPhase::Success
        } else {
            SubmissionPhase::Failure
        };
        self.transition(submission.form, phase);
        Some((submission, outcome))
    }

    /// Return a form to `Idle` after validation failed or a send resolved
    pub fn finish(&mut self, form: NodeId) {
        self.transition(form, SubmissionPhase::Idle);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Forget every phase and pending delivery, returning the forms that
    /// were still sending
    pub fn clear(&mut self) -> Vec<NodeId> {
        let mut sending: Vec<NodeId> = self
            .phases
            .iter()
            .filter(|(_, phase)| **phase == SubmissionPhase::Sending)
            .map(|(form, _)| *form)
            .collect();
        sending.sort();
        self.phases.clear();
        self.in_flight.clear();
        sending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> NodeId {
        let mut doc = folio_dom::Document::new("https://example.com/");
        doc.create_element("form")
    }

    #[test]
    fn test_simulated_delay_in_range() {
        let mut transport = SimulatedTransport::new(1000, 2000, Some(7));
        let submission = Submission {
            id: SubmissionId(0),
            kind: FormKind::Chat,
            form: form(),
            fields: Vec::new(),
        };
        for _ in 0..50 {
            let delivery = transport.send(&submission);
            assert!((1000..=2000).contains(&delivery.delay_ms));
            assert!(delivery.outcome.is_ok());
        }
    }

    #[test]
    fn test_seeded_transport_is_deterministic() {
        let submission = Submission {
            id: SubmissionId(0),
            kind: FormKind::Newsletter,
            form: form(),
            fields: Vec::new(),
        };
        let mut a = SimulatedTransport::new(0, 10_000, Some(42));
        let mut b = SimulatedTransport::new(0, 10_000, Some(42));
        assert_eq!(a.send(&submission), b.send(&submission));
    }

    #[test]
    fn test_cycle_success() {
        let form = form();
        let mut tracker = SubmissionTracker::new();
        let mut transport = SimulatedTransport::new(5, 5, Some(1));

        assert!(tracker.begin(form));
        let (id, delay) = tracker
            .send(&mut transport, FormKind::Generic, form, vec![("email".into(), "a@b.co".into())])
            .unwrap();
        assert_eq!(delay, 5);
        assert_eq!(tracker.phase(form), SubmissionPhase::Sending);
        // No second submission while one is in flight.
        assert!(!tracker.begin(form));

        let (submission, outcome) = tracker.resolve(id).unwrap();
        assert!(outcome.is_ok());
        assert_eq!(submission.field("email"), Some("a@b.co"));
        assert_eq!(tracker.phase(form), SubmissionPhase::Success);
        tracker.finish(form);
        assert_eq!(tracker.phase(form), SubmissionPhase::Idle);
        assert!(tracker.resolve(id).is_none());
    }

    #[test]
    fn test_cycle_failure() {
        let form = form();
        let mut tracker = SubmissionTracker::new();
        let mut transport = SimulatedTransport::new(1, 1, Some(1)).fail_with(TransportError::Status(503));

        tracker.begin(form);
        let (id, _) = tracker.send(&mut transport, FormKind::Chat, form, Vec::new()).unwrap();
        let (_, outcome) = tracker.resolve(id).unwrap();
        assert_eq!(outcome, Err(TransportError::Status(503)));
        assert_eq!(tracker.phase(form), SubmissionPhase::Failure);
    }

    #[test]
    fn test_validation_failure_returns_to_idle() {
        let form = form();
        let mut tracker = SubmissionTracker::new();
        assert!(tracker.begin(form));
        tracker.finish(form);
        assert_eq!(tracker.phase(form), SubmissionPhase::Idle);
        assert!(!SubmissionPhase::Idle.can_transition_to(SubmissionPhase::Sending));
    }

    #[test]
    fn test_clear_reports_sending_forms() {
        let form = form();
        let mut tracker = SubmissionTracker::new();
        let mut transport = SimulatedTransport::new(5, 5, Some(1));
        tracker.begin(form);
        tracker.send(&mut transport, FormKind::Newsletter, form, Vec::new()).unwrap();

        assert_eq!(tracker.clear(), vec![form]);
        assert_eq!(tracker.in_flight(), 0);
        assert_eq!(tracker.phase(form), SubmissionPhase::Idle);
        assert!(tracker.clear().is_empty());
    }
}
