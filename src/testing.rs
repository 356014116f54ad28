//! Testing utilities.
//!
//! Provides deterministic stand-ins for the external collaborators:
//! - `ScriptedEvaluator` returns queued totals instead of rolling
//! - `CapturingSink` records notifications for inspection
//! - `TestHarness` wires both to a session over an in-memory store

use crate::actor::{create_sample_character, Actor, AC_COMPLEMENT};
use crate::evaluator::{DiceError, DiceEvaluator, PartOutcome, RollOutcome};
use crate::rolls::{FormulaPart, RollRequest};
use crate::session::{ActorSession, Notification, NotificationSink, RollReport};
use crate::settings::CampaignSettings;
use crate::store::MemoryStore;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Total returned when the script runs out.
const DEFAULT_TOTAL: i32 = 10;

/// An evaluator that replays scripted totals and logs every request.
#[derive(Debug, Default)]
pub struct ScriptedEvaluator {
    totals: Mutex<VecDeque<i32>>,
    requests: Mutex<Vec<RollRequest>>,
}

impl ScriptedEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next total to return.
    pub fn queue_total(&self, total: i32) {
        self.totals.lock().unwrap().push_back(total);
    }

    /// Every request evaluated so far, in dispatch order.
    pub fn requests(&self) -> Vec<RollRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DiceEvaluator for ScriptedEvaluator {
    async fn evaluate(&self, request: &RollRequest) -> Result<RollOutcome, DiceError> {
        self.requests.lock().unwrap().push(request.clone());
        let total = self
            .totals
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(DEFAULT_TOTAL);

        // Attribute modifiers faithfully and put the remainder on the
        // first dice part, so part subtotals always sum to the total.
        let modifier_sum: i32 = request
            .parts
            .iter()
            .filter_map(|p| match p {
                FormulaPart::Modifier(m) => Some(*m),
                FormulaPart::Dice(_) => None,
            })
            .sum();
        let mut remainder = Some(total - modifier_sum);
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                FormulaPart::Dice(_) => PartOutcome {
                    part: part.clone(),
                    rolls: Vec::new(),
                    subtotal: remainder.take().unwrap_or(0),
                },
                FormulaPart::Modifier(m) => PartOutcome {
                    part: part.clone(),
                    rolls: Vec::new(),
                    subtotal: *m,
                },
            })
            .collect();

        Ok(RollOutcome { total, parts })
    }
}

/// A sink that stores every notification.
#[derive(Debug, Default)]
pub struct CapturingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for CapturingSink {
    async fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

/// Test harness: a session over scripted collaborators.
pub struct TestHarness {
    pub session: ActorSession,
    pub evaluator: Arc<ScriptedEvaluator>,
    pub store: Arc<MemoryStore>,
    pub sink: Arc<CapturingSink>,
}

impl TestHarness {
    /// Harness around the sample character with default settings.
    pub async fn new() -> Self {
        Self::with_actor(create_sample_character("Test Hero"), CampaignSettings::new()).await
    }

    /// Harness around a custom actor and settings.
    pub async fn with_actor(actor: Actor, settings: CampaignSettings) -> Self {
        let evaluator = Arc::new(ScriptedEvaluator::new());
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(CapturingSink::new());
        let session = ActorSession::new(
            actor,
            settings,
            evaluator.clone(),
            store.clone(),
            sink.clone(),
        )
        .await;
        Self {
            session,
            evaluator,
            store,
            sink,
        }
    }

    pub fn queue_total(&self, total: i32) -> &Self {
        self.evaluator.queue_total(total);
        self
    }

    pub fn requests(&self) -> Vec<RollRequest> {
        self.evaluator.requests()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.sink.notifications()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert both duality pairs hold the complement-to-19 invariant.
#[track_caller]
pub fn assert_pair_invariants(actor: &Actor) {
    assert_eq!(
        actor.ac.value + actor.aac.value,
        AC_COMPLEMENT,
        "AC pair out of sync: ac={} aac={}",
        actor.ac.value,
        actor.aac.value
    );
    assert_eq!(
        actor.thac0.value + actor.thac0.bba,
        AC_COMPLEMENT,
        "THAC0 pair out of sync: thac0={} bba={}",
        actor.thac0.value,
        actor.thac0.bba
    );
}

/// Assert the report judged a success.
#[track_caller]
pub fn assert_success(report: &RollReport) {
    assert_eq!(
        report.judgment,
        crate::rolls::RollJudgment::Success,
        "Expected success for {} (total {})",
        report.request.flavor,
        report.outcome.total
    );
}

/// Assert the report judged a failure.
#[track_caller]
pub fn assert_failure(report: &RollReport) {
    assert_eq!(
        report.judgment,
        crate::rolls::RollJudgment::Failure,
        "Expected failure for {} (total {})",
        report.request.flavor,
        report.outcome.total
    );
}

/// Assert a table roll landed in the named band.
#[track_caller]
pub fn assert_band(report: &RollReport, label: &str) {
    assert_eq!(
        report.judgment,
        crate::rolls::RollJudgment::Band(label.to_string()),
        "Expected band '{label}' for total {}",
        report.outcome.total
    );
}
