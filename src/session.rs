//! ActorSession - the primary public API for rolling and record updates.
//!
//! A session owns an actor snapshot plus the three external collaborators:
//! the dice evaluator, the record store, and the notification sink. Roll
//! methods assemble a request, dispatch it serially to the evaluator,
//! interpret the total, and report the result. The session never blocks on
//! the sink and never rolls dice itself.

use crate::actor::{Ability, Actor, ActorKind, ExplorationSkill, Save};
use crate::derive;
use crate::evaluator::{DiceError, DiceEvaluator, RollOutcome};
use crate::rolls::{
    self, AppearingCheck, AttackKind, RollJudgment, RollRequest,
};
use crate::settings::CampaignSettings;
use crate::store::{ActorUpdate, RecordStore, StoreError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Dice error: {0}")]
    Dice(#[from] DiceError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// A presentation message. The engine supplies already-rendered strings
/// and never waits on delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub speaker: String,
    pub content: String,
}

/// Fire-and-forget presentation of roll results and record events.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification);
}

/// Sink that drops everything.
#[derive(Debug, Default)]
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn notify(&self, _notification: Notification) {}
}

/// The full record of one dispatched roll.
#[derive(Debug, Clone)]
pub struct RollReport {
    pub request: RollRequest,
    pub outcome: RollOutcome,
    pub judgment: RollJudgment,
}

/// A playing session for one actor.
pub struct ActorSession {
    actor: Actor,
    settings: CampaignSettings,
    evaluator: Arc<dyn DiceEvaluator>,
    store: Arc<dyn RecordStore>,
    sink: Arc<dyn NotificationSink>,
}

impl ActorSession {
    /// Create a session, register the actor with the store, and run the
    /// initial derivation pass.
    pub async fn new(
        mut actor: Actor,
        settings: CampaignSettings,
        evaluator: Arc<dyn DiceEvaluator>,
        store: Arc<dyn RecordStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        derive::prepare(&mut actor, &settings);
        store.insert(actor.clone()).await;
        Self {
            actor,
            settings,
            evaluator,
            store,
            sink,
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn settings(&self) -> &CampaignSettings {
        &self.settings
    }

    /// Mutate the raw record directly, then recompute derived fields.
    pub fn edit(&mut self, f: impl FnOnce(&mut Actor)) {
        f(&mut self.actor);
        derive::prepare(&mut self.actor, &self.settings);
    }

    /// Persist a partial update, then refresh the local snapshot and its
    /// derived fields. The duality sync runs inside the store.
    pub async fn update(&mut self, update: ActorUpdate) -> Result<(), SessionError> {
        self.actor = self.store.update(self.actor.id, update).await?;
        derive::prepare(&mut self.actor, &self.settings);
        Ok(())
    }

    // ========================================================================
    // Rolls
    // ========================================================================

    /// Evaluate a request and interpret the total. Results go to the sink
    /// unless the roll is blind.
    pub async fn dispatch(&self, request: RollRequest) -> Result<RollReport, SessionError> {
        debug!(
            actor = %self.actor.name,
            kind = request.kind.name(),
            formula = %request.formula(),
            "dispatching roll"
        );
        let outcome = self.evaluator.evaluate(&request).await?;
        let judgment = rolls::judge(&request, outcome.total, &self.settings);

        if !request.blindroll {
            let content = match &judgment {
                RollJudgment::Success => format!("{}: {} (success)", request.flavor, outcome.total),
                RollJudgment::Failure => format!("{}: {} (failure)", request.flavor, outcome.total),
                RollJudgment::Band(label) => {
                    format!("{}: {} ({})", request.flavor, outcome.total, label)
                }
                RollJudgment::Sum => format!("{}: {}", request.flavor, outcome.total),
            };
            self.sink
                .notify(Notification {
                    speaker: self.actor.name.clone(),
                    content,
                })
                .await;
        }

        Ok(RollReport {
            request,
            outcome,
            judgment,
        })
    }

    pub async fn roll_check(
        &self,
        ability: Ability,
        skip_dialog: bool,
    ) -> Result<RollReport, SessionError> {
        let request = rolls::check_request(&self.actor, ability).with_skip_dialog(skip_dialog);
        self.dispatch(request).await
    }

    pub async fn roll_save(
        &self,
        save: Save,
        skip_dialog: bool,
    ) -> Result<RollReport, SessionError> {
        let request = rolls::save_request(&self.actor, save).with_skip_dialog(skip_dialog);
        self.dispatch(request).await
    }

    pub async fn roll_morale(&self) -> Result<RollReport, SessionError> {
        self.dispatch(rolls::morale_request(&self.actor)).await
    }

    pub async fn roll_loyalty(&self) -> Result<RollReport, SessionError> {
        self.dispatch(rolls::loyalty_request(&self.actor)).await
    }

    pub async fn roll_reaction(&self, skip_dialog: bool) -> Result<RollReport, SessionError> {
        let request = rolls::reaction_request(&self.actor).with_skip_dialog(skip_dialog);
        self.dispatch(request).await
    }

    pub async fn roll_exploration(
        &self,
        skill: ExplorationSkill,
        skip_dialog: bool,
    ) -> Result<RollReport, SessionError> {
        let request =
            rolls::exploration_request(&self.actor, skill).with_skip_dialog(skip_dialog);
        self.dispatch(request).await
    }

    pub async fn roll_hit_dice(&self) -> Result<RollReport, SessionError> {
        self.dispatch(rolls::hit_dice_request(&self.actor)).await
    }

    pub async fn roll_appearing(&self, check: AppearingCheck) -> Result<RollReport, SessionError> {
        self.dispatch(rolls::appearing_request(&self.actor, check))
            .await
    }

    /// Roll damage with the named equipped weapon, or unarmed when `None`.
    pub async fn roll_damage(
        &self,
        weapon: Option<&str>,
        attack: AttackKind,
    ) -> Result<RollReport, SessionError> {
        let weapon = weapon.and_then(|name| self.actor.weapon(name));
        self.dispatch(rolls::damage_request(&self.actor, weapon, attack))
            .await
    }

    /// Roll a single attack against an optional target.
    pub async fn roll_attack(
        &self,
        weapon: Option<&str>,
        attack: AttackKind,
        target: Option<&Actor>,
        skip_dialog: bool,
    ) -> Result<RollReport, SessionError> {
        let weapon = weapon.and_then(|name| self.actor.weapon(name));
        let request = rolls::attack_request(&self.actor, &self.settings, weapon, attack, target)
            .with_skip_dialog(skip_dialog);
        self.dispatch(request).await
    }

    /// Roll one attack per selected target, strictly in order. With no
    /// targets, a single untargeted attack is rolled instead.
    pub async fn target_attack(
        &self,
        weapon: Option<&str>,
        attack: AttackKind,
        targets: &[&Actor],
        skip_dialog: bool,
    ) -> Result<Vec<RollReport>, SessionError> {
        if targets.is_empty() {
            let report = self.roll_attack(weapon, attack, None, skip_dialog).await?;
            return Ok(vec![report]);
        }
        let mut reports = Vec::with_capacity(targets.len());
        for target in targets {
            let report = self
                .roll_attack(weapon, attack, Some(target), skip_dialog)
                .await?;
            reports.push(report);
        }
        Ok(reports)
    }

    // ========================================================================
    // Record-Updating Operations
    // ========================================================================

    /// Roll the bare hit dice and set both current and maximum hit points
    /// to the total.
    pub async fn roll_hp(&mut self) -> Result<RollReport, SessionError> {
        let report = self.dispatch(rolls::hp_request(&self.actor)).await?;
        let total = report.outcome.total;
        self.update(ActorUpdate::new().hp(total, total)).await?;
        Ok(report)
    }

    /// Apply damage, clamping hit points to `[0, max]`.
    pub async fn apply_damage(
        &mut self,
        amount: i32,
        multiplier: f32,
    ) -> Result<(), SessionError> {
        let damage = (amount as f32 * multiplier).floor() as i32;
        let remaining = (self.actor.hp.value - damage).clamp(0, self.actor.hp.max);
        self.update(ActorUpdate::new().hp(remaining, self.actor.hp.max))
            .await
    }

    /// Award experience with the record's percentage bonus applied. The
    /// record write settles before the notification fires. Characters
    /// only; a no-op for monsters.
    pub async fn gain_experience(&mut self, amount: i32) -> Result<(), SessionError> {
        if self.actor.kind != ActorKind::Character {
            return Ok(());
        }
        let modified = amount + (self.actor.details.xp.bonus * amount) / 100;
        let total = self.actor.details.xp.value + modified;
        self.update(ActorUpdate::new().xp(total)).await?;

        self.sink
            .notify(Notification {
                speaker: self.actor.name.clone(),
                content: format!("{} gains {} experience", self.actor.name, modified),
            })
            .await;
        Ok(())
    }

    /// Derive a monster's saves and attack target number from its hit
    /// dice and persist them. A no-op for characters and for unreadable
    /// hit-dice expressions.
    pub async fn generate_monster_stats(&mut self) -> Result<(), SessionError> {
        if self.actor.kind != ActorKind::Monster {
            return Ok(());
        }
        if let Some((saves, thac0)) = derive::generate_monster_stats(&self.actor) {
            self.update(ActorUpdate::new().saves(saves).thac0(thac0.value))
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::create_sample_character;
    use crate::evaluator::RngEvaluator;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_session_prepares_on_creation() {
        let session = ActorSession::new(
            create_sample_character("Hero"),
            CampaignSettings::new(),
            Arc::new(RngEvaluator::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(NullSink),
        )
        .await;

        // Str 13 from the sample character.
        assert_eq!(session.actor().scores.strength.modifier, Some(1));
        assert_eq!(
            session.actor().movement.encounter,
            session.actor().movement.base / 3
        );
    }

    #[tokio::test]
    async fn test_edit_recomputes() {
        let mut session = ActorSession::new(
            create_sample_character("Hero"),
            CampaignSettings::new(),
            Arc::new(RngEvaluator::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(NullSink),
        )
        .await;

        session.edit(|actor| actor.scores.strength.value = 18);
        assert_eq!(session.actor().scores.strength.modifier, Some(3));
    }
}
