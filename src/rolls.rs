//! Roll-request assembly and interpretation.
//!
//! Every user-facing roll is assembled here as a [`RollRequest`]: an
//! ordered list of formula parts, a semantic kind, and whatever target or
//! band table that kind needs. The request is handed to the external dice
//! evaluator; once a total comes back, [`judge`] applies the kind's
//! success semantics. Part order matters for audit display, never for the
//! total.

use crate::actor::{Ability, Actor, ActorKind, ExplorationSkill, Save};
use crate::items::WeaponItem;
use crate::settings::{AcSystem, CampaignSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One element of a roll formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormulaPart {
    /// A dice notation handed to the evaluator verbatim.
    Dice(String),
    /// A flat numeric modifier.
    Modifier(i32),
}

impl fmt::Display for FormulaPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaPart::Dice(notation) => write!(f, "{notation}"),
            FormulaPart::Modifier(value) => write!(f, "{value:+}"),
        }
    }
}

/// The semantic interpretation applied to a dice total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollKind {
    /// Roll under the raw ability score.
    Check,
    /// Meet or exceed the save target.
    Save,
    /// Roll at or under a generic target (morale, loyalty, exploration).
    Below,
    /// Pick the band containing the total from an integer-keyed table.
    Table,
    /// Pure sum, no target.
    Damage,
    /// Pure sum of the actor's hit dice.
    HitDice,
    /// d20 against an armor class, judged by the campaign's AC system.
    Attack,
}

impl RollKind {
    pub fn name(&self) -> &'static str {
        match self {
            RollKind::Check => "check",
            RollKind::Save => "save",
            RollKind::Below => "below",
            RollKind::Table => "table",
            RollKind::Damage => "damage",
            RollKind::HitDice => "hitdice",
            RollKind::Attack => "attack",
        }
    }
}

/// Melee or missile, decided by the attacker's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackKind {
    Melee,
    Missile,
}

/// Dungeon vs wilderness context for number-appearing rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppearingCheck {
    Dungeon,
    Wilderness,
}

/// A fully assembled roll request, produced fresh per invocation and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollRequest {
    pub parts: Vec<FormulaPart>,
    pub kind: RollKind,
    pub target: Option<i32>,
    /// Outcome bands for table rolls: threshold -> label.
    pub table: Option<BTreeMap<i32, String>>,
    /// Only the requester sees the result.
    pub blindroll: bool,
    /// Skip the evaluator's interactive confirmation. Never affects the
    /// computed total.
    pub skip_dialog: bool,
    /// Attacker's descending attack target number (attack rolls only).
    pub thac0: Option<i32>,
    /// Target's armor class in the active numbering system.
    pub target_ac: Option<i32>,
    pub flavor: String,
}

impl RollRequest {
    fn new(kind: RollKind, flavor: impl Into<String>) -> Self {
        Self {
            parts: Vec::new(),
            kind,
            target: None,
            table: None,
            blindroll: false,
            skip_dialog: false,
            thac0: None,
            target_ac: None,
            flavor: flavor.into(),
        }
    }

    pub fn with_skip_dialog(mut self, skip: bool) -> Self {
        self.skip_dialog = skip;
        self
    }

    /// The formula as displayed, e.g. `1d20 +1 +2`.
    pub fn formula(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a total is to be read once the evaluator returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollJudgment {
    Success,
    Failure,
    /// The label of the band containing the total.
    Band(String),
    /// A raw sum with no success semantics.
    Sum,
}

// ============================================================================
// Builders
// ============================================================================

/// Ability check: one d20, roll under the raw score.
pub fn check_request(actor: &Actor, ability: Ability) -> RollRequest {
    let mut request = RollRequest::new(RollKind::Check, format!("{} Check", ability.name()));
    request.parts.push(FormulaPart::Dice("1d20".to_string()));
    request.target = Some(actor.scores.get(ability).value);
    request
}

/// Saving throw: one d20, meet or exceed. Characters add their wisdom
/// modifier against magical effects.
pub fn save_request(actor: &Actor, save: Save) -> RollRequest {
    let mut request = RollRequest::new(RollKind::Save, format!("{} Save", save.name()));
    request.parts.push(FormulaPart::Dice("1d20".to_string()));
    if actor.kind == ActorKind::Character {
        let wisdom = actor.scores.wisdom.modifier_or_zero();
        if wisdom != 0 {
            request.parts.push(FormulaPart::Modifier(wisdom));
        }
    }
    request.target = Some(actor.saves.get(save));
    request
}

/// Morale check: 2d6 at or under the authored morale score.
pub fn morale_request(actor: &Actor) -> RollRequest {
    let mut request = RollRequest::new(RollKind::Below, "Morale Check");
    request.parts.push(FormulaPart::Dice("2d6".to_string()));
    request.target = Some(actor.details.morale);
    request.skip_dialog = true;
    request
}

/// Retainer loyalty check: 2d6 at or under the loyalty target.
pub fn loyalty_request(actor: &Actor) -> RollRequest {
    let mut request = RollRequest::new(RollKind::Below, "Loyalty Check");
    request.parts.push(FormulaPart::Dice("2d6".to_string()));
    request.target = Some(actor.retainer.loyalty);
    request.skip_dialog = true;
    request
}

/// Reaction roll: 2d6 against the standard reaction bands.
pub fn reaction_request(actor: &Actor) -> RollRequest {
    let mut request = RollRequest::new(RollKind::Table, format!("Reaction: {}", actor.name));
    request.parts.push(FormulaPart::Dice("2d6".to_string()));
    request.table = Some(reaction_table());
    request
}

/// The standard reaction bands. Lowest band wins at each boundary.
pub fn reaction_table() -> BTreeMap<i32, String> {
    let mut table = BTreeMap::new();
    table.insert(2, "Hostile".to_string());
    table.insert(3, "Unfriendly".to_string());
    table.insert(6, "Neutral".to_string());
    table.insert(9, "Indifferent".to_string());
    table.insert(12, "Friendly".to_string());
    table
}

/// Exploration check: 1d6 at or under the skill target, result hidden
/// from the acting party.
pub fn exploration_request(actor: &Actor, skill: ExplorationSkill) -> RollRequest {
    let mut request = RollRequest::new(RollKind::Below, skill.name());
    request.parts.push(FormulaPart::Dice("1d6".to_string()));
    request.target = Some(actor.exploration.target(skill));
    request.blindroll = true;
    request
}

/// Hit-dice roll: the actor's hit-dice expression, plus the constitution
/// modifier for characters.
pub fn hit_dice_request(actor: &Actor) -> RollRequest {
    let mut request = RollRequest::new(RollKind::HitDice, "Hit Dice");
    request.parts.push(FormulaPart::Dice(actor.hp.hit_dice.clone()));
    if actor.kind == ActorKind::Character {
        request
            .parts
            .push(FormulaPart::Modifier(actor.scores.constitution.modifier_or_zero()));
    }
    request.skip_dialog = true;
    request
}

/// Hit-point roll: the bare hit-dice expression, no constitution term.
/// The total becomes both current and maximum hit points.
pub fn hp_request(actor: &Actor) -> RollRequest {
    let mut request = RollRequest::new(RollKind::HitDice, "Hit Points");
    request.parts.push(FormulaPart::Dice(actor.hp.hit_dice.clone()));
    request.skip_dialog = true;
    request
}

/// Number-appearing roll for the given context. A raw sum, so it shares
/// the hit-dice evaluation semantics.
pub fn appearing_request(actor: &Actor, check: AppearingCheck) -> RollRequest {
    let (expression, label) = match check {
        AppearingCheck::Dungeon => (&actor.details.appearing.dungeon, "Number Appearing (1)"),
        AppearingCheck::Wilderness => (&actor.details.appearing.wilderness, "Number Appearing (2)"),
    };
    let mut request = RollRequest::new(RollKind::HitDice, label);
    request.parts.push(FormulaPart::Dice(expression.clone()));
    request.skip_dialog = true;
    request
}

/// Damage roll: the weapon's damage dice (1d6 unarmed), plus the strength
/// modifier for melee.
pub fn damage_request(
    actor: &Actor,
    weapon: Option<&WeaponItem>,
    attack: AttackKind,
) -> RollRequest {
    let flavor = match weapon {
        Some(w) => format!("{} - Damage", w.name),
        None => "Damage".to_string(),
    };
    let mut request = RollRequest::new(RollKind::Damage, flavor);
    let dice = weapon.map_or("1d6", |w| w.damage.as_str());
    request.parts.push(FormulaPart::Dice(dice.to_string()));
    if attack == AttackKind::Melee {
        request
            .parts
            .push(FormulaPart::Modifier(actor.scores.strength.modifier_or_zero()));
    }
    request.skip_dialog = true;
    request
}

/// Attack roll: one d20 plus the conditional modifier chain. Ascending-AC
/// campaigns lead with the base attack bonus; missile attacks add the
/// dexterity modifier and ranged bonus, melee the strength modifier and
/// melee bonus; an equipped weapon's intrinsic bonus comes last. Carries
/// the target's AC (in the active system) and the attacker's THAC0 for the
/// hit judgment.
pub fn attack_request(
    actor: &Actor,
    settings: &CampaignSettings,
    weapon: Option<&WeaponItem>,
    attack: AttackKind,
    target: Option<&Actor>,
) -> RollRequest {
    let flavor = match weapon {
        Some(w) => format!("{} attacks with {}", actor.name, w.name),
        None => format!("{} attacks", actor.name),
    };
    let mut request = RollRequest::new(RollKind::Attack, flavor);
    request.parts.push(FormulaPart::Dice("1d20".to_string()));

    if settings.ac_system == AcSystem::Ascending {
        request.parts.push(FormulaPart::Modifier(actor.thac0.bba));
    }
    match attack {
        AttackKind::Missile => {
            request
                .parts
                .push(FormulaPart::Modifier(actor.scores.dexterity.modifier_or_zero()));
            request
                .parts
                .push(FormulaPart::Modifier(actor.thac0.modifiers.missile));
        }
        AttackKind::Melee => {
            request
                .parts
                .push(FormulaPart::Modifier(actor.scores.strength.modifier_or_zero()));
            request
                .parts
                .push(FormulaPart::Modifier(actor.thac0.modifiers.melee));
        }
    }
    if let Some(weapon) = weapon {
        if weapon.bonus != 0 {
            request.parts.push(FormulaPart::Modifier(weapon.bonus));
        }
    }

    request.thac0 = Some(actor.thac0.value);
    request.target_ac = target.map(|t| match settings.ac_system {
        AcSystem::Ascending => t.aac.value,
        AcSystem::Descending => t.ac.value,
    });
    request
}

// ============================================================================
// Interpretation
// ============================================================================

/// Apply the request's success semantics to an evaluated total.
pub fn judge(request: &RollRequest, total: i32, settings: &CampaignSettings) -> RollJudgment {
    match request.kind {
        RollKind::Check | RollKind::Below => match request.target {
            Some(target) if total <= target => RollJudgment::Success,
            Some(_) => RollJudgment::Failure,
            None => RollJudgment::Sum,
        },
        RollKind::Save => match request.target {
            Some(target) if total >= target => RollJudgment::Success,
            Some(_) => RollJudgment::Failure,
            None => RollJudgment::Sum,
        },
        RollKind::Table => match &request.table {
            Some(table) => {
                let band = table
                    .range(..=total)
                    .next_back()
                    .or_else(|| table.iter().next())
                    .map(|(_, label)| label.clone());
                match band {
                    Some(label) => RollJudgment::Band(label),
                    None => RollJudgment::Sum,
                }
            }
            None => RollJudgment::Sum,
        },
        RollKind::Damage | RollKind::HitDice => RollJudgment::Sum,
        RollKind::Attack => match (request.target_ac, request.thac0) {
            (Some(target_ac), Some(thac0)) => {
                if attack_hits(settings.ac_system, total, target_ac, thac0) {
                    RollJudgment::Success
                } else {
                    RollJudgment::Failure
                }
            }
            // Untargeted attacks carry no judgment.
            _ => RollJudgment::Sum,
        },
    }
}

/// The hit rule, selected by the campaign's AC numbering system.
pub fn attack_hits(system: AcSystem, total: i32, target_ac: i32, thac0: i32) -> bool {
    match system {
        AcSystem::Ascending => total >= target_ac,
        AcSystem::Descending => total >= thac0 - target_ac,
    }
}
