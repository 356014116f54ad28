//! The character record and its derived-state types.
//!
//! An [`Actor`] is a full in-memory snapshot: raw inputs (ability values,
//! inventory, authored details) plus every derived statistic the engine
//! recomputes. Derived fields are written only by the derivation pass in
//! [`crate::derive`] or by the write-boundary sync in [`crate::store`];
//! nothing else should edit them.

use crate::items::Item;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Both armor-class representations always sum to this.
pub const AC_COMPLEMENT: i32 = 19;

/// Unique identifier for actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Actor variant tag. Derivations gated to player characters branch on
/// this instead of comparing type strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    Character,
    Monster,
}

impl ActorKind {
    pub fn is_character(&self) -> bool {
        matches!(self, ActorKind::Character)
    }
}

// ============================================================================
// Ability Scores
// ============================================================================

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Intelligence,
    Dexterity,
    Charisma,
    Wisdom,
    Constitution,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Intelligence => "INT",
            Ability::Dexterity => "DEX",
            Ability::Charisma => "CHA",
            Ability::Wisdom => "WIS",
            Ability::Constitution => "CON",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Intelligence => "Intelligence",
            Ability::Dexterity => "Dexterity",
            Ability::Charisma => "Charisma",
            Ability::Wisdom => "Wisdom",
            Ability::Constitution => "Constitution",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Intelligence,
            Ability::Dexterity,
            Ability::Charisma,
            Ability::Wisdom,
            Ability::Constitution,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// A single ability score. `value` is the authoritative raw input; every
/// other field is derived and left `None` when its lookup misses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilityScore {
    pub value: i32,
    /// Standard-scale modifier.
    pub modifier: Option<i32>,
    /// Capped-scale initiative modifier (dex only).
    pub init: Option<i32>,
    /// Capped-scale NPC-reaction modifier (cha only).
    pub npc: Option<i32>,
    /// Maximum retainers (cha only).
    pub retain: Option<i32>,
    /// Retainer loyalty base (cha only).
    pub loyalty: Option<i32>,
}

impl AbilityScore {
    pub fn new(value: i32) -> Self {
        Self {
            value,
            ..Default::default()
        }
    }

    /// The standard modifier, treating an unresolved lookup as 0.
    pub fn modifier_or_zero(&self) -> i32 {
        self.modifier.unwrap_or(0)
    }
}

/// Ability scores container, keyed by [`Ability`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: AbilityScore,
    pub intelligence: AbilityScore,
    pub dexterity: AbilityScore,
    pub charisma: AbilityScore,
    pub wisdom: AbilityScore,
    pub constitution: AbilityScore,
}

impl AbilityScores {
    pub fn new(str: i32, int: i32, dex: i32, cha: i32, wis: i32, con: i32) -> Self {
        Self {
            strength: AbilityScore::new(str),
            intelligence: AbilityScore::new(int),
            dexterity: AbilityScore::new(dex),
            charisma: AbilityScore::new(cha),
            wisdom: AbilityScore::new(wis),
            constitution: AbilityScore::new(con),
        }
    }

    pub fn get(&self, ability: Ability) -> &AbilityScore {
        match ability {
            Ability::Strength => &self.strength,
            Ability::Intelligence => &self.intelligence,
            Ability::Dexterity => &self.dexterity,
            Ability::Charisma => &self.charisma,
            Ability::Wisdom => &self.wisdom,
            Ability::Constitution => &self.constitution,
        }
    }

    pub fn get_mut(&mut self, ability: Ability) -> &mut AbilityScore {
        match ability {
            Ability::Strength => &mut self.strength,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Charisma => &mut self.charisma,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Constitution => &mut self.constitution,
        }
    }

    /// Sum of the six raw values.
    pub fn total(&self) -> i32 {
        Ability::all().iter().map(|&a| self.get(a).value).sum()
    }
}

// ============================================================================
// Saving Throws
// ============================================================================

/// The five saving-throw categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Save {
    Death,
    Wand,
    Paralysis,
    Breath,
    Spell,
}

impl Save {
    pub fn name(&self) -> &'static str {
        match self {
            Save::Death => "Death Poison",
            Save::Wand => "Wands",
            Save::Paralysis => "Paralysis Petrify",
            Save::Breath => "Breath Attacks",
            Save::Spell => "Spells Rods Staves",
        }
    }

    pub fn all() -> [Save; 5] {
        [
            Save::Death,
            Save::Wand,
            Save::Paralysis,
            Save::Breath,
            Save::Spell,
        ]
    }
}

impl fmt::Display for Save {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Saving-throw target numbers (roll 1d20, meet or exceed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Saves {
    pub death: i32,
    pub wand: i32,
    pub paralysis: i32,
    pub breath: i32,
    pub spell: i32,
}

impl Saves {
    pub const fn new(death: i32, wand: i32, paralysis: i32, breath: i32, spell: i32) -> Self {
        Self {
            death,
            wand,
            paralysis,
            breath,
            spell,
        }
    }

    pub fn get(&self, save: Save) -> i32 {
        match save {
            Save::Death => self.death,
            Save::Wand => self.wand,
            Save::Paralysis => self.paralysis,
            Save::Breath => self.breath,
            Save::Spell => self.spell,
        }
    }

    pub fn total(&self) -> i32 {
        Save::all().iter().map(|&s| self.get(s)).sum()
    }
}

// ============================================================================
// Armor Class and Attack Targets
// ============================================================================

/// One side of the dual armor-class representation. The actor carries two:
/// a descending side (`ac`, lower is better) and an ascending side (`aac`,
/// higher is better), complementary to [`AC_COMPLEMENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorClassSide {
    pub value: i32,
    /// Baseline with no armor equipped.
    pub naked: i32,
    /// Additive bonus from an equipped shield.
    pub shield: i32,
    /// Free-form authored adjustment.
    pub modifier: i32,
}

impl ArmorClassSide {
    pub fn new(value: i32) -> Self {
        Self {
            value,
            naked: value,
            shield: 0,
            modifier: 0,
        }
    }
}

/// Per-mode attack bonuses authored on the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackModifiers {
    pub melee: i32,
    pub missile: i32,
}

/// The dual attack-target representation: descending THAC0 and its
/// ascending complement, the base attack bonus. Also complementary to
/// [`AC_COMPLEMENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thac0 {
    pub value: i32,
    pub bba: i32,
    pub modifiers: AttackModifiers,
}

impl Thac0 {
    pub fn new(value: i32) -> Self {
        Self {
            value,
            bba: AC_COMPLEMENT - value,
            modifiers: AttackModifiers::default(),
        }
    }
}

// ============================================================================
// Encumbrance and Movement
// ============================================================================

/// Carried-weight state, fully recomputed by the derivation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encumbrance {
    /// Total carried weight in coins.
    pub value: f32,
    /// Carrying capacity.
    pub max: f32,
    /// `value` as a percentage of `max`, clamped to [0, 100].
    pub pct: f32,
    pub encumbered: bool,
    /// Percentage positions of the policy's weight thresholds, for
    /// presentation scaling only.
    pub steps: Vec<f32>,
}

impl Default for Encumbrance {
    fn default() -> Self {
        Self {
            value: 0.0,
            max: 1600.0,
            pct: 0.0,
            encumbered: false,
            steps: Vec::new(),
        }
    }
}

/// Movement rates in feet per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub base: i32,
    /// Always `base / 3`, rounded down.
    pub encounter: i32,
}

impl Default for Movement {
    fn default() -> Self {
        Self {
            base: 120,
            encounter: 40,
        }
    }
}

/// Initiative state. `modifier` is authored; `value` is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
    pub value: i32,
    pub modifier: i32,
}

// ============================================================================
// Exploration, Languages, Details
// ============================================================================

/// d6 exploration checks, rolled under the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExplorationSkill {
    ListenAtDoor,
    OpenDoors,
    FindSecretDoor,
    FindTrap,
}

impl ExplorationSkill {
    pub fn name(&self) -> &'static str {
        match self {
            ExplorationSkill::ListenAtDoor => "Listen At Door",
            ExplorationSkill::OpenDoors => "Open Doors",
            ExplorationSkill::FindSecretDoor => "Find Secret Door",
            ExplorationSkill::FindTrap => "Find Trap",
        }
    }
}

impl fmt::Display for ExplorationSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Exploration check targets plus the derived open-doors modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exploration {
    pub listen_at_door: i32,
    pub open_doors: i32,
    pub find_secret_door: i32,
    pub find_trap: i32,
    /// Derived from strength; `None` until the derivation pass runs.
    pub od_modifier: Option<i32>,
}

impl Exploration {
    pub fn target(&self, skill: ExplorationSkill) -> i32 {
        match skill {
            ExplorationSkill::ListenAtDoor => self.listen_at_door,
            ExplorationSkill::OpenDoors => self.open_doors,
            ExplorationSkill::FindSecretDoor => self.find_secret_door,
            ExplorationSkill::FindTrap => self.find_trap,
        }
    }
}

impl Default for Exploration {
    fn default() -> Self {
        Self {
            listen_at_door: 1,
            open_doors: 2,
            find_secret_door: 1,
            find_trap: 1,
            od_modifier: None,
        }
    }
}

/// Literacy level derived from intelligence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Literacy {
    Illiterate,
    Basic,
    Literate,
}

impl Literacy {
    pub fn label(&self) -> &'static str {
        match self {
            Literacy::Illiterate => "illiterate",
            Literacy::Basic => "basic literacy",
            Literacy::Literate => "literate",
        }
    }
}

/// Spoken-language proficiency derived from intelligence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpokenLanguages {
    NativeBroken,
    Native,
    NativePlus1,
    NativePlus2,
    NativePlus3,
}

impl SpokenLanguages {
    pub fn label(&self) -> &'static str {
        match self {
            SpokenLanguages::NativeBroken => "native (broken)",
            SpokenLanguages::Native => "native",
            SpokenLanguages::NativePlus1 => "native plus one",
            SpokenLanguages::NativePlus2 => "native plus two",
            SpokenLanguages::NativePlus3 => "native plus three",
        }
    }
}

/// Derived language fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Languages {
    pub literacy: Option<Literacy>,
    pub spoken: Option<SpokenLanguages>,
}

/// Experience points with a percentage bonus from prime requisites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub value: i32,
    /// Bonus percentage applied to awards.
    pub bonus: i32,
}

/// Number-appearing dice expressions for monsters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearing {
    pub dungeon: String,
    pub wilderness: String,
}

impl Default for Appearing {
    fn default() -> Self {
        Self {
            dungeon: "1d6".to_string(),
            wilderness: "1d6".to_string(),
        }
    }
}

/// Authored actor details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Details {
    pub morale: i32,
    pub xp: Experience,
    pub appearing: Appearing,
}

/// Retainer state for hirelings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retainer {
    /// Loyalty target for 2d6 roll-under checks.
    pub loyalty: i32,
}

/// Hit points and the hit-dice expression that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub value: i32,
    pub max: i32,
    pub hit_dice: String,
}

impl Default for HitPoints {
    fn default() -> Self {
        Self {
            value: 4,
            max: 4,
            hit_dice: "1d8".to_string(),
        }
    }
}

/// Per-actor configuration toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorConfig {
    /// When false, `movement.base` is manually authored and the
    /// derivation pass leaves it alone.
    pub movement_auto: bool,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            movement_auto: true,
        }
    }
}

// ============================================================================
// Actor
// ============================================================================

/// The complete character record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub kind: ActorKind,
    pub scores: AbilityScores,
    pub saves: Saves,
    /// Descending armor class.
    pub ac: ArmorClassSide,
    /// Ascending armor class.
    pub aac: ArmorClassSide,
    pub thac0: Thac0,
    pub hp: HitPoints,
    pub encumbrance: Encumbrance,
    pub movement: Movement,
    pub initiative: Initiative,
    pub exploration: Exploration,
    pub languages: Languages,
    pub details: Details,
    pub retainer: Retainer,
    pub config: ActorConfig,
    /// Total coin value of treasure carried, derived.
    pub treasure: f32,
    /// True when any equipped weapon is flagged slow, derived.
    pub is_slow: bool,
    pub items: Vec<Item>,
}

impl Actor {
    pub fn new(name: impl Into<String>, kind: ActorKind) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            kind,
            scores: AbilityScores::default(),
            saves: Saves::default(),
            ac: ArmorClassSide::new(9),
            aac: ArmorClassSide::new(10),
            thac0: Thac0::new(19),
            hp: HitPoints::default(),
            encumbrance: Encumbrance::default(),
            movement: Movement::default(),
            initiative: Initiative::default(),
            exploration: Exploration::default(),
            languages: Languages::default(),
            details: Details::default(),
            retainer: Retainer::default(),
            config: ActorConfig::default(),
            treasure: 0.0,
            is_slow: false,
            items: Vec::new(),
        }
    }

    /// A freshly created record that has never been filled in: all six raw
    /// scores zero for characters, all five saves zero for monsters.
    pub fn is_new(&self) -> bool {
        match self.kind {
            ActorKind::Character => self.scores.total() == 0,
            ActorKind::Monster => self.saves.total() == 0,
        }
    }

    /// Equipped armor pieces, shields included.
    pub fn equipped_armor(&self) -> impl Iterator<Item = &crate::items::ArmorItem> {
        self.items.iter().filter_map(|item| match item {
            Item::Armor(a) if a.equipped => Some(a),
            _ => None,
        })
    }

    /// Find an equipped weapon by name.
    pub fn weapon(&self, name: &str) -> Option<&crate::items::WeaponItem> {
        self.items.iter().find_map(|item| match item {
            Item::Weapon(w) if w.name == name => Some(w),
            _ => None,
        })
    }
}

/// A ready-to-play fighter used by tests and examples.
pub fn create_sample_character(name: impl Into<String>) -> Actor {
    let mut actor = Actor::new(name, ActorKind::Character);
    actor.scores = AbilityScores::new(13, 9, 13, 9, 11, 12);
    actor.saves = Saves::new(12, 13, 14, 15, 16);
    actor.thac0 = Thac0::new(19);
    actor.hp = HitPoints {
        value: 6,
        max: 6,
        hit_dice: "1d8".to_string(),
    };
    actor.details.morale = 9;
    actor.retainer.loyalty = 8;
    actor
}

/// A 2 HD monster with saves and THAC0 left for generation.
pub fn create_sample_monster(name: impl Into<String>) -> Actor {
    let mut actor = Actor::new(name, ActorKind::Monster);
    actor.hp = HitPoints {
        value: 9,
        max: 9,
        hit_dice: "2d8".to_string(),
    };
    actor.saves = Saves::default();
    actor.details.morale = 7;
    actor.details.appearing = Appearing {
        dungeon: "1d4".to_string(),
        wilderness: "1d6".to_string(),
    };
    actor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thac0_complement() {
        let thac0 = Thac0::new(19);
        assert_eq!(thac0.value + thac0.bba, AC_COMPLEMENT);
        let thac0 = Thac0::new(12);
        assert_eq!(thac0.bba, 7);
    }

    #[test]
    fn test_is_new() {
        let blank = Actor::new("Blank", ActorKind::Character);
        assert!(blank.is_new());
        let sample = create_sample_character("Hero");
        assert!(!sample.is_new());

        let monster = create_sample_monster("Goblin");
        assert!(monster.is_new());
    }

    #[test]
    fn test_scores_access() {
        let scores = AbilityScores::new(13, 9, 13, 9, 11, 12);
        assert_eq!(scores.get(Ability::Strength).value, 13);
        assert_eq!(scores.get(Ability::Constitution).value, 12);
        assert_eq!(scores.total(), 67);
    }

    #[test]
    fn test_modifier_or_zero_when_unset() {
        let score = AbilityScore::new(10);
        assert_eq!(score.modifier, None);
        assert_eq!(score.modifier_or_zero(), 0);
    }

    #[test]
    fn test_serde_round_trip() {
        let actor = create_sample_character("Hero");
        let json = serde_json::to_string(&actor).unwrap();
        let back: Actor = serde_json::from_str(&json).unwrap();
        assert_eq!(actor, back);
    }
}
