//! The derived-field recomputation pass.
//!
//! [`prepare`] runs whenever the record changes, in dependency order:
//! ability modifiers first, then the slow-weapon flag, armor class,
//! encumbrance and movement, treasure, and initiative. Every derived field
//! is fully recomputed from the raw inputs; nothing is patched
//! incrementally. Running the pass twice on an unchanged record is a no-op.
//!
//! Monster saves and attack values are not part of the pass: they derive
//! from hit dice on explicit request via [`generate_monster_stats`].

use crate::actor::{Actor, Saves, Thac0};
use crate::items::{ArmorKind, Item};
use crate::settings::{CampaignSettings, EncumbrancePolicy, InitiativeMode};
use crate::tables;
use tracing::debug;

/// Recompute every derived field on the record.
pub fn prepare(actor: &mut Actor, settings: &CampaignSettings) {
    compute_modifiers(actor);
    compute_is_slow(actor);
    compute_armor_class(actor);
    compute_encumbrance(actor, settings);
    compute_treasure(actor);
    compute_initiative(actor, settings);
    actor.movement.encounter = actor.movement.base / 3;

    debug!(
        actor = %actor.name,
        ac = actor.ac.value,
        aac = actor.aac.value,
        movement = actor.movement.base,
        "derived fields recomputed"
    );
}

// ============================================================================
// Ability Modifiers
// ============================================================================

/// Derive per-ability fields from the raw scores. Characters only; monsters
/// get saves and attack values from their hit dice instead.
fn compute_modifiers(actor: &mut Actor) {
    if !actor.kind.is_character() {
        return;
    }
    let scores = &mut actor.scores;

    scores.strength.modifier =
        tables::value_from_table(tables::STANDARD_MODIFIERS, scores.strength.value);
    scores.intelligence.modifier =
        tables::value_from_table(tables::STANDARD_MODIFIERS, scores.intelligence.value);
    scores.dexterity.modifier =
        tables::value_from_table(tables::STANDARD_MODIFIERS, scores.dexterity.value);
    scores.charisma.modifier =
        tables::value_from_table(tables::STANDARD_MODIFIERS, scores.charisma.value);
    scores.wisdom.modifier =
        tables::value_from_table(tables::STANDARD_MODIFIERS, scores.wisdom.value);
    scores.constitution.modifier =
        tables::value_from_table(tables::STANDARD_MODIFIERS, scores.constitution.value);

    scores.dexterity.init =
        tables::value_from_table(tables::CAPPED_MODIFIERS, scores.dexterity.value);
    scores.charisma.npc =
        tables::value_from_table(tables::CAPPED_MODIFIERS, scores.charisma.value);
    scores.charisma.retain = scores.charisma.modifier.map(|m| m + 4);
    scores.charisma.loyalty = scores.charisma.modifier.map(|m| m + 7);

    actor.exploration.od_modifier =
        tables::value_from_table(tables::OPEN_DOORS, scores.strength.value);
    actor.languages.literacy =
        tables::value_from_table(tables::LITERACY, scores.intelligence.value);
    actor.languages.spoken =
        tables::value_from_table(tables::SPOKEN_LANGUAGES, scores.intelligence.value);
}

/// An actor is slow when any equipped weapon is flagged slow.
fn compute_is_slow(actor: &mut Actor) {
    actor.is_slow = actor.items.iter().any(|item| match item {
        Item::Weapon(w) => w.equipped && w.slow,
        _ => false,
    });
}

// ============================================================================
// Armor Class
// ============================================================================

/// Derive both armor-class representations from dexterity and equipped
/// gear. The first equipped non-shield armor replaces the naked baseline;
/// an equipped shield adds its rating on top. Dexterity and shield improve
/// both sides, which means they subtract from the descending value and add
/// to the ascending one.
fn compute_armor_class(actor: &mut Actor) {
    if !actor.kind.is_character() {
        return;
    }

    let mut base_ac = 9;
    let mut base_aac = 10;
    let mut ac_shield = 0;
    let mut aac_shield = 0;
    let dex = actor.scores.dexterity.modifier_or_zero();

    actor.aac.naked = base_aac + dex;
    actor.ac.naked = base_ac - dex;

    let mut armor_found = false;
    for armor in actor.equipped_armor() {
        if armor.is_shield() {
            ac_shield = armor.ac;
            aac_shield = armor.aac;
        } else if !armor_found {
            base_ac = armor.ac;
            base_aac = armor.aac;
            armor_found = true;
        }
    }

    actor.aac.value = base_aac + dex + aac_shield + actor.aac.modifier;
    actor.ac.value = base_ac - dex - ac_shield - actor.ac.modifier;
    actor.ac.shield = ac_shield;
    actor.aac.shield = aac_shield;
}

// ============================================================================
// Encumbrance and Movement
// ============================================================================

/// Aggregate carried weight under the configured policy and derive the
/// encumbrance state, then the movement rate when auto-movement is on.
/// Characters only; under the disabled policy nothing is touched.
fn compute_encumbrance(actor: &mut Actor, settings: &CampaignSettings) {
    if !actor.kind.is_character() {
        return;
    }
    let policy = settings.encumbrance;
    if policy == EncumbrancePolicy::Disabled {
        return;
    }

    let has_adventuring_gear = actor
        .items
        .iter()
        .any(|item| matches!(item, Item::Gear(g) if !g.treasure));

    let mut total_weight = 0.0;
    for item in &actor.items {
        match item {
            // Treasure always weighs; other gear only counts under the
            // strictest policy.
            Item::Gear(g) => {
                if policy == EncumbrancePolicy::Complete || g.treasure {
                    total_weight += g.total_weight();
                }
            }
            Item::Weapon(w) => {
                if policy != EncumbrancePolicy::Basic {
                    total_weight += w.weight;
                }
            }
            Item::Armor(a) => {
                if policy != EncumbrancePolicy::Basic {
                    total_weight += a.weight;
                }
            }
            Item::Container(c) => {
                if policy != EncumbrancePolicy::Basic {
                    total_weight += c.weight;
                }
            }
        }
    }

    // Flat adventuring-gear allowance.
    if policy == EncumbrancePolicy::Detailed && has_adventuring_gear {
        total_weight += 80.0;
    }

    let max = actor.encumbrance.max;
    let steps: Vec<f32> = match policy {
        EncumbrancePolicy::Detailed | EncumbrancePolicy::Complete => {
            [400.0, 600.0, 800.0].iter().map(|s| 100.0 * s / max).collect()
        }
        EncumbrancePolicy::Basic => vec![100.0 * settings.significant_treasure / max],
        EncumbrancePolicy::Disabled => Vec::new(),
    };

    actor.encumbrance.value = total_weight;
    actor.encumbrance.pct = (100.0 * total_weight / max).clamp(0.0, 100.0);
    actor.encumbrance.encumbered = total_weight > max;
    actor.encumbrance.steps = steps;

    if actor.config.movement_auto {
        compute_movement(actor, settings);
    }
}

/// Derive the base movement rate from carried weight (detailed/complete)
/// or from the heaviest equipped armor plus a treasure penalty (basic).
fn compute_movement(actor: &mut Actor, settings: &CampaignSettings) {
    let weight = actor.encumbrance.value;
    let max = actor.encumbrance.max;
    match settings.encumbrance {
        EncumbrancePolicy::Detailed | EncumbrancePolicy::Complete => {
            // Thresholds shift with any non-standard carrying capacity.
            let delta = max - 1600.0;
            actor.movement.base = if weight >= max {
                0
            } else if weight >= 800.0 + delta {
                30
            } else if weight >= 600.0 + delta {
                60
            } else if weight >= 400.0 + delta {
                90
            } else {
                120
            };
        }
        EncumbrancePolicy::Basic => {
            let mut heaviest = None;
            for armor in actor.equipped_armor() {
                match armor.kind {
                    ArmorKind::Light if heaviest.is_none() => heaviest = Some(ArmorKind::Light),
                    ArmorKind::Heavy => heaviest = Some(ArmorKind::Heavy),
                    _ => {}
                }
            }
            actor.movement.base = match heaviest {
                None => 120,
                Some(ArmorKind::Light) => 90,
                Some(_) => 60,
            };
            if weight >= max {
                actor.movement.base = 0;
            } else if weight >= settings.significant_treasure {
                actor.movement.base -= 30;
            }
        }
        EncumbrancePolicy::Disabled => {}
    }
}

// ============================================================================
// Treasure and Initiative
// ============================================================================

/// Total coin value of carried treasure, rounded to two decimals.
fn compute_treasure(actor: &mut Actor) {
    if !actor.kind.is_character() {
        return;
    }
    let total: f32 = actor
        .items
        .iter()
        .filter_map(|item| match item {
            Item::Gear(g) if g.treasure => Some(g.total_cost()),
            _ => None,
        })
        .sum();
    actor.treasure = (total * 100.0).round() / 100.0;
}

/// Group initiative forces 0; otherwise the authored modifier, plus the
/// dexterity initiative modifier for characters.
fn compute_initiative(actor: &mut Actor, settings: &CampaignSettings) {
    if settings.initiative == InitiativeMode::Group {
        actor.initiative.value = 0;
        return;
    }
    actor.initiative.value = actor.initiative.modifier;
    if actor.kind.is_character() {
        actor.initiative.value += actor.scores.dexterity.modifier_or_zero();
    }
}

// ============================================================================
// Monster Generation
// ============================================================================

/// Derive a monster's saves and attack target number from its hit dice.
/// Returns the generated values without touching the record; callers apply
/// them through the store. A hit-dice expression without a leading number
/// yields `None`.
pub fn generate_monster_stats(actor: &Actor) -> Option<(Saves, Thac0)> {
    let hd = hit_dice_rank(&actor.hp.hit_dice)?;
    let saves = tables::value_from_table(tables::MONSTER_SAVES, hd).unwrap_or_default();
    let thac0 = tables::value_from_table(tables::MONSTER_THAC0, hd)
        .unwrap_or(tables::DEFAULT_MONSTER_THAC0);
    Some((saves, Thac0::new(thac0)))
}

/// Leading integer of a hit-dice expression ("3d8+1" -> 3).
fn hit_dice_rank(hit_dice: &str) -> Option<i32> {
    let digits: String = hit_dice
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{create_sample_character, create_sample_monster, AbilityScores};
    use crate::items::{get_armor, get_weapon, GearItem, WeaponItem};

    fn settings() -> CampaignSettings {
        CampaignSettings::new()
    }

    #[test]
    fn test_modifier_derivation() {
        let mut actor = create_sample_character("Hero");
        actor.scores = AbilityScores::new(13, 9, 3, 18, 9, 9);
        prepare(&mut actor, &settings());

        assert_eq!(actor.scores.strength.modifier, Some(1));
        assert_eq!(actor.scores.intelligence.modifier, Some(0));
        assert_eq!(actor.scores.dexterity.modifier, Some(-3));
        assert_eq!(actor.scores.charisma.modifier, Some(3));
        assert_eq!(actor.scores.dexterity.init, Some(-2));
        assert_eq!(actor.scores.charisma.npc, Some(2));
        assert_eq!(actor.scores.charisma.retain, Some(7));
        assert_eq!(actor.scores.charisma.loyalty, Some(10));
        assert_eq!(actor.exploration.od_modifier, Some(3));
    }

    #[test]
    fn test_language_derivation() {
        use crate::actor::{Literacy, SpokenLanguages};

        let mut actor = create_sample_character("Scholar");
        actor.scores.intelligence.value = 16;
        prepare(&mut actor, &settings());
        assert_eq!(actor.languages.literacy, Some(Literacy::Literate));
        assert_eq!(actor.languages.spoken, Some(SpokenLanguages::NativePlus2));

        actor.scores.intelligence.value = 2;
        prepare(&mut actor, &settings());
        assert_eq!(actor.languages.literacy, None);
        assert_eq!(actor.languages.spoken, Some(SpokenLanguages::NativeBroken));
    }

    #[test]
    fn test_monster_skips_modifiers() {
        let mut monster = create_sample_monster("Goblin");
        monster.scores.strength.value = 18;
        prepare(&mut monster, &settings());
        assert_eq!(monster.scores.strength.modifier, None);
        assert_eq!(monster.languages.literacy, None);
    }

    #[test]
    fn test_naked_armor_class() {
        let mut actor = create_sample_character("Hero");
        actor.scores.dexterity.value = 13; // +1
        prepare(&mut actor, &settings());

        assert_eq!(actor.ac.naked, 8);
        assert_eq!(actor.aac.naked, 11);
        assert_eq!(actor.ac.value, 8);
        assert_eq!(actor.aac.value, 11);
        assert_eq!(actor.ac.value + actor.aac.value, 19);
    }

    #[test]
    fn test_armor_and_shield() {
        let mut actor = create_sample_character("Hero");
        actor.scores.dexterity.value = 13; // +1
        actor.items.push(Item::Armor(get_armor("Leather Armor").unwrap().equipped()));
        actor.items.push(Item::Armor(get_armor("Shield").unwrap().equipped()));
        prepare(&mut actor, &settings());

        // Leather 7/12, shield +1, dex +1.
        assert_eq!(actor.ac.value, 5);
        assert_eq!(actor.aac.value, 14);
        assert_eq!(actor.ac.shield, 1);
        assert_eq!(actor.ac.value + actor.aac.value, 19);
    }

    #[test]
    fn test_unequipped_armor_ignored() {
        let mut actor = create_sample_character("Hero");
        actor.scores.dexterity.value = 9;
        actor.items.push(Item::Armor(get_armor("Plate Mail").unwrap()));
        prepare(&mut actor, &settings());
        assert_eq!(actor.ac.value, 9);
    }

    #[test]
    fn test_ac_free_form_modifier() {
        let mut actor = create_sample_character("Hero");
        actor.scores.dexterity.value = 9;
        actor.ac.modifier = 2;
        actor.aac.modifier = 2;
        prepare(&mut actor, &settings());
        assert_eq!(actor.ac.value, 7);
        assert_eq!(actor.aac.value, 12);
    }

    #[test]
    fn test_slow_flag() {
        let mut actor = create_sample_character("Hero");
        actor.items.push(Item::Weapon(get_weapon("Two-Handed Sword").unwrap()));
        prepare(&mut actor, &settings());
        assert!(!actor.is_slow, "unequipped slow weapon does not count");

        actor.items.clear();
        actor.items.push(Item::Weapon(
            get_weapon("Two-Handed Sword").unwrap().equipped(),
        ));
        prepare(&mut actor, &settings());
        assert!(actor.is_slow);
    }

    #[test]
    fn test_detailed_encumbrance_with_gear_allowance() {
        let cfg = settings().with_encumbrance(EncumbrancePolicy::Detailed);
        let mut actor = create_sample_character("Hero");
        actor.items.push(Item::Gear(
            GearItem::new("Rope").with_quantity(1).with_weight(50.0),
        ));
        actor.items.push(Item::Weapon(WeaponItem::new("Sword", "1d8").with_weight(60.0)));
        prepare(&mut actor, &cfg);

        // Non-treasure gear weighs nothing under detailed, but its presence
        // adds the 80-coin allowance; the weapon's flat weight counts.
        assert_eq!(actor.encumbrance.value, 140.0);
        assert!(!actor.encumbrance.encumbered);
        assert_eq!(actor.encumbrance.steps.len(), 3);
        assert_eq!(actor.movement.base, 120);
    }

    #[test]
    fn test_complete_encumbrance_counts_all_gear() {
        let cfg = settings().with_encumbrance(EncumbrancePolicy::Complete);
        let mut actor = create_sample_character("Hero");
        actor.items.push(Item::Gear(
            GearItem::new("Rations").with_quantity(7).with_weight(10.0),
        ));
        actor.items.push(Item::Gear(
            GearItem::new("Gems").with_quantity(2).with_weight(5.0).as_treasure(),
        ));
        prepare(&mut actor, &cfg);
        assert_eq!(actor.encumbrance.value, 80.0);
    }

    #[test]
    fn test_movement_bands_detailed() {
        let cfg = settings().with_encumbrance(EncumbrancePolicy::Detailed);
        let mut actor = create_sample_character("Hero");
        actor.encumbrance.max = 1600.0;
        // 850 coins of treasure: the 800+ band.
        actor.items.push(Item::Gear(
            GearItem::new("Coins").with_quantity(850).with_weight(1.0).as_treasure(),
        ));
        prepare(&mut actor, &cfg);
        assert_eq!(actor.movement.base, 30);
        assert_eq!(actor.movement.encounter, 10);
    }

    #[test]
    fn test_movement_band_offset() {
        let cfg = settings().with_encumbrance(EncumbrancePolicy::Detailed);
        let mut actor = create_sample_character("Strong");
        actor.encumbrance.max = 2000.0;
        actor.items.push(Item::Gear(
            GearItem::new("Coins").with_quantity(850).with_weight(1.0).as_treasure(),
        ));
        prepare(&mut actor, &cfg);
        // Offset +400 drops 850 from the 800 band to the 400 band.
        assert_eq!(actor.movement.base, 90);
    }

    #[test]
    fn test_movement_zero_at_capacity() {
        let cfg = settings().with_encumbrance(EncumbrancePolicy::Complete);
        let mut actor = create_sample_character("Mule");
        actor.items.push(Item::Gear(
            GearItem::new("Coins").with_quantity(1600).with_weight(1.0).as_treasure(),
        ));
        prepare(&mut actor, &cfg);
        assert!(!actor.encumbrance.encumbered, "at capacity is not over it");
        assert_eq!(actor.movement.base, 0);
    }

    #[test]
    fn test_basic_movement_heavy_armor() {
        let cfg = settings().with_encumbrance(EncumbrancePolicy::Basic);
        let mut actor = create_sample_character("Hero");
        actor.items.push(Item::Armor(get_armor("Chainmail").unwrap().equipped()));
        prepare(&mut actor, &cfg);
        // Heavy armor, no significant treasure: 60, unmodified.
        assert_eq!(actor.movement.base, 60);
    }

    #[test]
    fn test_basic_movement_heavy_beats_light() {
        let cfg = settings().with_encumbrance(EncumbrancePolicy::Basic);
        let mut actor = create_sample_character("Hero");
        actor.items.push(Item::Armor(get_armor("Leather Armor").unwrap().equipped()));
        actor.items.push(Item::Armor(get_armor("Plate Mail").unwrap().equipped()));
        prepare(&mut actor, &cfg);
        assert_eq!(actor.movement.base, 60);
    }

    #[test]
    fn test_basic_movement_treasure_penalty() {
        let cfg = settings()
            .with_encumbrance(EncumbrancePolicy::Basic)
            .with_significant_treasure(800.0);
        let mut actor = create_sample_character("Hero");
        actor.items.push(Item::Gear(
            GearItem::new("Coins").with_quantity(800).with_weight(1.0).as_treasure(),
        ));
        prepare(&mut actor, &cfg);
        assert_eq!(actor.movement.base, 90);
        assert_eq!(actor.encumbrance.steps, vec![50.0]);
    }

    #[test]
    fn test_disabled_leaves_everything_alone() {
        let cfg = settings().with_encumbrance(EncumbrancePolicy::Disabled);
        let mut actor = create_sample_character("Hero");
        actor.movement.base = 150;
        actor.items.push(Item::Gear(
            GearItem::new("Coins").with_quantity(5000).with_weight(1.0).as_treasure(),
        ));
        prepare(&mut actor, &cfg);
        assert_eq!(actor.encumbrance.value, 0.0);
        assert_eq!(actor.movement.base, 150);
        assert_eq!(actor.movement.encounter, 50);
    }

    #[test]
    fn test_manual_movement_respected() {
        let cfg = settings().with_encumbrance(EncumbrancePolicy::Basic);
        let mut actor = create_sample_character("Hero");
        actor.config.movement_auto = false;
        actor.movement.base = 90;
        prepare(&mut actor, &cfg);
        assert_eq!(actor.movement.base, 90);
        assert_eq!(actor.movement.encounter, 30);
    }

    #[test]
    fn test_treasure_total_rounds() {
        let mut actor = create_sample_character("Hero");
        actor.items.push(Item::Gear(
            GearItem::new("Gems").with_quantity(2).with_cost(0.333).as_treasure(),
        ));
        actor.items.push(Item::Gear(
            GearItem::new("Rope").with_cost(1.0), // not treasure
        ));
        prepare(&mut actor, &settings());
        assert_eq!(actor.treasure, 0.67);
    }

    #[test]
    fn test_initiative_modes() {
        let mut actor = create_sample_character("Hero");
        actor.scores.dexterity.value = 16; // +2
        actor.initiative.modifier = 1;
        prepare(&mut actor, &settings());
        assert_eq!(actor.initiative.value, 3);

        let grouped = settings().with_initiative(InitiativeMode::Group);
        prepare(&mut actor, &grouped);
        assert_eq!(actor.initiative.value, 0);

        let mut monster = create_sample_monster("Goblin");
        monster.initiative.modifier = 1;
        prepare(&mut monster, &settings());
        assert_eq!(monster.initiative.value, 1, "no dex term for monsters");
    }

    #[test]
    fn test_idempotent() {
        let cfg = settings().with_encumbrance(EncumbrancePolicy::Complete);
        let mut actor = create_sample_character("Hero");
        actor.items.push(Item::Armor(get_armor("Chainmail").unwrap().equipped()));
        actor.items.push(Item::Gear(
            GearItem::new("Coins").with_quantity(200).with_weight(1.0).as_treasure(),
        ));
        prepare(&mut actor, &cfg);
        let first = actor.clone();
        prepare(&mut actor, &cfg);
        assert_eq!(actor, first);
    }

    #[test]
    fn test_generate_monster_stats() {
        let mut monster = create_sample_monster("Ogre");
        monster.hp.hit_dice = "4d8+1".to_string();
        let (saves, thac0) = generate_monster_stats(&monster).unwrap();
        assert_eq!(saves.death, 10);
        assert_eq!(thac0.value, 16);
        assert_eq!(thac0.bba, 3);

        monster.hp.hit_dice = "d8".to_string();
        assert!(generate_monster_stats(&monster).is_none());
    }
}
