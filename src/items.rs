//! Inventory item types and the standard equipment list.
//!
//! Items carry exactly the fields the derivation engine reads: weight,
//! quantity, treasure and equip flags, armor ratings in both numbering
//! systems, weapon damage and intrinsic bonus. The engine tolerates
//! whatever else callers author on top.

use serde::{Deserialize, Serialize};

/// An inventory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    /// Generic gear, possibly treasure, counted by quantity.
    Gear(GearItem),
    Weapon(WeaponItem),
    Armor(ArmorItem),
    Container(ContainerItem),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Gear(g) => &g.name,
            Item::Weapon(w) => &w.name,
            Item::Armor(a) => &a.name,
            Item::Container(c) => &c.name,
        }
    }
}

/// Generic gear. Weight and cost are per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearItem {
    pub name: String,
    pub quantity: u32,
    pub weight: f32,
    pub cost: f32,
    pub treasure: bool,
}

impl GearItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: 1,
            weight: 0.0,
            cost: 0.0,
            treasure: false,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_cost(mut self, cost: f32) -> Self {
        self.cost = cost;
        self
    }

    pub fn as_treasure(mut self) -> Self {
        self.treasure = true;
        self
    }

    /// Quantity times unit weight.
    pub fn total_weight(&self) -> f32 {
        self.quantity as f32 * self.weight
    }

    /// Quantity times unit cost.
    pub fn total_cost(&self) -> f32 {
        self.quantity as f32 * self.cost
    }
}

/// A weapon. `damage` is a dice notation handed to the evaluator verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponItem {
    pub name: String,
    pub damage: String,
    /// Intrinsic attack bonus (magic weapons).
    pub bonus: i32,
    pub weight: f32,
    pub equipped: bool,
    /// Slow weapons force the wielder to act last in the round.
    pub slow: bool,
}

impl WeaponItem {
    pub fn new(name: impl Into<String>, damage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            damage: damage.into(),
            bonus: 0,
            weight: 0.0,
            equipped: false,
            slow: false,
        }
    }

    pub fn with_bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn slow(mut self) -> Self {
        self.slow = true;
        self
    }

    pub fn equipped(mut self) -> Self {
        self.equipped = true;
        self
    }
}

/// Armor weight class, which doubles as the shield marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmorKind {
    Light,
    Heavy,
    Shield,
}

/// A piece of armor with ratings in both numbering systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorItem {
    pub name: String,
    pub kind: ArmorKind,
    /// Descending rating: the AC it grants (shields: the bonus).
    pub ac: i32,
    /// Ascending rating.
    pub aac: i32,
    pub weight: f32,
    pub equipped: bool,
}

impl ArmorItem {
    pub fn new(name: impl Into<String>, kind: ArmorKind, ac: i32, aac: i32) -> Self {
        Self {
            name: name.into(),
            kind,
            ac,
            aac,
            weight: 0.0,
            equipped: false,
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn equipped(mut self) -> Self {
        self.equipped = true;
        self
    }

    pub fn is_shield(&self) -> bool {
        self.kind == ArmorKind::Shield
    }
}

/// A container. Contributes only its own weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerItem {
    pub name: String,
    pub weight: f32,
}

impl ContainerItem {
    pub fn new(name: impl Into<String>, weight: f32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

// ============================================================================
// Standard Equipment
// ============================================================================

lazy_static::lazy_static! {
    /// Standard weapons. Weights are in coins.
    pub static ref WEAPONS: Vec<WeaponItem> = vec![
        WeaponItem::new("Dagger", "1d4").with_weight(10.0),
        WeaponItem::new("Hand Axe", "1d6").with_weight(30.0),
        WeaponItem::new("Mace", "1d6").with_weight(30.0),
        WeaponItem::new("Short Sword", "1d6").with_weight(30.0),
        WeaponItem::new("Spear", "1d6").with_weight(30.0),
        WeaponItem::new("Sword", "1d8").with_weight(60.0),
        WeaponItem::new("Two-Handed Sword", "1d10").with_weight(150.0).slow(),
        WeaponItem::new("War Hammer", "1d6").with_weight(30.0),
        WeaponItem::new("Sling", "1d4").with_weight(20.0),
        WeaponItem::new("Short Bow", "1d6").with_weight(30.0),
        WeaponItem::new("Crossbow", "1d6").with_weight(50.0).slow(),
    ];

    /// Standard armor. Shield ratings are the bonus they add.
    pub static ref ARMORS: Vec<ArmorItem> = vec![
        ArmorItem::new("Leather Armor", ArmorKind::Light, 7, 12).with_weight(200.0),
        ArmorItem::new("Chainmail", ArmorKind::Heavy, 5, 14).with_weight(400.0),
        ArmorItem::new("Plate Mail", ArmorKind::Heavy, 3, 16).with_weight(500.0),
        ArmorItem::new("Shield", ArmorKind::Shield, 1, 1).with_weight(100.0),
    ];
}

/// Get a standard weapon by name.
pub fn get_weapon(name: &str) -> Option<WeaponItem> {
    let name_lower = name.to_lowercase();
    WEAPONS
        .iter()
        .find(|w| w.name.to_lowercase() == name_lower)
        .cloned()
}

/// Get a standard armor piece by name.
pub fn get_armor(name: &str) -> Option<ArmorItem> {
    let name_lower = name.to_lowercase();
    ARMORS
        .iter()
        .find(|a| a.name.to_lowercase() == name_lower)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gear_totals() {
        let rations = GearItem::new("Rations")
            .with_quantity(7)
            .with_weight(10.0)
            .with_cost(0.5);
        assert_eq!(rations.total_weight(), 70.0);
        assert_eq!(rations.total_cost(), 3.5);
    }

    #[test]
    fn test_standard_lookup() {
        let sword = get_weapon("sword").unwrap();
        assert_eq!(sword.damage, "1d8");
        assert!(!sword.slow);

        let two_handed = get_weapon("Two-Handed Sword").unwrap();
        assert!(two_handed.slow);

        let plate = get_armor("Plate Mail").unwrap();
        assert_eq!(plate.ac, 3);
        assert_eq!(plate.aac, 16);
        assert_eq!(plate.kind, ArmorKind::Heavy);

        assert!(get_weapon("Chainsaw").is_none());
    }

    #[test]
    fn test_shield_marker() {
        let shield = get_armor("Shield").unwrap();
        assert!(shield.is_shield());
        assert!(!get_armor("Leather Armor").unwrap().is_shield());
    }
}
