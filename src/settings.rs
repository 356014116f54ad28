//! Campaign-wide settings.
//!
//! Derivation and roll assembly never consult ambient global state: callers
//! hand an immutable [`CampaignSettings`] snapshot to the orchestrator and
//! the roll builders, which also keeps both trivially testable with
//! synthetic configurations.

use serde::{Deserialize, Serialize};

/// Whether initiative is rolled per combatant or per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InitiativeMode {
    #[default]
    Individual,
    Group,
}

/// Which armor-class numbering system the campaign displays and judges
/// attacks in. The record always carries both representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AcSystem {
    #[default]
    Descending,
    Ascending,
}

/// Weight-tracking strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncumbrancePolicy {
    Disabled,
    #[default]
    Basic,
    Detailed,
    Complete,
}

/// Immutable campaign configuration snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CampaignSettings {
    pub initiative: InitiativeMode,
    pub ac_system: AcSystem,
    pub encumbrance: EncumbrancePolicy,
    /// Weight of treasure considered significant under the basic policy.
    pub significant_treasure: f32,
}

impl CampaignSettings {
    pub fn new() -> Self {
        Self {
            initiative: InitiativeMode::Individual,
            ac_system: AcSystem::Descending,
            encumbrance: EncumbrancePolicy::Basic,
            significant_treasure: 800.0,
        }
    }

    pub fn with_initiative(mut self, initiative: InitiativeMode) -> Self {
        self.initiative = initiative;
        self
    }

    pub fn with_ac_system(mut self, ac_system: AcSystem) -> Self {
        self.ac_system = ac_system;
        self
    }

    pub fn with_encumbrance(mut self, policy: EncumbrancePolicy) -> Self {
        self.encumbrance = policy;
        self
    }

    pub fn with_significant_treasure(mut self, weight: f32) -> Self {
        self.significant_treasure = weight;
        self
    }
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let settings = CampaignSettings::new()
            .with_initiative(InitiativeMode::Group)
            .with_ac_system(AcSystem::Ascending)
            .with_encumbrance(EncumbrancePolicy::Detailed)
            .with_significant_treasure(600.0);

        assert_eq!(settings.initiative, InitiativeMode::Group);
        assert_eq!(settings.ac_system, AcSystem::Ascending);
        assert_eq!(settings.encumbrance, EncumbrancePolicy::Detailed);
        assert_eq!(settings.significant_treasure, 600.0);
    }
}
