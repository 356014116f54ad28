//! Actor persistence.
//!
//! Saves the raw record as human-readable JSON. Derived fields are
//! serialized too, but the derivation pass recomputes them on load, so a
//! hand-edited save only needs the raw inputs to be right.

use crate::actor::Actor;
use crate::derive;
use crate::settings::CampaignSettings;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Save an actor to a JSON file.
pub async fn save_actor(actor: &Actor, path: impl AsRef<Path>) -> Result<(), PersistError> {
    let content = serde_json::to_string_pretty(actor)?;
    fs::write(path, content).await?;
    Ok(())
}

/// Load an actor from a JSON file and rerun the derivation pass.
pub async fn load_actor(
    path: impl AsRef<Path>,
    settings: &CampaignSettings,
) -> Result<Actor, PersistError> {
    let content = fs::read_to_string(path).await?;
    let mut actor: Actor = serde_json::from_str(&content)?;
    derive::prepare(&mut actor, settings);
    Ok(actor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::create_sample_character;

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let settings = CampaignSettings::new();
        let mut actor = create_sample_character("Hero");
        derive::prepare(&mut actor, &settings);

        let dir = std::env::temp_dir().join(format!("osr-core-test-{}", actor.id));
        fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("hero.json");

        save_actor(&actor, &path).await.unwrap();
        let loaded = load_actor(&path, &settings).await.unwrap();
        assert_eq!(actor, loaded);

        fs::remove_dir_all(&dir).await.unwrap();
    }
}
