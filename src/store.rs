//! The record-store write boundary.
//!
//! Partial updates to the record go through [`ActorUpdate`]. Before
//! anything persists, [`sync_dual_representations`] completes whichever
//! side of the AC and THAC0 pairs the update left out, so the
//! complement-to-19 invariant holds in the stored record at all times.

use crate::actor::{Actor, ActorId, Saves, AC_COMPLEMENT};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from record-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No actor with id {0}")]
    NotFound(ActorId),
}

/// A partial, field-level update to an actor record. Unset fields are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorUpdate {
    pub ac_value: Option<i32>,
    pub aac_value: Option<i32>,
    pub thac0_value: Option<i32>,
    pub bba: Option<i32>,
    pub hp_value: Option<i32>,
    pub hp_max: Option<i32>,
    pub xp_value: Option<i32>,
    pub saves: Option<Saves>,
    pub movement_base: Option<i32>,
}

impl ActorUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ac(mut self, value: i32) -> Self {
        self.ac_value = Some(value);
        self
    }

    pub fn aac(mut self, value: i32) -> Self {
        self.aac_value = Some(value);
        self
    }

    pub fn thac0(mut self, value: i32) -> Self {
        self.thac0_value = Some(value);
        self
    }

    pub fn bba(mut self, value: i32) -> Self {
        self.bba = Some(value);
        self
    }

    pub fn hp(mut self, value: i32, max: i32) -> Self {
        self.hp_value = Some(value);
        self.hp_max = Some(max);
        self
    }

    pub fn xp(mut self, value: i32) -> Self {
        self.xp_value = Some(value);
        self
    }

    pub fn saves(mut self, saves: Saves) -> Self {
        self.saves = Some(saves);
        self
    }

    pub fn movement_base(mut self, base: i32) -> Self {
        self.movement_base = Some(base);
        self
    }
}

/// Complete the missing side of each duality pair. When an update sets one
/// side, the sibling is derived by the complement-to-19 rule; the
/// already-set side always wins when both appear.
pub fn sync_dual_representations(update: &mut ActorUpdate) {
    if let Some(ac) = update.ac_value {
        update.aac_value = Some(AC_COMPLEMENT - ac);
    } else if let Some(aac) = update.aac_value {
        update.ac_value = Some(AC_COMPLEMENT - aac);
    }

    if let Some(thac0) = update.thac0_value {
        update.bba = Some(AC_COMPLEMENT - thac0);
    } else if let Some(bba) = update.bba {
        update.thac0_value = Some(AC_COMPLEMENT - bba);
    }
}

/// Apply an already-synced update to a record in place.
pub fn apply_update(actor: &mut Actor, update: &ActorUpdate) {
    if let Some(ac) = update.ac_value {
        actor.ac.value = ac;
    }
    if let Some(aac) = update.aac_value {
        actor.aac.value = aac;
    }
    if let Some(thac0) = update.thac0_value {
        actor.thac0.value = thac0;
    }
    if let Some(bba) = update.bba {
        actor.thac0.bba = bba;
    }
    if let Some(hp) = update.hp_value {
        actor.hp.value = hp;
    }
    if let Some(max) = update.hp_max {
        actor.hp.max = max;
    }
    if let Some(xp) = update.xp_value {
        actor.details.xp.value = xp;
    }
    if let Some(saves) = update.saves {
        actor.saves = saves;
    }
    if let Some(base) = update.movement_base {
        actor.movement.base = base;
        actor.movement.encounter = base / 3;
    }
}

/// Asynchronous persistence for actor records. The duality sync runs
/// inside `update`, before the write lands.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, actor: Actor);
    async fn get(&self, id: ActorId) -> Result<Actor, StoreError>;
    async fn update(&self, id: ActorId, update: ActorUpdate) -> Result<Actor, StoreError>;
}

/// In-memory record store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    actors: RwLock<HashMap<ActorId, Actor>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, actor: Actor) {
        self.actors.write().await.insert(actor.id, actor);
    }

    async fn get(&self, id: ActorId) -> Result<Actor, StoreError> {
        self.actors
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: ActorId, mut update: ActorUpdate) -> Result<Actor, StoreError> {
        sync_dual_representations(&mut update);
        let mut actors = self.actors.write().await;
        let actor = actors.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        apply_update(actor, &update);
        Ok(actor.clone())
    }
}
