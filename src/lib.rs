//! Old-school renaissance character engine.
//!
//! This crate recomputes every derived statistic of a B/X-style character
//! record (ability modifiers, the dual armor-class and attack-target
//! representations, encumbrance and movement, treasure, initiative) and
//! assembles structured roll requests for an external dice evaluator.
//!
//! # Quick Start
//!
//! ```ignore
//! use osr_core::{
//!     create_sample_character, ActorSession, CampaignSettings, MemoryStore, NullSink,
//!     RngEvaluator,
//! };
//! use osr_core::actor::Ability;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = ActorSession::new(
//!         create_sample_character("Thorin"),
//!         CampaignSettings::new(),
//!         Arc::new(RngEvaluator::new()),
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(NullSink),
//!     )
//!     .await;
//!
//!     let report = session.roll_check(Ability::Strength, false).await?;
//!     println!("{:?}", report.judgment);
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod derive;
pub mod evaluator;
pub mod items;
pub mod persist;
pub mod rolls;
pub mod session;
pub mod settings;
pub mod store;
pub mod tables;
pub mod testing;

// Primary public API
pub use actor::{create_sample_character, create_sample_monster, Actor, ActorId, ActorKind};
pub use evaluator::{DiceEvaluator, RngEvaluator, RollOutcome};
pub use rolls::{AttackKind, RollJudgment, RollKind, RollRequest};
pub use session::{ActorSession, NotificationSink, NullSink, RollReport, SessionError};
pub use settings::{AcSystem, CampaignSettings, EncumbrancePolicy, InitiativeMode};
pub use store::{ActorUpdate, MemoryStore, RecordStore};
pub use testing::TestHarness;
