//! QA tests for the derivation pass: duality invariants, encumbrance
//! policies, and movement bands, end to end through the public API.

use osr_core::actor::{create_sample_character, AC_COMPLEMENT};
use osr_core::items::{get_armor, GearItem, Item};
use osr_core::testing::{assert_pair_invariants, TestHarness};
use osr_core::{ActorUpdate, CampaignSettings, EncumbrancePolicy, RecordStore};

// =============================================================================
// Duality Invariants
// =============================================================================

#[tokio::test]
async fn test_ac_pair_after_partial_updates() {
    let mut harness = TestHarness::new().await;

    // Descending AC 7 implies ascending 12.
    harness.session.update(ActorUpdate::new().ac(7)).await.unwrap();
    assert_pair_invariants(harness.session.actor());

    // Updating the ascending side to 15 recomputes descending to 4.
    harness.session.update(ActorUpdate::new().aac(15)).await.unwrap();
    let stored = harness
        .store
        .get(harness.session.actor().id)
        .await
        .unwrap();
    assert_eq!(stored.ac.value, 4);
    assert_eq!(stored.ac.value + stored.aac.value, AC_COMPLEMENT);
}

#[tokio::test]
async fn test_thac0_pair_after_partial_updates() {
    let mut harness = TestHarness::new().await;

    harness.session.update(ActorUpdate::new().thac0(15)).await.unwrap();
    assert_pair_invariants(harness.session.actor());

    harness.session.update(ActorUpdate::new().bba(8)).await.unwrap();
    let stored = harness
        .store
        .get(harness.session.actor().id)
        .await
        .unwrap();
    assert_eq!(stored.thac0.value, 11);
    assert_eq!(stored.thac0.value + stored.thac0.bba, AC_COMPLEMENT);
}

#[tokio::test]
async fn test_encounter_movement_third_of_base() {
    let mut harness = TestHarness::new().await;
    // Manual movement so the rate survives the derivation pass.
    harness.session.edit(|actor| {
        actor.config.movement_auto = false;
        actor.movement.base = 90;
    });
    assert_eq!(harness.session.actor().movement.encounter, 30);

    harness.session.edit(|actor| actor.movement.base = 100);
    assert_eq!(harness.session.actor().movement.encounter, 33);
}

// =============================================================================
// Encumbrance Monotonicity
// =============================================================================

#[tokio::test]
async fn test_more_weight_never_lightens() {
    let settings = CampaignSettings::new().with_encumbrance(EncumbrancePolicy::Complete);
    let harness =
        TestHarness::with_actor(create_sample_character("Mule"), settings).await;
    let mut harness = harness;

    let mut last_pct = -1.0;
    let mut was_encumbered = false;
    for coins in [0u32, 200, 700, 1500, 1601, 2400] {
        harness.session.edit(|actor| {
            actor.items = vec![Item::Gear(
                GearItem::new("Coins")
                    .with_quantity(coins)
                    .with_weight(1.0)
                    .as_treasure(),
            )];
        });
        let enc = &harness.session.actor().encumbrance;
        assert!(enc.pct >= last_pct, "pct decreased at {coins} coins");
        assert!(
            enc.encumbered || !was_encumbered,
            "encumbered flipped back off at {coins} coins"
        );
        last_pct = enc.pct;
        was_encumbered = enc.encumbered;
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_detailed_band_scenario() {
    // detailed policy, max 1600, carried 850: the 800 band, movement 30.
    let settings = CampaignSettings::new().with_encumbrance(EncumbrancePolicy::Detailed);
    let mut actor = create_sample_character("Porter");
    actor.encumbrance.max = 1600.0;
    actor.items.push(Item::Gear(
        GearItem::new("Coins")
            .with_quantity(850)
            .with_weight(1.0)
            .as_treasure(),
    ));
    let harness = TestHarness::with_actor(actor, settings).await;

    let actor = harness.session.actor();
    assert_eq!(actor.encumbrance.value, 850.0);
    assert_eq!(actor.movement.base, 30);
    assert_eq!(actor.movement.encounter, 10);
}

#[tokio::test]
async fn test_basic_heavy_armor_scenario() {
    // basic policy, heavy armor, weight under both limits: 60, no penalty.
    let settings = CampaignSettings::new()
        .with_encumbrance(EncumbrancePolicy::Basic)
        .with_significant_treasure(800.0);
    let mut actor = create_sample_character("Knight");
    actor.items.push(Item::Armor(get_armor("Plate Mail").unwrap().equipped()));
    let harness = TestHarness::with_actor(actor, settings).await;

    assert_eq!(harness.session.actor().movement.base, 60);
}

#[tokio::test]
async fn test_derivation_idempotent_through_session() {
    let mut harness = TestHarness::new().await;
    harness.session.edit(|actor| {
        actor.items.push(Item::Armor(get_armor("Chainmail").unwrap().equipped()));
    });
    let first = harness.session.actor().clone();

    // A second pass over unchanged raw inputs changes nothing.
    harness.session.edit(|_| {});
    assert_eq!(harness.session.actor(), &first);
}
