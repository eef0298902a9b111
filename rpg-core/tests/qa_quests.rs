//! QA tests for the quest board, kill tracking and reward claims.
//!
//! Run with: `cargo test -p rpg-core --test qa_quests`

use rpg_core::catalog;
use rpg_core::progression::StreakBonus;
use rpg_core::quests::QuestError;
use rpg_core::testing::{assert_event, assert_no_event, create_sample_monster, create_sample_warrior};
use rpg_core::{BattleEvent, LocationType, ScriptedInput, TestHarness};

fn accept(harness: &mut TestHarness, title: &str) {
    let quest = catalog::quest(title).expect("quest on board");
    harness.player.accept_quest(quest).expect("accept");
}

#[test]
fn test_goblin_hunt_completes_on_third_kill() {
    let mut harness = TestHarness::new().seed(20);
    accept(&mut harness, "First Steps");

    for kill in 1..=3 {
        let (_, events) = harness
            .fight(create_sample_monster("Goblin Grunt"), &mut ScriptedInput::attacks())
            .expect("fight");
        assert_event(&events, "progress", |e| {
            matches!(e, BattleEvent::QuestProgressed { progress, .. } if *progress == kill)
        });
        harness.player.rest();
    }
    assert!(harness.player.active_quests[0].is_completed());
    assert_eq!(
        harness.count_events(|e| matches!(e, BattleEvent::QuestCompleted { .. })),
        1
    );

    // A fourth goblin no longer counts.
    let (_, events) = harness
        .fight(create_sample_monster("Goblin Grunt"), &mut ScriptedInput::attacks())
        .expect("fight");
    assert_no_event(&events, "progress", |e| matches!(e, BattleEvent::QuestProgressed { .. }));
    assert_eq!(harness.player.active_quests[0].current_progress, 3);

    let gold_before = harness.player.gold;
    let reward = harness
        .player
        .claim_quest("First Steps", &StreakBonus::default())
        .expect("claim");
    assert_eq!(reward.gold, 100);
    assert_eq!(reward.fame, 10);
    assert_eq!(harness.player.gold, gold_before + 100);
    assert!(harness.player.active_quests.is_empty());
    assert_eq!(harness.player.completed_quests.len(), 1);
}

#[test]
fn test_non_matching_kill_is_ignored() {
    let mut harness = TestHarness::new().seed(21);
    accept(&mut harness, "Orc Hunter");

    let (_, events) = harness
        .fight(create_sample_monster("Venom Wolf"), &mut ScriptedInput::attacks())
        .expect("fight");
    assert_no_event(&events, "progress", |e| matches!(e, BattleEvent::QuestProgressed { .. }));
    assert_eq!(harness.player.active_quests[0].current_progress, 0);
}

#[test]
fn test_forest_cleansing_counts_by_location() {
    let mut harness = TestHarness::new().seed(22).at(LocationType::Forest);
    accept(&mut harness, "Forest Cleansing");

    harness
        .fight(create_sample_monster("Goblin Grunt"), &mut ScriptedInput::attacks())
        .expect("fight");
    harness.player.rest();
    harness.location = LocationType::Lake;
    harness
        .fight(create_sample_monster("Goblin Grunt"), &mut ScriptedInput::attacks())
        .expect("fight");

    assert_eq!(harness.player.active_quests[0].current_progress, 1);
}

#[test]
fn test_reward_item_delivered_on_claim() {
    let mut player = create_sample_warrior("Brom");
    player.character.level = 3;
    let mut quest = catalog::quest("Undead Purge").expect("quest");
    quest.required_progress = 1;
    player.accept_quest(quest).expect("accept");

    let mut harness = TestHarness::with_player(player).seed(23).at(LocationType::Graveyard);
    harness
        .fight(create_sample_monster("Zombie"), &mut ScriptedInput::attacks())
        .expect("fight");

    let reward = harness
        .player
        .claim_quest("Undead Purge", &StreakBonus::default())
        .expect("claim");
    assert_eq!(reward.item.as_ref().map(|i| i.name()), Some("Holy Armor"));
    assert_eq!(reward.fame, 30);
    assert!(harness.player.inventory.iter().any(|i| i.name() == "Holy Armor"));

    // Completed quests cannot be taken again.
    let again = catalog::quest("Undead Purge").expect("quest");
    assert_eq!(
        harness.player.accept_quest(again),
        Err(QuestError::AlreadyTaken("Undead Purge".into()))
    );
}
