//! QA tests for experience, level growth, stat points and gear upkeep.
//!
//! Run with: `cargo test -p rpg-core --test qa_progression`

use rpg_core::items::{Equipment, EquipmentKind, EquipmentSlot};
use rpg_core::player::RepairTarget;
use rpg_core::progression::{ProgressionError, Stat, StreakBonus};
use rpg_core::testing::{assert_event, create_sample_archer, create_sample_monster, create_sample_warrior};
use rpg_core::{BattleEvent, InventoryError, Item, ScriptedInput, TestHarness};

// =============================================================================
// Experience
// =============================================================================

#[test]
fn test_large_award_levels_twice() {
    let mut player = create_sample_warrior("Brom");
    player.experience = 95;

    let award = player.award_experience(250, &StreakBonus::default());

    assert_eq!(award.levels_gained, vec![2, 3]);
    assert_eq!(player.level(), 3);
    assert_eq!(player.exp_to_next, 225);
    assert_eq!(player.experience, 95);
    assert_eq!(player.stat_points, 6);
    assert!(player.character.hp.is_full());
    assert!(player.mana.is_full());
    assert!(player.stamina.is_full());
}

#[test]
fn test_streak_bonus_in_battle() {
    let mut harness = TestHarness::new().seed(12);
    harness.player.consecutive_battles = 5;

    let (_, events) = harness
        .fight(create_sample_monster("Goblin Grunt"), &mut ScriptedInput::attacks())
        .expect("fight");

    assert_event(&events, "bonus experience", |e| {
        matches!(e, BattleEvent::ExperienceGained { amount: 16, streak_bonus: true })
    });
    assert_eq!(harness.player.consecutive_battles, 6);
}

#[test]
fn test_level_up_reported_in_battle() {
    let mut harness = TestHarness::new().seed(13);
    harness.player.experience = 90;

    let (_, events) = harness
        .fight(create_sample_monster("Goblin Grunt"), &mut ScriptedInput::attacks())
        .expect("fight");

    assert_event(&events, "level 2", |e| matches!(e, BattleEvent::LevelUp { level: 2 }));
    assert_eq!(harness.player.stat_points, 3);
}

// =============================================================================
// Stat points
// =============================================================================

#[test]
fn test_stat_points_spend_one_at_a_time() {
    let mut player = create_sample_archer("Aria");
    player.stat_points = 2;

    player.allocate_stat(Stat::Agility).expect("agility");
    player.allocate_stat(Stat::Intelligence).expect("intelligence");
    assert_eq!(player.character.agility, 13);
    assert_eq!(player.character.intelligence, 7);
    assert_eq!(
        player.allocate_stat(Stat::Attack),
        Err(ProgressionError::NoStatPoints)
    );
    assert_eq!(player.stat_points, 0);
}

// =============================================================================
// Equipment upkeep
// =============================================================================

#[test]
fn test_enhancement_compounds() {
    let mut sword = Equipment::weapon("Long Sword", 200, 20, 1, 100, 0.1, 0.85);
    sword.enhance();
    sword.enhance();

    // 20 -> 22 -> 24, truncating after each step
    assert_eq!(sword.attack(), 24);
    assert_eq!(sword.enhancement_level, 2);
    assert!(matches!(sword.kind, EquipmentKind::Weapon(w) if w.attack == 24));
}

#[test]
fn test_repair_and_sell_prices_follow_wear() {
    let mut armor = Equipment::armor("Chain Mail", 250, 8, 1, 100, 0.03, 0.15);
    assert_eq!(armor.repair_cost(), 0);
    assert_eq!(armor.sell_price(), 175);

    armor.reduce_durability(50);
    assert_eq!(armor.repair_cost(), 12);
    assert_eq!(armor.sell_price(), 87);

    armor.reduce_durability(500);
    assert!(armor.is_broken());
    assert_eq!(armor.durability, 0);
    assert_eq!(armor.sell_price(), 0);
    assert_eq!(armor.repair_cost(), 25);
}

#[test]
fn test_repair_equipped_armor_charges_gold() {
    let mut player = create_sample_warrior("Brom");
    let mut chain_mail = Equipment::armor("Chain Mail", 250, 8, 1, 100, 0.03, 0.15);
    chain_mail.reduce_durability(100);
    player.add_item(Item::Equipment(chain_mail));

    let index = player.inventory.len() - 1;
    assert!(matches!(player.equip(index), Err(InventoryError::Broken(_))));

    player.gold = 10;
    assert!(matches!(
        player.repair(RepairTarget::Inventory(index)),
        Err(InventoryError::NotEnoughGold { needed: 25, available: 10 })
    ));

    player.gold = 100;
    assert_eq!(player.repair(RepairTarget::Inventory(index)), Ok(25));
    assert_eq!(player.gold, 75);
    player.equip(index).expect("equip repaired armor");
    assert_eq!(
        player.equipped(EquipmentSlot::Armor).map(|a| a.name.as_str()),
        Some("Chain Mail")
    );
    assert!(player.inventory.iter().any(|i| i.name() == "Novice Armor"));
}
