//! Testing utilities for the rules engine.
//!
//! This module provides tools for deterministic tests:
//! - Sample characters and monsters
//! - `ScriptedInput`, an `ActionSource` that replays a fixed list of choices
//! - `TestHarness` for seeded battle scenarios
//! - Assertion helpers over the `BattleEvent` stream

use crate::catalog;
use crate::combat::{ActionChoice, ActionSource, Battle, BattleEvent, CombatConfig, CombatError};
use crate::dice::{self, GameRng};
use crate::player::Player;
use crate::world::{LocationType, Monster, MonsterTemplate, MonsterType, PlayerClass};
use std::collections::VecDeque;

// ============================================================================
// Fixtures
// ============================================================================

pub fn create_sample_warrior(name: &str) -> Player {
    Player::new(name, PlayerClass::Warrior)
}

pub fn create_sample_archer(name: &str) -> Player {
    Player::new(name, PlayerClass::Archer)
}

pub fn create_sample_mage(name: &str) -> Player {
    Player::new(name, PlayerClass::Mage)
}

/// A monster from the catalog with an empty loot table, or a generic
/// level 1 opponent if the name is unknown.
pub fn create_sample_monster(name: &str) -> Monster {
    match catalog::monster_template(name) {
        Some(template) => Monster::from_template(template),
        None => Monster::from_template(&MonsterTemplate::new(name, 40, 8, 4, 15, 1, MonsterType::Normal)),
    }
}

// ============================================================================
// Scripted input
// ============================================================================

/// Replays queued choices in order, then keeps attacking.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    choices: VecDeque<ActionChoice>,
    /// Number of choices handed out so far.
    pub asked: usize,
}

impl ScriptedInput {
    pub fn new(choices: impl IntoIterator<Item = ActionChoice>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
            asked: 0,
        }
    }

    /// Always attack.
    pub fn attacks() -> Self {
        Self::default()
    }

    pub fn then(mut self, choice: ActionChoice) -> Self {
        self.choices.push_back(choice);
        self
    }

    pub fn remaining(&self) -> usize {
        self.choices.len()
    }
}

impl ActionSource for ScriptedInput {
    fn choose(&mut self, _player: &Player, _battle: &Battle) -> ActionChoice {
        self.asked += 1;
        self.choices.pop_front().unwrap_or(ActionChoice::Attack)
    }
}

// ============================================================================
// Test Harness
// ============================================================================

/// A seeded player, RNG and combat config for scripted battle scenarios.
pub struct TestHarness {
    pub player: Player,
    pub rng: GameRng,
    pub config: CombatConfig,
    pub location: LocationType,
    /// Every event produced through this harness, in order.
    pub events: Vec<BattleEvent>,
}

impl TestHarness {
    /// A level 1 warrior in the forest, seeded with 0.
    pub fn new() -> Self {
        Self::with_player(create_sample_warrior("Tester"))
    }

    pub fn with_player(player: Player) -> Self {
        Self {
            player,
            rng: dice::seeded(0),
            config: CombatConfig::default(),
            location: LocationType::Forest,
            events: Vec::new(),
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = dice::seeded(seed);
        self
    }

    pub fn config(mut self, config: CombatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn at(mut self, location: LocationType) -> Self {
        self.location = location;
        self
    }

    /// Fight `monster` to the end with scripted input. Returns this
    /// battle's events and the finished battle.
    pub fn fight(
        &mut self,
        monster: Monster,
        input: &mut ScriptedInput,
    ) -> Result<(Battle, Vec<BattleEvent>), CombatError> {
        let mut battle = Battle::new(monster, self.location, self.config.clone());
        let events = battle.run(&mut self.player, input, &mut self.rng)?;
        self.events.extend(events.iter().cloned());
        Ok((battle, events))
    }

    pub fn player_hp(&self) -> (i32, i32) {
        let hp = self.player.character.hp;
        (hp.current, hp.maximum)
    }

    pub fn count_events(&self, pred: impl Fn(&BattleEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert that some event matches `pred`.
#[track_caller]
pub fn assert_event(events: &[BattleEvent], what: &str, pred: impl Fn(&BattleEvent) -> bool) {
    assert!(
        events.iter().any(pred),
        "Expected an event matching {what}, got {events:#?}"
    );
}

/// Assert that no event matches `pred`.
#[track_caller]
pub fn assert_no_event(events: &[BattleEvent], what: &str, pred: impl Fn(&BattleEvent) -> bool) {
    assert!(
        !events.iter().any(pred),
        "Expected no event matching {what}, got {events:#?}"
    );
}

/// Assert the battle ended in victory.
#[track_caller]
pub fn assert_victory(events: &[BattleEvent]) {
    assert_event(events, "Victory", |e| matches!(e, BattleEvent::Victory { .. }));
}

/// Assert player HP is at expected values.
#[track_caller]
pub fn assert_hp(player: &Player, current: i32, max: i32) {
    let hp = player.character.hp;
    assert_eq!(
        (hp.current, hp.maximum),
        (current, max),
        "Expected HP {current}/{max}, got {}/{}",
        hp.current,
        hp.maximum
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::BattleState;

    #[test]
    fn test_scripted_input_replays_then_attacks() {
        let player = create_sample_mage("Lyra");
        let battle = Battle::new(create_sample_monster("Goblin Grunt"), LocationType::Forest, CombatConfig::default());
        let mut input = ScriptedInput::new([ActionChoice::Skill(0)]).then(ActionChoice::Item(0));

        assert_eq!(input.remaining(), 2);
        assert_eq!(input.choose(&player, &battle), ActionChoice::Skill(0));
        assert_eq!(input.choose(&player, &battle), ActionChoice::Item(0));
        assert_eq!(input.choose(&player, &battle), ActionChoice::Attack);
        assert_eq!(input.asked, 3);
    }

    #[test]
    fn test_harness_fight_records_events() {
        let mut harness = TestHarness::new().seed(7);
        let mut goblin = create_sample_monster("Goblin Grunt");
        goblin.character.hp.set(1);

        let (battle, events) = harness
            .fight(goblin, &mut ScriptedInput::attacks())
            .expect("fight");
        assert_eq!(battle.state(), BattleState::Victory);
        assert_victory(&events);
        assert_eq!(harness.events.len(), events.len());
        assert_eq!(harness.count_events(|e| matches!(e, BattleEvent::Defeat)), 0);
    }

    #[test]
    fn test_unknown_monster_fixture() {
        let monster = create_sample_monster("Practice Dummy");
        assert_eq!(monster.name(), "Practice Dummy");
        assert_eq!(monster.level(), 1);
        assert!(monster.loot_table.is_empty());
    }
}
