//! The battle state machine.
//!
//! A [`Battle`] runs one fight between a [`Player`] and a [`Monster`]:
//!
//! ```text
//! AwaitingTurnOrder -> PlayerTurn <-> MonsterTurn -> Victory | Defeat
//! ```
//!
//! The engine never blocks on input. [`Battle::start`] and
//! [`Battle::submit`] resolve everything they can and return as soon as the
//! player must choose an action or the battle is over. Each call returns
//! the ordered [`BattleEvent`]s it produced.

use crate::dice;
use crate::player::{Player, Restored};
use crate::progression::StreakBonus;
use crate::quests;
use crate::skills;
use crate::status::{self, StatusKind, StatusTick};
use crate::world::{LocationType, Monster};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Misuse of the battle API. Gameplay conditions never produce these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CombatError {
    #[error("The battle is already over")]
    BattleOver,

    #[error("It is not the player's turn")]
    NotPlayerTurn,

    #[error("The battle has already started")]
    AlreadyStarted,
}

// ============================================================================
// Configuration
// ============================================================================

/// Tunable combat rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatConfig {
    /// Stamina spent by a basic attack.
    pub attack_stamina_cost: i32,
    /// Stamina restored to the player at the end of each round.
    pub stamina_regen: i32,
    pub evasion_cap: f64,
    /// Evasion granted per point of agility.
    pub agility_evasion_factor: f64,
    /// Probability that a monster uses its normal attack.
    pub normal_attack_chance: f64,
    /// Monsters below this level never use heavy attacks.
    pub heavy_attack_min_level: u32,
    /// Durability lost by each equipped piece when a monster attack lands.
    pub durability_loss: u32,
    pub streak: StreakBonus,
    /// `(player level, location)` pairs unlocked after a victory.
    pub unlocks: Vec<(u32, String)>,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_stamina_cost: 5,
            stamina_regen: 5,
            evasion_cap: 0.5,
            agility_evasion_factor: 0.01,
            normal_attack_chance: 0.8,
            heavy_attack_min_level: 3,
            durability_loss: 1,
            streak: StreakBonus::default(),
            unlocks: vec![
                (3, "Eastern Mountains".to_string()),
                (5, "Northern Graveyard".to_string()),
            ],
        }
    }
}

impl CombatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attack_stamina_cost(mut self, cost: i32) -> Self {
        self.attack_stamina_cost = cost;
        self
    }

    pub fn with_stamina_regen(mut self, regen: i32) -> Self {
        self.stamina_regen = regen;
        self
    }

    pub fn with_evasion_cap(mut self, cap: f64) -> Self {
        self.evasion_cap = cap;
        self
    }

    pub fn with_normal_attack_chance(mut self, chance: f64) -> Self {
        self.normal_attack_chance = chance;
        self
    }

    pub fn with_agility_evasion_factor(mut self, factor: f64) -> Self {
        self.agility_evasion_factor = factor;
        self
    }

    pub fn with_heavy_attack_min_level(mut self, level: u32) -> Self {
        self.heavy_attack_min_level = level;
        self
    }

    pub fn with_streak(mut self, streak: StreakBonus) -> Self {
        self.streak = streak;
        self
    }

    pub fn with_unlocks(mut self, unlocks: Vec<(u32, String)>) -> Self {
        self.unlocks = unlocks;
        self
    }
}

// ============================================================================
// Damage formulas
// ============================================================================

/// `base = max(1, attack - defense)`, plus a uniform bonus in `[0, base/2]`.
pub fn calculate_damage<R: Rng>(attack: i32, defense: i32, rng: &mut R) -> i32 {
    roll_variance(attack.saturating_sub(defense), rng)
}

/// Like [`calculate_damage`] but the defender's defense is halved first.
pub fn calculate_magic_damage<R: Rng>(power: i32, defense: i32, rng: &mut R) -> i32 {
    roll_variance(power.saturating_sub(defense / 2), rng)
}

/// Scale a landed hit by armor damage reduction, truncating. A hit that
/// connects always deals at least 1.
pub fn reduce_damage(damage: i32, reduction: f64) -> i32 {
    let factor = (1.0 - reduction).clamp(0.0, 1.0);
    ((f64::from(damage) * factor) as i32).max(1)
}

fn roll_variance<R: Rng>(raw: i32, rng: &mut R) -> i32 {
    let base = raw.max(1);
    base.saturating_add(dice::up_to(rng, base / 2))
}

/// Whether the player acts first.
///
/// Draws uniformly from `[0, agility + monster_level * 5)` and succeeds when
/// the draw exceeds `monster_level * 5`. An empty range means the monster
/// goes first.
pub fn roll_turn_order<R: Rng>(player_agility: i32, monster_level: u32, rng: &mut R) -> bool {
    let weight = i64::from(monster_level) * 5;
    let range = i64::from(player_agility) + weight;
    if range <= 0 {
        return false;
    }
    rng.gen_range(0..range) > weight
}

// ============================================================================
// Actions and events
// ============================================================================

/// One player decision. Indices are zero-based into the lists the player is
/// offered: unlocked skills, and potions in inventory order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionChoice {
    Attack,
    Skill(usize),
    Item(usize),
}

/// Why a requested action was replaced by a basic attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackReason {
    InvalidSelection,
    NoSkillsAvailable,
    InsufficientMana,
    NoUsableItems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Monster,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "player"),
            Side::Monster => write!(f, "monster"),
        }
    }
}

/// Structured battle log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    BattleStarted { monster: String, level: u32 },
    TurnOrderDecided { player_first: bool },
    RoundStarted { round: u32 },
    ActionFallback { reason: FallbackReason },
    AttackDealt {
        attacker: Side,
        damage: i32,
        critical: bool,
        heavy: bool,
    },
    AttackEvaded { attacker: Side },
    SkillUsed { name: String, mana_cost: i32 },
    Healed { target: Side, amount: i32 },
    ItemUsed { name: String, restored: Restored },
    StatusApplied {
        target: Side,
        kind: StatusKind,
        duration: u32,
    },
    StatusDamage {
        target: Side,
        kind: StatusKind,
        amount: i32,
    },
    StatusExpired { target: Side, kind: StatusKind },
    TurnSkipped { side: Side },
    StaminaRestored { amount: i32 },
    EquipmentBroken { name: String },
    Victory { monster: String },
    Defeat,
    ExperienceGained { amount: u32, streak_bonus: bool },
    LevelUp { level: u32 },
    GoldGained { amount: u32 },
    QuestProgressed {
        title: String,
        progress: u32,
        required: u32,
    },
    QuestCompleted { title: String },
    LootObtained { item: String },
    LocationUnlocked { name: String },
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleEvent::BattleStarted { monster, level } => {
                write!(f, "A level {level} {monster} appears")
            }
            BattleEvent::TurnOrderDecided { player_first } => {
                if *player_first {
                    write!(f, "You move first")
                } else {
                    write!(f, "The enemy moves first")
                }
            }
            BattleEvent::RoundStarted { round } => write!(f, "Round {round}"),
            BattleEvent::ActionFallback { reason } => {
                write!(f, "{reason:?}; falling back to a basic attack")
            }
            BattleEvent::AttackDealt {
                attacker,
                damage,
                critical,
                heavy,
            } => {
                write!(f, "The {attacker} deals {damage} damage")?;
                if *critical {
                    write!(f, " (critical)")?;
                }
                if *heavy {
                    write!(f, " (heavy)")?;
                }
                Ok(())
            }
            BattleEvent::AttackEvaded { attacker } => write!(f, "The {attacker}'s attack misses"),
            BattleEvent::SkillUsed { name, mana_cost } => write!(f, "{name} ({mana_cost} mana)"),
            BattleEvent::Healed { target, amount } => write!(f, "The {target} heals {amount}"),
            BattleEvent::ItemUsed { name, restored } => write!(
                f,
                "Used {name} (+{} hp, +{} mana, +{} stamina)",
                restored.hp, restored.mana, restored.stamina
            ),
            BattleEvent::StatusApplied {
                target,
                kind,
                duration,
            } => write!(f, "The {target} is afflicted with {kind} for {duration} turns"),
            BattleEvent::StatusDamage {
                target,
                kind,
                amount,
            } => write!(f, "{kind} deals {amount} damage to the {target}"),
            BattleEvent::StatusExpired { target, kind } => {
                write!(f, "{kind} wears off the {target}")
            }
            BattleEvent::TurnSkipped { side } => write!(f, "The {side} is frozen and cannot act"),
            BattleEvent::StaminaRestored { amount } => write!(f, "Recovered {amount} stamina"),
            BattleEvent::EquipmentBroken { name } => write!(f, "{name} broke"),
            BattleEvent::Victory { monster } => write!(f, "Defeated {monster}"),
            BattleEvent::Defeat => write!(f, "You have fallen"),
            BattleEvent::ExperienceGained {
                amount,
                streak_bonus,
            } => {
                write!(f, "Gained {amount} experience")?;
                if *streak_bonus {
                    write!(f, " (streak bonus)")?;
                }
                Ok(())
            }
            BattleEvent::LevelUp { level } => write!(f, "Reached level {level}"),
            BattleEvent::GoldGained { amount } => write!(f, "Gained {amount} gold"),
            BattleEvent::QuestProgressed {
                title,
                progress,
                required,
            } => write!(f, "{title}: {progress}/{required}"),
            BattleEvent::QuestCompleted { title } => write!(f, "Quest completed: {title}"),
            BattleEvent::LootObtained { item } => write!(f, "Obtained {item}"),
            BattleEvent::LocationUnlocked { name } => write!(f, "Unlocked {name}"),
        }
    }
}

// ============================================================================
// Battle
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleState {
    AwaitingTurnOrder,
    PlayerTurn,
    MonsterTurn,
    Victory,
    Defeat,
}

impl BattleState {
    pub fn is_over(&self) -> bool {
        matches!(self, BattleState::Victory | BattleState::Defeat)
    }
}

/// Supplies the player's choice whenever the battle awaits one.
pub trait ActionSource {
    fn choose(&mut self, player: &Player, battle: &Battle) -> ActionChoice;
}

/// One battle in progress.
#[derive(Debug, Clone)]
pub struct Battle {
    pub monster: Monster,
    /// Type of the location the battle takes place in, for quest tracking.
    pub location: LocationType,
    pub config: CombatConfig,
    state: BattleState,
    round: u32,
    player_first: bool,
    turns_this_round: u8,
}

impl Battle {
    pub fn new(monster: Monster, location: LocationType, config: CombatConfig) -> Self {
        Self {
            monster,
            location,
            config,
            state: BattleState::AwaitingTurnOrder,
            round: 0,
            player_first: false,
            turns_this_round: 0,
        }
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn player_first(&self) -> bool {
        self.player_first
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// Roll turn order and resolve until the player must act.
    pub fn start<R: Rng>(
        &mut self,
        player: &mut Player,
        rng: &mut R,
    ) -> Result<Vec<BattleEvent>, CombatError> {
        if self.state != BattleState::AwaitingTurnOrder {
            return Err(CombatError::AlreadyStarted);
        }

        info!(monster = %self.monster.name(), level = self.monster.level(), "Battle started");
        let mut events = vec![BattleEvent::BattleStarted {
            monster: self.monster.name().to_string(),
            level: self.monster.level(),
        }];

        self.player_first = roll_turn_order(player.character.agility, self.monster.level(), rng);
        events.push(BattleEvent::TurnOrderDecided {
            player_first: self.player_first,
        });

        if !self.check_outcome(player, rng, &mut events) {
            self.begin_round(&mut events);
            self.advance(player, rng, &mut events);
        }
        Ok(events)
    }

    /// Resolve the player's action, then everything up to the next decision.
    pub fn submit<R: Rng>(
        &mut self,
        player: &mut Player,
        choice: ActionChoice,
        rng: &mut R,
    ) -> Result<Vec<BattleEvent>, CombatError> {
        match self.state {
            BattleState::PlayerTurn => {}
            BattleState::Victory | BattleState::Defeat => return Err(CombatError::BattleOver),
            BattleState::AwaitingTurnOrder | BattleState::MonsterTurn => {
                return Err(CombatError::NotPlayerTurn)
            }
        }

        let mut events = Vec::new();
        self.player_action(player, choice, rng, &mut events);
        self.finish_turn(player, rng, &mut events);
        self.advance(player, rng, &mut events);
        Ok(events)
    }

    /// Drive the whole battle, asking `source` for every player decision.
    pub fn run<R: Rng, S: ActionSource>(
        &mut self,
        player: &mut Player,
        source: &mut S,
        rng: &mut R,
    ) -> Result<Vec<BattleEvent>, CombatError> {
        let mut events = self.start(player, rng)?;
        while !self.is_over() {
            let choice = source.choose(player, self);
            events.extend(self.submit(player, choice, rng)?);
        }
        Ok(events)
    }

    fn begin_round(&mut self, events: &mut Vec<BattleEvent>) {
        self.round += 1;
        self.turns_this_round = 0;
        self.state = if self.player_first {
            BattleState::PlayerTurn
        } else {
            BattleState::MonsterTurn
        };
        events.push(BattleEvent::RoundStarted { round: self.round });
    }

    /// Run monster turns and frozen player turns until input is needed.
    fn advance<R: Rng>(&mut self, player: &mut Player, rng: &mut R, events: &mut Vec<BattleEvent>) {
        loop {
            match self.state {
                BattleState::MonsterTurn => {
                    if status::is_frozen(&self.monster.character) {
                        debug!(monster = %self.monster.name(), "Monster frozen");
                        events.push(BattleEvent::TurnSkipped { side: Side::Monster });
                        let spent = status::spend_freeze(&mut self.monster.character);
                        push_ticks(Side::Monster, spent.into_iter().collect(), events);
                    } else {
                        self.monster_action(player, rng, events);
                    }
                    self.finish_turn(player, rng, events);
                }
                BattleState::PlayerTurn if status::is_frozen(&player.character) => {
                    debug!(player = %player.name(), "Player frozen");
                    events.push(BattleEvent::TurnSkipped { side: Side::Player });
                    let spent = status::spend_freeze(&mut player.character);
                    push_ticks(Side::Player, spent.into_iter().collect(), events);
                    self.finish_turn(player, rng, events);
                }
                _ => return,
            }
        }
    }

    /// Close the current turn: stop on a death, otherwise hand over to the
    /// other side or close the round.
    fn finish_turn<R: Rng>(&mut self, player: &mut Player, rng: &mut R, events: &mut Vec<BattleEvent>) {
        if self.check_outcome(player, rng, events) {
            return;
        }

        self.turns_this_round += 1;
        if self.turns_this_round < 2 {
            self.state = match self.state {
                BattleState::PlayerTurn => BattleState::MonsterTurn,
                _ => BattleState::PlayerTurn,
            };
            return;
        }

        self.end_round(player, events);
        if !self.check_outcome(player, rng, events) {
            self.begin_round(events);
        }
    }

    /// Tick status effects on both sides, then regenerate stamina.
    fn end_round(&mut self, player: &mut Player, events: &mut Vec<BattleEvent>) {
        push_ticks(Side::Player, status::tick(&mut player.character), events);
        push_ticks(Side::Monster, status::tick(&mut self.monster.character), events);

        let amount = player.stamina.restore(self.config.stamina_regen);
        if amount > 0 {
            events.push(BattleEvent::StaminaRestored { amount });
        }
    }

    // ========================================================================
    // Player actions
    // ========================================================================

    fn player_action<R: Rng>(
        &mut self,
        player: &mut Player,
        choice: ActionChoice,
        rng: &mut R,
        events: &mut Vec<BattleEvent>,
    ) {
        match choice {
            ActionChoice::Attack => self.basic_attack(player, rng, events),
            ActionChoice::Skill(index) => self.use_skill(player, index, rng, events),
            ActionChoice::Item(index) => self.use_item(player, index, rng, events),
        }
    }

    fn fallback<R: Rng>(
        &mut self,
        reason: FallbackReason,
        player: &mut Player,
        rng: &mut R,
        events: &mut Vec<BattleEvent>,
    ) {
        warn!(?reason, "Falling back to basic attack");
        events.push(BattleEvent::ActionFallback { reason });
        self.basic_attack(player, rng, events);
    }

    fn basic_attack<R: Rng>(&mut self, player: &mut Player, rng: &mut R, events: &mut Vec<BattleEvent>) {
        let mut damage = calculate_damage(player.attack_power(), self.monster.defense(), rng);
        let critical = player
            .weapon_critical_chance()
            .is_some_and(|chance| dice::chance(rng, chance));
        if critical {
            damage *= 2;
        }

        self.monster.character.take_damage(damage);
        player.stamina.take(self.config.attack_stamina_cost);

        debug!(damage, critical, "Player basic attack");
        events.push(BattleEvent::AttackDealt {
            attacker: Side::Player,
            damage,
            critical,
            heavy: false,
        });
    }

    fn use_skill<R: Rng>(
        &mut self,
        player: &mut Player,
        index: usize,
        rng: &mut R,
        events: &mut Vec<BattleEvent>,
    ) {
        let available = player.available_skills();
        if available.is_empty() {
            return self.fallback(FallbackReason::NoSkillsAvailable, player, rng, events);
        }
        let Some(skill) = available.get(index).copied() else {
            return self.fallback(FallbackReason::InvalidSelection, player, rng, events);
        };
        if player.mana.current < skill.mana_cost {
            return self.fallback(FallbackReason::InsufficientMana, player, rng, events);
        }

        player.mana.take(skill.mana_cost);
        debug!(skill = %skill.name, "Player skill");
        events.push(BattleEvent::SkillUsed {
            name: skill.name.clone(),
            mana_cost: skill.mana_cost,
        });
        events.extend(skills::resolve(skill, player, &mut self.monster, rng));
    }

    fn use_item<R: Rng>(
        &mut self,
        player: &mut Player,
        index: usize,
        rng: &mut R,
        events: &mut Vec<BattleEvent>,
    ) {
        let potions = player.potion_slots();
        if potions.is_empty() {
            return self.fallback(FallbackReason::NoUsableItems, player, rng, events);
        }
        let Some(&slot) = potions.get(index) else {
            return self.fallback(FallbackReason::InvalidSelection, player, rng, events);
        };

        match player.use_potion(slot) {
            Ok((name, restored)) => events.push(BattleEvent::ItemUsed { name, restored }),
            Err(_) => self.fallback(FallbackReason::NoUsableItems, player, rng, events),
        }
    }

    // ========================================================================
    // Monster action
    // ========================================================================

    fn monster_action<R: Rng>(&mut self, player: &mut Player, rng: &mut R, events: &mut Vec<BattleEvent>) {
        let evasion = player.evasion_rating(self.config.agility_evasion_factor, self.config.evasion_cap);
        if dice::chance(rng, evasion) {
            debug!(monster = %self.monster.name(), "Player evaded");
            events.push(BattleEvent::AttackEvaded {
                attacker: Side::Monster,
            });
            return;
        }

        let normal = dice::chance(rng, self.config.normal_attack_chance)
            || self.monster.level() < self.config.heavy_attack_min_level;
        let attack = if normal {
            self.monster.attack_power()
        } else {
            self.monster.attack_power().saturating_mul(2)
        };

        let mut damage = calculate_damage(attack, player.defense(), rng);
        if player.armor.is_some() {
            damage = reduce_damage(damage, player.damage_reduction());
        }
        player.character.take_damage(damage);

        debug!(monster = %self.monster.name(), damage, heavy = !normal, "Monster attack");
        events.push(BattleEvent::AttackDealt {
            attacker: Side::Monster,
            damage,
            critical: false,
            heavy: !normal,
        });

        for name in player.wear_equipment(self.config.durability_loss) {
            events.push(BattleEvent::EquipmentBroken { name });
        }
    }

    // ========================================================================
    // Outcome
    // ========================================================================

    /// Detect a finished battle. A dead player loses even if the monster
    /// died too, and a loss ends the battle streak.
    fn check_outcome<R: Rng>(&mut self, player: &mut Player, rng: &mut R, events: &mut Vec<BattleEvent>) -> bool {
        if !player.is_alive() {
            self.state = BattleState::Defeat;
            player.consecutive_battles = 0;
            info!(monster = %self.monster.name(), round = self.round, "Battle lost");
            events.push(BattleEvent::Defeat);
            return true;
        }
        if !self.monster.is_alive() {
            self.state = BattleState::Victory;
            info!(monster = %self.monster.name(), round = self.round, "Battle won");
            self.grant_rewards(player, rng, events);
            return true;
        }
        false
    }

    /// Experience, gold, streak, quest progress, loot and unlocks.
    fn grant_rewards<R: Rng>(&mut self, player: &mut Player, rng: &mut R, events: &mut Vec<BattleEvent>) {
        events.push(BattleEvent::Victory {
            monster: self.monster.name().to_string(),
        });

        let award = player.award_experience(self.monster.exp_reward, &self.config.streak);
        events.push(BattleEvent::ExperienceGained {
            amount: award.amount,
            streak_bonus: award.streak_bonus,
        });
        events.extend(
            award
                .levels_gained
                .into_iter()
                .map(|level| BattleEvent::LevelUp { level }),
        );

        player.gold += self.monster.gold_reward;
        events.push(BattleEvent::GoldGained {
            amount: self.monster.gold_reward,
        });
        player.consecutive_battles += 1;

        for update in quests::track_kill(&mut player.active_quests, &self.monster, self.location) {
            let completed = update.completed;
            let title = update.title.clone();
            events.push(BattleEvent::QuestProgressed {
                title: update.title,
                progress: update.progress,
                required: update.required,
            });
            if completed {
                events.push(BattleEvent::QuestCompleted { title });
            }
        }

        if let Some(item) = self.monster.roll_loot(rng) {
            events.push(BattleEvent::LootObtained {
                item: item.name().to_string(),
            });
            player.add_item(item);
        }

        for (level, location) in &self.config.unlocks {
            if player.level() >= *level && player.unlock_location(location) {
                info!(location = %location, "Location unlocked");
                events.push(BattleEvent::LocationUnlocked {
                    name: location.clone(),
                });
            }
        }
    }
}

fn push_ticks(side: Side, ticks: Vec<StatusTick>, events: &mut Vec<BattleEvent>) {
    for tick in ticks {
        debug!(%side, ?tick, "Status tick");
        events.push(match tick {
            StatusTick::Damage { kind, amount } => BattleEvent::StatusDamage {
                target: side,
                kind,
                amount,
            },
            StatusTick::Expired { kind } => BattleEvent::StatusExpired { target: side, kind },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::seeded;
    use crate::world::{MonsterTemplate, MonsterType, PlayerClass, Pool};

    fn goblin() -> Monster {
        Monster::from_template(&MonsterTemplate::new(
            "Goblin Grunt",
            40,
            8,
            4,
            15,
            1,
            MonsterType::Normal,
        ))
    }

    fn unarmed_warrior() -> Player {
        let mut player = Player::new("Brom", PlayerClass::Warrior);
        player.weapon = None;
        player.armor = None;
        player
    }

    #[test]
    fn test_damage_is_at_least_one() {
        let mut rng = seeded(1);
        for _ in 0..100 {
            assert_eq!(calculate_damage(1, 50, &mut rng), 1);
            assert_eq!(calculate_magic_damage(1, 100, &mut rng), 1);
        }
    }

    #[test]
    fn test_unarmed_warrior_damage_range() {
        let mut rng = seeded(2);
        for _ in 0..500 {
            let damage = calculate_damage(12, 4, &mut rng);
            assert!((8..=12).contains(&damage));
        }
    }

    #[test]
    fn test_magic_damage_halves_defense() {
        let mut rng = seeded(3);
        for _ in 0..200 {
            // base = 30 - 10/2 = 25
            let damage = calculate_magic_damage(30, 10, &mut rng);
            assert!((25..=37).contains(&damage));
        }
    }

    #[test]
    fn test_armor_reduction_keeps_hits_positive() {
        assert_eq!(reduce_damage(10, 0.5), 5);
        assert_eq!(reduce_damage(9, 0.15), 7);
        assert_eq!(reduce_damage(1, 0.1), 1);
        assert_eq!(reduce_damage(40, 1.5), 1);
        assert_eq!(reduce_damage(40, -0.5), 40);
    }

    #[test]
    fn test_turn_order_guards_empty_range() {
        let mut rng = seeded(4);
        assert!(!roll_turn_order(0, 0, &mut rng));
    }

    #[test]
    fn test_turn_order_zero_level_monster() {
        // draw in [0, 10) must exceed 0
        let mut rng = seeded(5);
        let firsts = (0..1000).filter(|_| roll_turn_order(10, 0, &mut rng)).count();
        assert!(firsts > 800);
    }

    #[test]
    fn test_submit_before_start_is_rejected() {
        let mut player = unarmed_warrior();
        let mut battle = Battle::new(goblin(), LocationType::Forest, CombatConfig::default());
        let mut rng = seeded(6);
        assert_eq!(
            battle.submit(&mut player, ActionChoice::Attack, &mut rng),
            Err(CombatError::NotPlayerTurn)
        );
        battle.start(&mut player, &mut rng).expect("start");
        assert_eq!(
            battle.start(&mut player, &mut rng).map(|_| ()),
            Err(CombatError::AlreadyStarted)
        );
    }

    #[test]
    fn test_invalid_skill_falls_back_to_attack() {
        let mut player = unarmed_warrior();
        let mut monster = goblin();
        monster.character.hp = Pool::new(1000);
        let mut battle = Battle::new(monster, LocationType::Forest, CombatConfig::default());
        let mut rng = seeded(7);
        battle.start(&mut player, &mut rng).expect("start");

        let events = battle
            .submit(&mut player, ActionChoice::Skill(9), &mut rng)
            .expect("submit");
        assert_eq!(
            events.first(),
            Some(&BattleEvent::ActionFallback {
                reason: FallbackReason::InvalidSelection
            })
        );
        assert!(matches!(
            events.get(1),
            Some(BattleEvent::AttackDealt {
                attacker: Side::Player,
                ..
            })
        ));
    }

    #[test]
    fn test_insufficient_mana_falls_back() {
        let mut player = unarmed_warrior();
        player.mana.set(0);
        let mut monster = goblin();
        monster.character.hp = Pool::new(1000);
        let mut battle = Battle::new(monster, LocationType::Forest, CombatConfig::default());
        let mut rng = seeded(8);
        battle.start(&mut player, &mut rng).expect("start");

        let events = battle
            .submit(&mut player, ActionChoice::Skill(0), &mut rng)
            .expect("submit");
        assert_eq!(
            events.first(),
            Some(&BattleEvent::ActionFallback {
                reason: FallbackReason::InsufficientMana
            })
        );
        assert_eq!(player.mana.current, 0);
    }

    #[test]
    fn test_no_items_falls_back() {
        let mut player = unarmed_warrior();
        player.inventory.clear();
        let mut monster = goblin();
        monster.character.hp = Pool::new(1000);
        let mut battle = Battle::new(monster, LocationType::Forest, CombatConfig::default());
        let mut rng = seeded(9);
        battle.start(&mut player, &mut rng).expect("start");

        let events = battle
            .submit(&mut player, ActionChoice::Item(0), &mut rng)
            .expect("submit");
        assert_eq!(
            events.first(),
            Some(&BattleEvent::ActionFallback {
                reason: FallbackReason::NoUsableItems
            })
        );
    }

    #[test]
    fn test_basic_attack_spends_stamina() {
        let mut player = unarmed_warrior();
        let mut monster = goblin();
        monster.character.hp = Pool::new(1000);
        let config = CombatConfig::default().with_stamina_regen(0);
        let mut battle = Battle::new(monster, LocationType::Forest, config);
        let mut rng = seeded(10);
        battle.start(&mut player, &mut rng).expect("start");

        battle
            .submit(&mut player, ActionChoice::Attack, &mut rng)
            .expect("submit");
        assert_eq!(player.stamina.current, 75);
    }

    #[test]
    fn test_battle_over_rejects_submit() {
        let mut player = unarmed_warrior();
        let mut monster = goblin();
        monster.character.hp.set(1);
        let mut battle = Battle::new(monster, LocationType::Forest, CombatConfig::default());
        let mut rng = seeded(11);
        battle.start(&mut player, &mut rng).expect("start");
        while !battle.is_over() {
            battle
                .submit(&mut player, ActionChoice::Attack, &mut rng)
                .expect("submit");
        }
        assert_eq!(battle.state(), BattleState::Victory);
        assert_eq!(
            battle.submit(&mut player, ActionChoice::Attack, &mut rng),
            Err(CombatError::BattleOver)
        );
    }

    #[test]
    fn test_event_display() {
        let event = BattleEvent::AttackDealt {
            attacker: Side::Player,
            damage: 12,
            critical: true,
            heavy: false,
        };
        assert_eq!(event.to_string(), "The player deals 12 damage (critical)");
    }
}
