//! Game world types.
//!
//! Contains the shared shapes the rules engine operates on: identifiers,
//! classes and monster families, locations, clamped resource pools, the
//! base `Character`, and `Monster` with its per-instance loot table.

use crate::dice;
use crate::items::{Item, Potion};
use crate::status::{StatusEffect, StatusKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a player character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Classes and Families
// ============================================================================

/// Playable classes. The class fixes the base stat profile and skill set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerClass {
    Warrior,
    Archer,
    Mage,
}

impl PlayerClass {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerClass::Warrior => "Warrior",
            PlayerClass::Archer => "Archer",
            PlayerClass::Mage => "Mage",
        }
    }

    pub fn all() -> [PlayerClass; 3] {
        [PlayerClass::Warrior, PlayerClass::Archer, PlayerClass::Mage]
    }
}

impl fmt::Display for PlayerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Monster family tag, used by quest predicates and location spawning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterType {
    Normal,
    Beast,
    Plant,
    Undead,
    Ghost,
    Giant,
    Flying,
    Boss,
    Elemental,
    Demon,
    Dragon,
    Construct,
}

impl MonsterType {
    pub fn name(&self) -> &'static str {
        match self {
            MonsterType::Normal => "Normal",
            MonsterType::Beast => "Beast",
            MonsterType::Plant => "Plant",
            MonsterType::Undead => "Undead",
            MonsterType::Ghost => "Ghost",
            MonsterType::Giant => "Giant",
            MonsterType::Flying => "Flying",
            MonsterType::Boss => "Boss",
            MonsterType::Elemental => "Elemental",
            MonsterType::Demon => "Demon",
            MonsterType::Dragon => "Dragon",
            MonsterType::Construct => "Construct",
        }
    }

    /// Bosses and dragons carry the rare loot entries.
    pub fn is_boss_tier(&self) -> bool {
        matches!(self, MonsterType::Boss | MonsterType::Dragon)
    }
}

impl fmt::Display for MonsterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Locations
// ============================================================================

/// Terrain family of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationType {
    Town,
    Forest,
    Mountain,
    Graveyard,
    Dungeon,
    Lake,
}

impl LocationType {
    pub fn name(&self) -> &'static str {
        match self {
            LocationType::Town => "Town",
            LocationType::Forest => "Forest",
            LocationType::Mountain => "Mountain",
            LocationType::Graveyard => "Graveyard",
            LocationType::Dungeon => "Dungeon",
            LocationType::Lake => "Lake",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A named place the player can travel to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub kind: LocationType,
    pub min_level: u32,
    pub max_level: u32,
    pub description: String,
}

impl Location {
    pub fn new(name: impl Into<String>, kind: LocationType, min_level: u32, max_level: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            min_level,
            max_level,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether a player of `level` may travel here.
    pub fn suits(&self, level: u32) -> bool {
        (self.min_level..=self.max_level).contains(&level)
    }
}

// ============================================================================
// Resource Pools
// ============================================================================

/// A clamped `current / maximum` pair used for hp, mana and stamina.
///
/// `current` always stays within `[0, maximum]`: every mutator clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub current: i32,
    pub maximum: i32,
}

impl Pool {
    /// A full pool.
    pub fn new(maximum: i32) -> Self {
        let maximum = maximum.max(0);
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Set the current value, clamped to `[0, maximum]`.
    pub fn set(&mut self, value: i32) {
        self.current = value.clamp(0, self.maximum);
    }

    /// Subtract `amount`, stopping at zero. Returns the amount actually lost.
    pub fn take(&mut self, amount: i32) -> i32 {
        let old = self.current;
        self.set(self.current.saturating_sub(amount.max(0)));
        old - self.current
    }

    /// Add `amount`, stopping at the maximum. Returns the amount actually gained.
    pub fn restore(&mut self, amount: i32) -> i32 {
        let old = self.current;
        self.set(self.current.saturating_add(amount.max(0)));
        self.current - old
    }

    pub fn refill(&mut self) {
        self.current = self.maximum;
    }

    /// Change the maximum, pulling `current` down if it no longer fits.
    pub fn set_maximum(&mut self, maximum: i32) {
        self.maximum = maximum.max(0);
        self.current = self.current.min(self.maximum);
    }

    pub fn grow(&mut self, amount: i32) {
        self.set_maximum(self.maximum.saturating_add(amount));
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.maximum
    }

    pub fn ratio(&self) -> f32 {
        if self.maximum == 0 {
            return 0.0;
        }
        (self.current as f32 / self.maximum as f32).max(0.0)
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.maximum)
    }
}

// ============================================================================
// Character
// ============================================================================

/// Stat shape shared by players and monsters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub level: u32,
    pub hp: Pool,
    pub base_attack: i32,
    pub base_defense: i32,
    pub agility: i32,
    pub intelligence: i32,
    #[serde(default)]
    pub status_effects: Vec<StatusEffect>,
    pub critical_chance: f64,
    pub evasion: f64,
}

impl Character {
    pub fn new(name: impl Into<String>, level: u32, max_hp: i32, attack: i32, defense: i32) -> Self {
        Self {
            name: name.into(),
            level,
            hp: Pool::new(max_hp),
            base_attack: attack,
            base_defense: defense,
            agility: 0,
            intelligence: 0,
            status_effects: Vec::new(),
            critical_chance: 0.0,
            evasion: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.hp.is_empty()
    }

    /// Deal damage, clamped at zero hp. Returns the hp actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.hp.take(amount)
    }

    /// Heal, clamped at max hp. Returns the hp actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        self.hp.restore(amount)
    }

    /// Outgoing attack power: `base_attack + bonus`, then scaled once per
    /// active Bless stack (truncating after each stack).
    pub fn attack_with_bonus(&self, bonus: i32) -> i32 {
        let stacks = self.count_status(StatusKind::Bless);
        (0..stacks).fold(self.base_attack + bonus, |attack, _| {
            (f64::from(attack) * crate::status::BLESS_MULTIPLIER) as i32
        })
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.status_effects.iter().any(|e| e.kind == kind)
    }

    pub fn count_status(&self, kind: StatusKind) -> usize {
        self.status_effects.iter().filter(|e| e.kind == kind).count()
    }
}

// ============================================================================
// Loot
// ============================================================================

/// One weighted entry in a loot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item: Item,
    pub weight: u32,
}

/// A weighted list of items a monster may drop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LootTable {
    pub entries: Vec<LootEntry>,
}

impl LootTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: Item, weight: u32) {
        self.entries.push(LootEntry { item, weight });
    }

    pub fn total_weight(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.weight)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_weight() == 0
    }

    /// Roll for a drop.
    ///
    /// The drop chance is tested first; an empty or zero-weight table never
    /// drops. The dropped item is a fresh copy of the chosen entry.
    pub fn roll<R: Rng>(&self, drop_chance_percent: u32, rng: &mut R) -> Option<Item> {
        if !dice::percent(rng, drop_chance_percent) || self.is_empty() {
            return None;
        }
        let weights: Vec<u32> = self.entries.iter().map(|e| e.weight).collect();
        dice::weighted_index(rng, &weights).map(|i| self.entries[i].item.clone())
    }
}

// ============================================================================
// Monster
// ============================================================================

/// Shared template data a [`Monster`] is materialised from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub name: String,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub exp_reward: u32,
    pub level: u32,
    pub kind: MonsterType,
}

impl MonsterTemplate {
    pub fn new(
        name: impl Into<String>,
        max_hp: i32,
        attack: i32,
        defense: i32,
        exp_reward: u32,
        level: u32,
        kind: MonsterType,
    ) -> Self {
        Self {
            name: name.into(),
            max_hp,
            attack,
            defense,
            exp_reward,
            level,
            kind,
        }
    }
}

pub const DEFAULT_LOOT_CHANCE: u32 = 30;
pub const MONSTER_CRITICAL_CHANCE: f64 = 0.1;
pub const MONSTER_EVASION: f64 = 0.1;

/// A live opponent. Each instance owns its own loot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub character: Character,
    pub exp_reward: u32,
    pub gold_reward: u32,
    pub kind: MonsterType,
    pub loot_table: LootTable,
    /// Drop chance in percent.
    pub loot_chance: u32,
}

impl Monster {
    /// Build a monster with an empty loot table.
    pub fn from_template(template: &MonsterTemplate) -> Self {
        let mut character = Character::new(
            template.name.clone(),
            template.level,
            template.max_hp,
            template.attack,
            template.defense,
        );
        character.critical_chance = MONSTER_CRITICAL_CHANCE;
        character.evasion = MONSTER_EVASION;

        Self {
            character,
            exp_reward: template.exp_reward,
            gold_reward: template.exp_reward / 2,
            kind: template.kind,
            loot_table: LootTable::new(),
            loot_chance: DEFAULT_LOOT_CHANCE,
        }
    }

    /// Materialise a monster with its randomised loot table.
    ///
    /// Every spawn has a 50% chance to carry a lesser health potion and a
    /// 30% chance to carry a lesser mana potion. Boss-tier monsters add rare
    /// entries; other monsters of level 5 or higher add greater potions.
    pub fn spawn<R: Rng>(template: &MonsterTemplate, rng: &mut R) -> Self {
        let mut monster = Self::from_template(template);

        if dice::chance(rng, 0.5) {
            monster
                .loot_table
                .add(Item::Potion(Potion::health("Lesser Health Potion", 0, 30)), 1);
        }
        if dice::chance(rng, 0.3) {
            monster
                .loot_table
                .add(Item::Potion(Potion::mana("Lesser Mana Potion", 0, 30)), 1);
        }

        if monster.kind.is_boss_tier() {
            monster.loot_table.add(
                Item::Potion(Potion::universal("Superior Universal Potion", 0, 100, 100, 100)),
                1,
            );
            monster
                .loot_table
                .add(Item::Equipment(crate::catalog::legendary_weapon()), 1);
        } else if monster.character.level >= 5 {
            monster
                .loot_table
                .add(Item::Potion(Potion::health("Greater Health Potion", 0, 100)), 1);
            monster
                .loot_table
                .add(Item::Potion(Potion::mana("Greater Mana Potion", 0, 100)), 1);
        }

        monster
    }

    pub fn with_loot_chance(mut self, percent: u32) -> Self {
        self.loot_chance = percent;
        self
    }

    pub fn name(&self) -> &str {
        &self.character.name
    }

    pub fn level(&self) -> u32 {
        self.character.level
    }

    pub fn is_alive(&self) -> bool {
        self.character.is_alive()
    }

    pub fn attack_power(&self) -> i32 {
        self.character.attack_with_bonus(0)
    }

    pub fn defense(&self) -> i32 {
        self.character.base_defense
    }

    /// Roll this monster's loot table against its drop chance.
    pub fn roll_loot<R: Rng>(&self, rng: &mut R) -> Option<Item> {
        self.loot_table.roll(self.loot_chance, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::seeded;

    fn goblin() -> MonsterTemplate {
        MonsterTemplate::new("Goblin Grunt", 40, 8, 4, 15, 1, MonsterType::Normal)
    }

    #[test]
    fn test_pool_clamps() {
        let mut hp = Pool::new(40);
        assert_eq!(hp.take(100), 40);
        assert_eq!(hp.current, 0);
        assert!(hp.is_empty());

        assert_eq!(hp.restore(500), 40);
        assert_eq!(hp.current, 40);

        hp.set(-5);
        assert_eq!(hp.current, 0);
        hp.set(99);
        assert_eq!(hp.current, 40);
    }

    #[test]
    fn test_pool_set_maximum_pulls_current_down() {
        let mut mana = Pool::new(50);
        mana.set_maximum(30);
        assert_eq!(mana.current, 30);
        mana.grow(10);
        assert_eq!(mana.maximum, 40);
        assert_eq!(mana.current, 30);
    }

    #[test]
    fn test_location_suits() {
        let mountains = Location::new("Eastern Mountains", LocationType::Mountain, 3, 7);
        assert!(!mountains.suits(2));
        assert!(mountains.suits(3));
        assert!(mountains.suits(7));
        assert!(!mountains.suits(8));
    }

    #[test]
    fn test_bless_compounds_per_stack() {
        let mut c = Character::new("Hero", 1, 100, 12, 10);
        assert_eq!(c.attack_with_bonus(5), 17);

        crate::status::apply(&mut c, StatusKind::Bless, 3);
        // 17 * 1.1 = 18.7 -> 18
        assert_eq!(c.attack_with_bonus(5), 18);

        crate::status::apply(&mut c, StatusKind::Bless, 3);
        // 18 * 1.1 = 19.8 -> 19
        assert_eq!(c.attack_with_bonus(5), 19);
    }

    #[test]
    fn test_monster_gold_is_half_exp() {
        let monster = Monster::from_template(&goblin());
        assert_eq!(monster.exp_reward, 15);
        assert_eq!(monster.gold_reward, 7);
        assert_eq!(monster.loot_chance, DEFAULT_LOOT_CHANCE);
        assert!(monster.loot_table.entries.is_empty());
    }

    #[test]
    fn test_empty_loot_table_never_drops() {
        let monster = Monster::from_template(&goblin()).with_loot_chance(100);
        let mut rng = seeded(5);
        for _ in 0..100 {
            assert!(monster.roll_loot(&mut rng).is_none());
        }
    }

    #[test]
    fn test_zero_loot_chance_never_drops() {
        let mut rng = seeded(6);
        let mut monster = Monster::spawn(&goblin(), &mut rng).with_loot_chance(0);
        monster
            .loot_table
            .add(Item::Potion(Potion::health("Lesser Health Potion", 0, 30)), 5);
        for _ in 0..100 {
            assert!(monster.roll_loot(&mut rng).is_none());
        }
    }

    #[test]
    fn test_certain_drop_returns_table_item() {
        let mut monster = Monster::from_template(&goblin()).with_loot_chance(100);
        monster
            .loot_table
            .add(Item::Potion(Potion::mana("Lesser Mana Potion", 0, 30)), 2);
        let mut rng = seeded(8);
        let item = monster.roll_loot(&mut rng);
        assert_eq!(item.map(|i| i.name().to_string()).as_deref(), Some("Lesser Mana Potion"));
    }

    #[test]
    fn test_boss_spawn_has_rare_entries() {
        let dragon = MonsterTemplate::new("Dragon", 250, 35, 20, 150, 8, MonsterType::Dragon);
        let mut rng = seeded(1);
        let monster = Monster::spawn(&dragon, &mut rng);
        let names: Vec<&str> = monster.loot_table.entries.iter().map(|e| e.item.name()).collect();
        assert!(names.contains(&"Superior Universal Potion"));
        assert!(!names.contains(&"Greater Health Potion"));
        assert!(monster
            .loot_table
            .entries
            .iter()
            .any(|e| matches!(e.item, Item::Equipment(_))));
    }

    #[test]
    fn test_high_level_spawn_has_greater_potions() {
        let lich = MonsterTemplate::new("Lich", 80, 25, 10, 70, 5, MonsterType::Undead);
        let mut rng = seeded(2);
        let monster = Monster::spawn(&lich, &mut rng);
        let names: Vec<&str> = monster.loot_table.entries.iter().map(|e| e.item.name()).collect();
        assert!(names.contains(&"Greater Health Potion"));
        assert!(names.contains(&"Greater Mana Potion"));
    }
}
