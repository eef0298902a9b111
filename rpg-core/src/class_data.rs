//! Per-class data: base stat profile, level-up growth, starting gear and
//! skill tables.

use crate::items::{Equipment, Item, Potion};
use crate::skills::{Skill, SkillEffect, SkillTarget};
use crate::status::StatusKind;
use crate::world::PlayerClass;

/// Class-specific data for character creation and growth.
pub struct ClassData {
    pub max_hp: i32,
    pub max_mana: i32,
    pub max_stamina: i32,
    pub attack: i32,
    pub defense: i32,
    pub agility: i32,
    pub intelligence: i32,
    /// Gains applied on every level-up.
    pub growth: LevelGrowth,
    pub starting_weapon: Equipment,
    pub starting_armor: Equipment,
}

/// Stat increases granted by one level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelGrowth {
    pub max_hp: i32,
    pub max_mana: i32,
    pub max_stamina: i32,
    pub attack: i32,
    pub defense: i32,
    pub agility: i32,
    pub intelligence: i32,
}

/// Flat gains every class receives per level.
const BASE_GROWTH: LevelGrowth = LevelGrowth {
    max_hp: 10,
    max_mana: 5,
    max_stamina: 8,
    attack: 0,
    defense: 0,
    agility: 0,
    intelligence: 0,
};

pub const STAT_POINTS_PER_LEVEL: u32 = 3;

impl PlayerClass {
    /// Get class data for character creation.
    pub fn data(&self) -> ClassData {
        match self {
            PlayerClass::Warrior => ClassData {
                max_hp: 120,
                max_mana: 30,
                max_stamina: 80,
                attack: 12,
                defense: 10,
                agility: 5,
                intelligence: 3,
                growth: LevelGrowth {
                    max_hp: BASE_GROWTH.max_hp + 5,
                    attack: 2,
                    defense: 1,
                    ..BASE_GROWTH
                },
                starting_weapon: Equipment::weapon("Novice Sword", 0, 5, 1, 100, 0.05, 0.85)
                    .for_class(PlayerClass::Warrior)
                    .with_description("A sword for beginners"),
                starting_armor: Equipment::armor("Novice Armor", 0, 3, 1, 100, 0.03, 0.1)
                    .for_class(PlayerClass::Warrior)
                    .with_description("Armor for beginners"),
            },
            PlayerClass::Archer => ClassData {
                max_hp: 80,
                max_mana: 50,
                max_stamina: 100,
                attack: 10,
                defense: 6,
                agility: 12,
                intelligence: 6,
                growth: LevelGrowth {
                    max_stamina: BASE_GROWTH.max_stamina + 5,
                    agility: 2,
                    ..BASE_GROWTH
                },
                starting_weapon: Equipment::weapon("Novice Bow", 0, 4, 1, 100, 0.1, 0.8)
                    .for_class(PlayerClass::Archer)
                    .with_description("A bow for beginners"),
                starting_armor: Equipment::armor("Novice Leather Armor", 0, 2, 1, 100, 0.1, 0.05)
                    .for_class(PlayerClass::Archer)
                    .with_description("Leather armor for beginners"),
            },
            PlayerClass::Mage => ClassData {
                max_hp: 70,
                max_mana: 120,
                max_stamina: 60,
                attack: 6,
                defense: 4,
                agility: 4,
                intelligence: 15,
                growth: LevelGrowth {
                    max_mana: BASE_GROWTH.max_mana + 10,
                    intelligence: 3,
                    ..BASE_GROWTH
                },
                starting_weapon: Equipment::weapon("Novice Staff", 0, 3, 1, 100, 0.03, 0.9)
                    .for_class(PlayerClass::Mage)
                    .with_description("A staff for beginners"),
                starting_armor: Equipment::armor("Novice Robe", 0, 1, 1, 100, 0.05, 0.03)
                    .for_class(PlayerClass::Mage)
                    .with_description("A robe for beginners"),
            },
        }
    }

    /// Full skill table for the class, in unlock order.
    pub fn skills(&self) -> &'static [Skill] {
        match self {
            PlayerClass::Warrior => WARRIOR_SKILLS.as_slice(),
            PlayerClass::Archer => ARCHER_SKILLS.as_slice(),
            PlayerClass::Mage => MAGE_SKILLS.as_slice(),
        }
    }
}

/// Consumables every new character starts with.
pub fn starting_items() -> Vec<Item> {
    vec![
        Item::Potion(Potion::health("Lesser Health Potion", 0, 30)),
        Item::Potion(Potion::mana("Mana Potion", 0, 30)),
    ]
}

lazy_static::lazy_static! {
    static ref WARRIOR_SKILLS: Vec<Skill> = vec![
        Skill::new("Power Strike", 10, 1)
            .with_description("Deliver one powerful blow.")
            .strike(2),
        Skill::new("Defensive Stance", 15, 3)
            .with_description("Brace yourself and bless your next attacks.")
            .with_effect(SkillEffect::ApplyStatus {
                kind: StatusKind::Bless,
                duration: 3,
                target: SkillTarget::Caster,
            }),
        Skill::new("Fury Strike", 25, 5)
            .with_description("Pour your rage into a crushing attack.")
            .piercing_strike(3),
    ];

    static ref ARCHER_SKILLS: Vec<Skill> = vec![
        Skill::new("Double Shot", 12, 1)
            .with_description("Fire two arrows in quick succession.")
            .with_effect(SkillEffect::PhysicalDamage {
                multiplier: 1,
                halve_defense: false,
                hits: 2,
            }),
        Skill::new("Snipe", 20, 3)
            .with_description("A carefully aimed shot through the armor.")
            .piercing_strike(3),
        Skill::new("Poison Arrow", 18, 5)
            .with_description("Poison the target.")
            .strike(1)
            .with_effect(SkillEffect::ApplyStatus {
                kind: StatusKind::Poison,
                duration: 3,
                target: SkillTarget::Enemy,
            }),
    ];

    static ref MAGE_SKILLS: Vec<Skill> = vec![
        Skill::new("Fireball", 15, 1)
            .with_description("Hurl a ball of fire.")
            .with_effect(SkillEffect::MagicDamage { multiplier: 2 }),
        Skill::new("Heal", 20, 3)
            .with_description("Restore your health.")
            .with_effect(SkillEffect::Heal { multiplier: 3 }),
        Skill::new("Frost", 30, 5)
            .with_description("Freeze the target in place.")
            .with_effect(SkillEffect::MagicDamage { multiplier: 1 })
            .with_effect(SkillEffect::ApplyStatus {
                kind: StatusKind::Freeze,
                duration: 1,
                target: SkillTarget::Enemy,
            }),
    ];
}
