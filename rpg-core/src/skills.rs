//! Class skills.
//!
//! A skill's behavior is a list of [`SkillEffect`] descriptors interpreted by
//! [`resolve`]. Mana is paid by the combat engine before resolution.

use crate::combat::{calculate_damage, calculate_magic_damage, BattleEvent, Side};
use crate::player::Player;
use crate::status::{self, StatusKind};
use crate::world::Monster;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Who an effect lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillTarget {
    Caster,
    Enemy,
}

/// One operation a skill performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillEffect {
    /// `hits` rolls of `calculate_damage(attack * multiplier, defense)`,
    /// with the enemy's defense halved when `halve_defense` is set.
    PhysicalDamage {
        multiplier: i32,
        halve_defense: bool,
        hits: u32,
    },
    /// `calculate_magic_damage(intelligence * multiplier, defense)`.
    MagicDamage { multiplier: i32 },
    /// Restores `intelligence * multiplier` hp to the caster.
    Heal { multiplier: i32 },
    ApplyStatus {
        kind: StatusKind,
        duration: u32,
        target: SkillTarget,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub mana_cost: i32,
    pub level_requirement: u32,
    pub description: String,
    pub effects: Vec<SkillEffect>,
}

impl Skill {
    pub fn new(name: impl Into<String>, mana_cost: i32, level_requirement: u32) -> Self {
        Self {
            name: name.into(),
            mana_cost,
            level_requirement,
            description: String::new(),
            effects: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_effect(mut self, effect: SkillEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Single hit of `attack * multiplier` against full defense.
    pub fn strike(self, multiplier: i32) -> Self {
        self.with_effect(SkillEffect::PhysicalDamage {
            multiplier,
            halve_defense: false,
            hits: 1,
        })
    }

    /// Single hit of `attack * multiplier` against halved defense.
    pub fn piercing_strike(self, multiplier: i32) -> Self {
        self.with_effect(SkillEffect::PhysicalDamage {
            multiplier,
            halve_defense: true,
            hits: 1,
        })
    }

    pub fn is_unlocked_at(&self, level: u32) -> bool {
        self.level_requirement <= level
    }
}

/// Apply a skill's effects to the battle pair, returning the events produced.
///
/// Damage effects stop once the enemy is dead; caster-side effects still
/// apply.
pub fn resolve<R: Rng>(
    skill: &Skill,
    player: &mut Player,
    monster: &mut Monster,
    rng: &mut R,
) -> Vec<BattleEvent> {
    let mut events = Vec::new();

    for effect in &skill.effects {
        match *effect {
            SkillEffect::PhysicalDamage {
                multiplier,
                halve_defense,
                hits,
            } => {
                let attack = player.attack_power() * multiplier;
                let defense = if halve_defense {
                    monster.defense() / 2
                } else {
                    monster.defense()
                };
                for _ in 0..hits {
                    if !monster.is_alive() {
                        break;
                    }
                    let damage = calculate_damage(attack, defense, rng);
                    monster.character.take_damage(damage);
                    events.push(BattleEvent::AttackDealt {
                        attacker: Side::Player,
                        damage,
                        critical: false,
                        heavy: false,
                    });
                }
            }
            SkillEffect::MagicDamage { multiplier } => {
                if !monster.is_alive() {
                    continue;
                }
                let power = player.character.intelligence * multiplier;
                let damage = calculate_magic_damage(power, monster.defense(), rng);
                monster.character.take_damage(damage);
                events.push(BattleEvent::AttackDealt {
                    attacker: Side::Player,
                    damage,
                    critical: false,
                    heavy: false,
                });
            }
            SkillEffect::Heal { multiplier } => {
                let amount = player.character.heal(player.character.intelligence * multiplier);
                events.push(BattleEvent::Healed {
                    target: Side::Player,
                    amount,
                });
            }
            SkillEffect::ApplyStatus {
                kind,
                duration,
                target,
            } => {
                let (side, character) = match target {
                    SkillTarget::Caster => (Side::Player, &mut player.character),
                    SkillTarget::Enemy => {
                        if !monster.is_alive() {
                            continue;
                        }
                        (Side::Monster, &mut monster.character)
                    }
                };
                status::apply(character, kind, duration);
                events.push(BattleEvent::StatusApplied {
                    target: side,
                    kind,
                    duration,
                });
            }
        }
    }

    events
}
