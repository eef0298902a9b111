//! Exploration and travel events.
//!
//! Exploring spends stamina and rolls one of four outcomes: a monster
//! encounter, found items, a special event, or nothing. Found items and
//! event effects are applied to the player before the outcome is returned;
//! encounters hand back a spawned monster for the caller to fight.

use crate::catalog;
use crate::dice;
use crate::items::{Equipment, Item, Potion};
use crate::player::{InventoryError, Player, Restored};
use crate::progression::{ExperienceAward, StreakBonus};
use crate::world::{Location, Monster};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Stamina spent by one exploration.
pub const EXPLORE_STAMINA_COST: i32 = 20;

/// Chance of a second find when exploring turns up an item.
pub const EXTRA_ITEM_CHANCE: f64 = 0.1;

/// Chance that travelling triggers an event at all.
pub const TRAVEL_EVENT_CHANCE: f64 = 0.5;

/// Cumulative thresholds for `(encounter, item, special event)`; a roll
/// above the last one finds nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Thresholds(f64, f64, f64);

const EXPLORE_THRESHOLDS: Thresholds = Thresholds(0.6, 0.85, 0.95);
const TRAVEL_THRESHOLDS: Thresholds = Thresholds(0.4, 0.7, 0.85);

/// A one-off event met while exploring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpecialEvent {
    /// Hp and mana refilled.
    Fountain { restored: Restored },
    Treasure { gold: u32 },
    /// A travelling merchant. Nothing is applied; the caller may offer the
    /// stock through [`Player::buy`].
    Merchant { stock: Vec<Item> },
    Trap { damage: i32 },
    Ruins { experience: ExperienceAward },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Discovery {
    Encounter(Monster),
    /// Items already added to the inventory.
    FoundItems(Vec<Item>),
    Event(SpecialEvent),
    Nothing,
}

/// Explore the player's surroundings at `location`.
pub fn explore<R: Rng>(
    player: &mut Player,
    location: &Location,
    streak: &StreakBonus,
    rng: &mut R,
) -> Result<Discovery, InventoryError> {
    player.spend_stamina(EXPLORE_STAMINA_COST)?;
    let discovery = discover(player, location, streak, EXPLORE_THRESHOLDS, rng);
    debug!(location = %location.name, ?discovery, "Explored");
    Ok(discovery)
}

/// Roll for an event on arrival after travelling. Half of all journeys are
/// quiet.
pub fn travel_event<R: Rng>(
    player: &mut Player,
    location: &Location,
    streak: &StreakBonus,
    rng: &mut R,
) -> Discovery {
    if !dice::chance(rng, TRAVEL_EVENT_CHANCE) {
        return Discovery::Nothing;
    }
    discover(player, location, streak, TRAVEL_THRESHOLDS, rng)
}

fn discover<R: Rng>(
    player: &mut Player,
    location: &Location,
    streak: &StreakBonus,
    thresholds: Thresholds,
    rng: &mut R,
) -> Discovery {
    let roll: f64 = rng.gen();
    if roll < thresholds.0 {
        match catalog::spawn_for(location.kind, player.level(), rng) {
            Some(monster) => Discovery::Encounter(monster),
            None => Discovery::Nothing,
        }
    } else if roll < thresholds.1 {
        let mut found = vec![random_item(rng)];
        if dice::chance(rng, EXTRA_ITEM_CHANCE) {
            found.push(random_item(rng));
        }
        for item in &found {
            info!(item = %item.name(), "Found item");
            player.add_item(item.clone());
        }
        Discovery::FoundItems(found)
    } else if roll < thresholds.2 {
        Discovery::Event(special_event(player, streak, rng))
    } else {
        Discovery::Nothing
    }
}

/// Roll one of the five special events and apply it.
///
/// A trap never takes the player below 1 hp.
pub fn special_event<R: Rng>(player: &mut Player, streak: &StreakBonus, rng: &mut R) -> SpecialEvent {
    match rng.gen_range(0..5) {
        0 => {
            let restored = Restored {
                hp: player.character.heal(player.character.hp.maximum),
                mana: player.mana.restore(player.mana.maximum),
                stamina: 0,
            };
            SpecialEvent::Fountain { restored }
        }
        1 => {
            let gold = dice::offset(rng, 50, 100) as u32;
            player.gold += gold;
            SpecialEvent::Treasure { gold }
        }
        2 => SpecialEvent::Merchant {
            stock: catalog::merchant_stock(),
        },
        3 => {
            let rolled = dice::offset(rng, 10, 20);
            let damage = rolled.min(player.character.hp.current - 1).max(0);
            player.character.take_damage(damage);
            SpecialEvent::Trap { damage }
        }
        _ => {
            let amount = dice::offset(rng, 30, 50) as u32;
            SpecialEvent::Ruins {
                experience: player.award_experience(amount, streak),
            }
        }
    }
}

// ============================================================================
// Random loot
// ============================================================================

/// Roll a random find: 40% health potion, 30% mana potion, 15% stamina
/// potion, 10% found gear, 5% rare gear. Found items are worth no gold.
pub fn random_item<R: Rng>(rng: &mut R) -> Item {
    let roll = rng.gen_range(0..100);
    if roll < 40 {
        Item::Potion(Potion::health("Health Potion", 0, dice::offset(rng, 30, 20)))
    } else if roll < 70 {
        Item::Potion(Potion::mana("Mana Potion", 0, dice::offset(rng, 20, 15)))
    } else if roll < 85 {
        Item::Potion(Potion::stamina("Stamina Potion", 0, dice::offset(rng, 25, 15)))
    } else if roll < 95 {
        Item::Equipment(random_gear(GearGrade::Found, rng))
    } else {
        Item::Equipment(random_gear(GearGrade::Rare, rng))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GearGrade {
    Found,
    Rare,
}

/// `(low, span)` ranges for one kind of generated gear. The two fractional
/// stats are `base + uniform[0,1) * spread`.
struct GearRolls {
    stat: (i32, i32),
    level: (i32, i32),
    durability: (i32, i32),
    first: (f64, f64),
    second: (f64, f64),
}

const FOUND_WEAPON: GearRolls = GearRolls {
    stat: (3, 5),
    level: (1, 3),
    durability: (50, 50),
    first: (0.05, 0.1),
    second: (0.8, 0.15),
};

const FOUND_ARMOR: GearRolls = GearRolls {
    stat: (2, 4),
    level: (1, 2),
    durability: (60, 60),
    first: (0.03, 0.07),
    second: (0.05, 0.1),
};

const RARE_WEAPON: GearRolls = GearRolls {
    stat: (8, 7),
    level: (3, 4),
    durability: (80, 70),
    first: (0.15, 0.1),
    second: (0.85, 0.1),
};

const RARE_ARMOR: GearRolls = GearRolls {
    stat: (6, 5),
    level: (3, 3),
    durability: (90, 80),
    first: (0.1, 0.1),
    second: (0.15, 0.1),
};

const WEAPON_PREFIXES: [&str; 6] = ["Sharp", "Mighty", "Shining", "Ancient", "Magic", "Fine"];
const WEAPON_TYPES: [&str; 8] = ["Sword", "Axe", "Mace", "Spear", "Bow", "Crossbow", "Staff", "Dagger"];
const ARMOR_PREFIXES: [&str; 6] = ["Sturdy", "Light", "Shining", "Ancient", "Magic", "Fine"];
const ARMOR_TYPES: [&str; 6] = ["Armor", "Helm", "Gauntlets", "Boots", "Cloak", "Shield"];

/// Generate an unbound, zero-price weapon or armor piece with even odds.
pub fn random_gear<R: Rng>(grade: GearGrade, rng: &mut R) -> Equipment {
    let weapon = rng.gen_bool(0.5);
    let (rolls, label) = match (grade, weapon) {
        (GearGrade::Found, true) => (&FOUND_WEAPON, "Found"),
        (GearGrade::Found, false) => (&FOUND_ARMOR, "Found"),
        (GearGrade::Rare, true) => (&RARE_WEAPON, "Rare"),
        (GearGrade::Rare, false) => (&RARE_ARMOR, "Rare"),
    };
    let base_name = if weapon {
        pick_name(&WEAPON_PREFIXES, &WEAPON_TYPES, rng)
    } else {
        pick_name(&ARMOR_PREFIXES, &ARMOR_TYPES, rng)
    };
    let name = format!("{label} {base_name}");

    let stat = dice::offset(rng, rolls.stat.0, rolls.stat.1);
    let level = dice::offset(rng, rolls.level.0, rolls.level.1) as u32;
    let durability = dice::offset(rng, rolls.durability.0, rolls.durability.1) as u32;
    let first = rolls.first.0 + rng.gen::<f64>() * rolls.first.1;
    let second = rolls.second.0 + rng.gen::<f64>() * rolls.second.1;

    if weapon {
        Equipment::weapon(name, 0, stat, level, durability, first, second)
    } else {
        Equipment::armor(name, 0, stat, level, durability, first, second)
    }
}

fn pick_name<R: Rng>(prefixes: &[&str], types: &[&str], rng: &mut R) -> String {
    let prefix = prefixes[rng.gen_range(0..prefixes.len())];
    let kind = types[rng.gen_range(0..types.len())];
    format!("{prefix} {kind}")
}
