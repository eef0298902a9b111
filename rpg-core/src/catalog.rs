//! Static game data: locations, monster templates, quests and shop stock.
//!
//! Everything here is template data. Callers receive fresh values (cloned
//! items, newly spawned monsters, unstarted quests) and never mutate the
//! shared tables.

use crate::dice;
use crate::items::{Equipment, Item, Potion, Scroll, ScrollEffect};
use crate::quests::{Quest, QuestPredicate};
use crate::world::{Location, LocationType, Monster, MonsterTemplate, MonsterType, PlayerClass};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Name of the town every character starts in and returns to.
pub const TOWN: &str = "Town";

/// Locations unlocked for a new character.
pub const STARTING_LOCATIONS: [&str; 2] = [TOWN, "Western Forest"];

/// Spawned monsters may be at most this many levels above the player.
pub const SPAWN_LEVEL_MARGIN: u32 = 2;

lazy_static::lazy_static! {
    static ref LOCATIONS: Vec<Location> = vec![
        Location::new(TOWN, LocationType::Town, 1, 10)
            .with_description("A peaceful starting town."),
        Location::new("Western Forest", LocationType::Forest, 1, 5)
            .with_description("A dense forest where goblins and beasts roam."),
        Location::new("Eastern Mountains", LocationType::Mountain, 3, 7)
            .with_description("Rugged peaks held by orcs and trolls."),
        Location::new("Northern Graveyard", LocationType::Graveyard, 5, 8)
            .with_description("A cursed graveyard where the dead walk."),
        Location::new("Dragon's Lair", LocationType::Dungeon, 7, 10)
            .with_description("The lair of an ancient dragon."),
        Location::new("Southern Lake", LocationType::Lake, 2, 6)
            .with_description("A misty lake with strange creatures."),
    ];

    static ref MONSTERS: Vec<MonsterTemplate> = vec![
        MonsterTemplate::new("Goblin Grunt", 40, 8, 4, 15, 1, MonsterType::Normal),
        MonsterTemplate::new("Goblin Fighter", 60, 12, 6, 25, 2, MonsterType::Normal),
        MonsterTemplate::new("Goblin Shaman", 50, 15, 3, 30, 2, MonsterType::Normal),
        MonsterTemplate::new("Venom Wolf", 70, 14, 5, 30, 2, MonsterType::Beast),
        MonsterTemplate::new("Giant Spider", 55, 10, 8, 25, 2, MonsterType::Beast),
        MonsterTemplate::new("Man-eating Plant", 80, 12, 10, 35, 3, MonsterType::Plant),
        MonsterTemplate::new("Orc Warrior", 100, 18, 8, 40, 3, MonsterType::Normal),
        MonsterTemplate::new("Orc Shaman", 70, 22, 5, 45, 3, MonsterType::Normal),
        MonsterTemplate::new("Troll", 150, 20, 12, 60, 4, MonsterType::Giant),
        MonsterTemplate::new("Harpy", 65, 16, 7, 40, 3, MonsterType::Flying),
        MonsterTemplate::new("Skeleton Warrior", 60, 14, 6, 30, 2, MonsterType::Undead),
        MonsterTemplate::new("Wraith", 45, 18, 3, 35, 3, MonsterType::Ghost),
        MonsterTemplate::new("Zombie", 90, 12, 5, 25, 2, MonsterType::Undead),
        MonsterTemplate::new("Lich", 80, 25, 10, 70, 5, MonsterType::Undead),
        MonsterTemplate::new("Minotaur", 180, 25, 15, 100, 6, MonsterType::Boss),
        MonsterTemplate::new("Fire Elemental", 70, 30, 5, 60, 5, MonsterType::Elemental),
        MonsterTemplate::new("Dark Knight", 120, 22, 18, 80, 6, MonsterType::Demon),
        MonsterTemplate::new("Dragon", 250, 35, 20, 150, 8, MonsterType::Dragon),
        MonsterTemplate::new("Golem", 200, 28, 25, 90, 7, MonsterType::Construct),
    ];
}

// ============================================================================
// Locations
// ============================================================================

pub fn locations() -> &'static [Location] {
    LOCATIONS.as_slice()
}

/// Look up a location by exact name.
pub fn location(name: &str) -> Option<&'static Location> {
    LOCATIONS.iter().find(|l| l.name == name)
}

// ============================================================================
// Monsters
// ============================================================================

pub fn monster_templates() -> &'static [MonsterTemplate] {
    MONSTERS.as_slice()
}

pub fn monster_template(name: &str) -> Option<&'static MonsterTemplate> {
    MONSTERS.iter().find(|m| m.name == name)
}

/// Whether a template belongs to the wildlife of a location type.
pub fn native_to(template: &MonsterTemplate, location: LocationType) -> bool {
    let name = template.name.as_str();
    match location {
        LocationType::Town => false,
        LocationType::Forest => {
            name.contains("Goblin") || matches!(template.kind, MonsterType::Beast | MonsterType::Plant)
        }
        LocationType::Mountain => {
            name.contains("Orc") || name.contains("Troll") || name.contains("Harpy")
        }
        LocationType::Graveyard => matches!(template.kind, MonsterType::Undead | MonsterType::Ghost),
        LocationType::Dungeon => matches!(template.kind, MonsterType::Boss | MonsterType::Demon),
        LocationType::Lake => template.kind == MonsterType::Elemental || name == "Harpy",
    }
}

/// Templates native to `location` and at most [`SPAWN_LEVEL_MARGIN`] levels
/// above `player_level`.
pub fn templates_for(location: LocationType, player_level: u32) -> Vec<&'static MonsterTemplate> {
    MONSTERS
        .iter()
        .filter(|m| m.level <= player_level + SPAWN_LEVEL_MARGIN && native_to(m, location))
        .collect()
}

/// Spawn a random opponent for `location`.
///
/// Falls back to any template when nothing native fits the player's level.
pub fn spawn_for<R: Rng>(location: LocationType, player_level: u32, rng: &mut R) -> Option<Monster> {
    let candidates = templates_for(location, player_level);
    let template = if candidates.is_empty() {
        dice::index(rng, MONSTERS.len()).map(|i| &MONSTERS[i])
    } else {
        dice::index(rng, candidates.len()).map(|i| candidates[i])
    }?;
    Some(Monster::spawn(template, rng))
}

// ============================================================================
// Quests
// ============================================================================

/// Fresh, unstarted copies of the quest board.
pub fn quests() -> Vec<Quest> {
    vec![
        Quest::new("First Steps", QuestPredicate::NameContains("Goblin".into()), 3, 50, 100)
            .with_description("Defeat 3 goblins."),
        Quest::new("Orc Hunter", QuestPredicate::NameContains("Orc".into()), 2, 80, 150)
            .with_description("Defeat 2 orcs."),
        Quest::new("Undead Purge", QuestPredicate::MonsterType(MonsterType::Undead), 5, 150, 300)
            .with_description("Destroy 5 undead.")
            .with_level_requirement(3)
            .with_reward_item(Item::Equipment(
                Equipment::armor("Holy Armor", 0, 10, 5, 150, 0.05, 0.2)
                    .with_description("Armor blessed against the dead."),
            )),
        Quest::new("Dragon Slayer", QuestPredicate::MonsterType(MonsterType::Dragon), 1, 500, 1000)
            .with_description("Slay the dragon.")
            .with_level_requirement(5)
            .with_reward_item(Item::Equipment(
                Equipment::weapon("Dragon Slayer", 0, 30, 10, 200, 0.25, 0.95)
                    .with_description("A blade forged to fell dragons."),
            )),
        Quest::new(
            "Forest Cleansing",
            QuestPredicate::LocationType(LocationType::Forest),
            10,
            200,
            300,
        )
        .with_description("Defeat 10 monsters in the forest."),
    ]
}

/// Look up a quest on the board by title.
pub fn quest(title: &str) -> Option<Quest> {
    quests().into_iter().find(|q| q.title == title)
}

// ============================================================================
// Items
// ============================================================================

/// Rare weapon carried by boss-tier monsters.
pub fn legendary_weapon() -> Equipment {
    Equipment::weapon("Legendary Weapon", 0, 30, 10, 200, 0.2, 0.9)
        .with_description("A weapon of legend.")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShopKind {
    Weapons,
    Armor,
    Potions,
    Special,
}

impl ShopKind {
    pub fn all() -> [ShopKind; 4] {
        [ShopKind::Weapons, ShopKind::Armor, ShopKind::Potions, ShopKind::Special]
    }
}

/// Full stock of a shop, regardless of who is browsing.
pub fn shop_stock(kind: ShopKind) -> Vec<Item> {
    match kind {
        ShopKind::Weapons => weapon_stock(),
        ShopKind::Armor => armor_stock(),
        ShopKind::Potions => potion_stock(),
        ShopKind::Special => special_stock(),
    }
}

/// Stock a character of `class` may buy. Class-bound gear for other
/// classes is hidden; level requirements are checked at purchase.
pub fn stock_for(kind: ShopKind, class: PlayerClass) -> Vec<Item> {
    shop_stock(kind)
        .into_iter()
        .filter(|item| {
            item.as_equipment()
                .and_then(|e| e.required_class)
                .map_or(true, |c| c == class)
        })
        .collect()
}

fn weapon_stock() -> Vec<Item> {
    use PlayerClass::*;
    [
        (Warrior, Equipment::weapon("Dagger", 100, 5, 1, 100, 0.05, 0.85)),
        (Warrior, Equipment::weapon("Greatsword", 300, 12, 3, 120, 0.1, 0.8)),
        (Warrior, Equipment::weapon("Axe", 250, 10, 2, 110, 0.15, 0.75)),
        (Warrior, Equipment::weapon("Mace", 350, 8, 4, 130, 0.2, 0.7)),
        (Archer, Equipment::weapon("Short Bow", 120, 6, 1, 100, 0.1, 0.85)),
        (Archer, Equipment::weapon("Long Bow", 320, 14, 3, 110, 0.15, 0.8)),
        (Archer, Equipment::weapon("Crossbow", 400, 16, 4, 90, 0.2, 0.75)),
        (Archer, Equipment::weapon("Dual Daggers", 280, 8, 2, 100, 0.25, 0.85)),
        (Mage, Equipment::weapon("Oak Staff", 150, 3, 1, 100, 0.05, 0.9)),
        (Mage, Equipment::weapon("Wand", 350, 5, 3, 120, 0.1, 0.95)),
        (Mage, Equipment::weapon("Spellbook", 400, 8, 4, 80, 0.15, 0.9)),
        (Mage, Equipment::weapon("Mana Orb", 500, 10, 5, 150, 0.2, 0.95)),
    ]
    .into_iter()
    .map(|(class, weapon)| Item::Equipment(weapon.for_class(class)))
    .collect()
}

fn armor_stock() -> Vec<Item> {
    use PlayerClass::*;
    [
        (Warrior, Equipment::armor("Leather Armor", 80, 3, 1, 100, 0.05, 0.1)),
        (Warrior, Equipment::armor("Chain Mail", 250, 8, 3, 120, 0.03, 0.15)),
        (Warrior, Equipment::armor("Plate Armor", 600, 15, 5, 150, 0.01, 0.25)),
        (Warrior, Equipment::armor("Hero's Armor", 1200, 20, 8, 200, 0.05, 0.3)),
        (Archer, Equipment::armor("Leather Tunic", 70, 2, 1, 100, 0.1, 0.05)),
        (Archer, Equipment::armor("Elven Mail", 300, 5, 4, 110, 0.15, 0.1)),
        (Archer, Equipment::armor("Ranger Coat", 500, 8, 6, 120, 0.2, 0.15)),
        (Archer, Equipment::armor("Shadow Garb", 1000, 12, 10, 150, 0.25, 0.2)),
        (Mage, Equipment::armor("Mage Robe", 60, 1, 1, 100, 0.1, 0.03)),
        (Mage, Equipment::armor("Rune Robe", 280, 3, 5, 120, 0.15, 0.05)),
        (Mage, Equipment::armor("Mystic Gown", 450, 5, 8, 130, 0.2, 0.08)),
        (Mage, Equipment::armor("Archmage Vestments", 900, 8, 12, 180, 0.25, 0.1)),
    ]
    .into_iter()
    .map(|(class, armor)| Item::Equipment(armor.for_class(class)))
    .collect()
}

fn potion_stock() -> Vec<Item> {
    vec![
        Potion::health("Lesser Health Potion", 50, 30),
        Potion::health("Medium Health Potion", 120, 70).with_level_requirement(3),
        Potion::health("Greater Health Potion", 250, 150).with_level_requirement(5),
        Potion::mana("Lesser Mana Potion", 60, 30),
        Potion::mana("Medium Mana Potion", 150, 70).with_level_requirement(3),
        Potion::mana("Greater Mana Potion", 300, 150).with_level_requirement(5),
        Potion::stamina("Vigor Potion", 80, 40),
        Potion::stamina("Spirit Potion", 180, 80).with_level_requirement(3),
    ]
    .into_iter()
    .map(Item::Potion)
    .collect()
}

fn special_stock() -> Vec<Item> {
    vec![
        Item::Scroll(
            Scroll::new("Return Scroll", 200, ScrollEffect::ReturnToTown)
                .with_description("Instantly return to town."),
        ),
        Item::Scroll(
            Scroll::new("Cleanse Scroll", 300, ScrollEffect::Cleanse)
                .with_level_requirement(3)
                .with_description("Remove every status effect."),
        ),
        Item::Potion(Potion::universal("Universal Potion", 500, 50, 50, 50).with_level_requirement(5)),
        Item::Equipment(
            Equipment::armor("Lucky Ring", 1000, 0, 0, 100, 0.1, 0.05)
                .with_description("A ring that turns blows aside."),
        ),
    ]
}

/// Wares offered by the travelling merchant met while exploring.
pub fn merchant_stock() -> Vec<Item> {
    vec![
        Item::Potion(Potion::health("Mysterious Health Potion", 200, 100)),
        Item::Potion(Potion::mana("Mysterious Mana Potion", 180, 80)),
        Item::Equipment(
            Equipment::weapon("Legendary Sword", 1000, 25, 10, 200, 0.2, 0.95)
                .with_description("A sword of rare make."),
        ),
    ]
}
