//! The player character.
//!
//! `Player` extends the shared [`Character`] shape with class, resources,
//! experience, gold, inventory, equipment slots and quest logs. This module
//! covers inventory transfers, equipment slots, consumables outside battle,
//! shop transactions, travel and resting. Experience and quests extend
//! `Player` from their own modules.

use crate::catalog::{self, TOWN};
use crate::class_data;
use crate::items::{Equipment, EquipmentSlot, Item, PotionEffect, ScrollEffect};
use crate::quests::Quest;
use crate::skills::Skill;
use crate::status;
use crate::world::{Character, Location, PlayerClass, PlayerId, Pool};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Stamina spent by travelling to another location.
pub const TRAVEL_STAMINA_COST: i32 = 15;

/// Refusals from inventory, shop and travel operations.
///
/// Every refusal leaves the player unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InventoryError {
    #[error("No item in inventory slot {0}")]
    NoSuchItem(usize),

    #[error("{0} is not equipment")]
    NotEquipment(String),

    #[error("{0} cannot be used")]
    NotUsable(String),

    #[error("Requires level {required} (currently {current})")]
    LevelTooLow { required: u32, current: u32 },

    #[error("{item} cannot be used by a {class}")]
    WrongClass { item: String, class: PlayerClass },

    #[error("{0} is broken")]
    Broken(String),

    #[error("{0} cannot be sold")]
    NotSellable(String),

    #[error("Not enough gold: need {needed}, have {available}")]
    NotEnoughGold { needed: u32, available: u32 },

    #[error("Nothing equipped in the {0:?} slot")]
    NothingEquipped(EquipmentSlot),

    #[error("Not enough stamina: need {needed}, have {available}")]
    NotEnoughStamina { needed: i32, available: i32 },

    #[error("{0} has not been unlocked yet")]
    LocationLocked(String),

    #[error("{location} is not suitable for level {level}")]
    LocationUnsuitable { location: String, level: u32 },
}

/// Amounts actually restored by a potion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restored {
    pub hp: i32,
    pub mana: i32,
    pub stamina: i32,
}

/// Outcome of using an item outside battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemUse {
    Potion { name: String, restored: Restored },
    ReturnedToTown,
    Cleansed { removed: usize },
}

/// Which piece of equipment to repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairTarget {
    Equipped(EquipmentSlot),
    Inventory(usize),
}

/// A player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub character: Character,
    pub class: PlayerClass,
    pub mana: Pool,
    pub stamina: Pool,
    pub experience: u32,
    pub exp_to_next: u32,
    pub gold: u32,
    pub inventory: Vec<Item>,
    pub weapon: Option<Equipment>,
    pub armor: Option<Equipment>,
    pub stat_points: u32,
    pub active_quests: Vec<Quest>,
    pub completed_quests: Vec<Quest>,
    pub fame: u32,
    pub consecutive_battles: u32,
    pub location: String,
    pub unlocked_locations: Vec<String>,
}

impl Player {
    /// Create a level 1 character with the class profile and starting kit.
    pub fn new(name: impl Into<String>, class: PlayerClass) -> Self {
        let data = class.data();
        let mut character = Character::new(name, 1, data.max_hp, data.attack, data.defense);
        character.agility = data.agility;
        character.intelligence = data.intelligence;

        Self {
            id: PlayerId::new(),
            character,
            class,
            mana: Pool::new(data.max_mana),
            stamina: Pool::new(data.max_stamina),
            experience: 0,
            exp_to_next: 100,
            gold: 100,
            inventory: class_data::starting_items(),
            weapon: Some(data.starting_weapon),
            armor: Some(data.starting_armor),
            stat_points: 0,
            active_quests: Vec::new(),
            completed_quests: Vec::new(),
            fame: 0,
            consecutive_battles: 0,
            location: TOWN.to_string(),
            unlocked_locations: catalog::STARTING_LOCATIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
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

    // ========================================================================
    // Derived combat stats
    // ========================================================================

    /// Base attack plus weapon attack, scaled by any Bless stacks.
    pub fn attack_power(&self) -> i32 {
        let weapon = self.weapon.as_ref().map_or(0, Equipment::attack);
        self.character.attack_with_bonus(weapon)
    }

    /// Base defense plus armor defense.
    pub fn defense(&self) -> i32 {
        self.character.base_defense + self.armor.as_ref().map_or(0, Equipment::defense)
    }

    /// Armor evasion plus `agility * agility_factor`, capped at `cap`.
    pub fn evasion_rating(&self, agility_factor: f64, cap: f64) -> f64 {
        let armor = self
            .armor
            .as_ref()
            .and_then(Equipment::armor_stats)
            .map_or(0.0, |a| a.evasion);
        (armor + f64::from(self.character.agility) * agility_factor).min(cap)
    }

    /// Critical chance of the equipped weapon, if any.
    pub fn weapon_critical_chance(&self) -> Option<f64> {
        self.weapon
            .as_ref()
            .and_then(Equipment::weapon_stats)
            .map(|w| w.critical_chance)
    }

    /// Fraction of incoming damage absorbed by armor.
    pub fn damage_reduction(&self) -> f64 {
        self.armor
            .as_ref()
            .and_then(Equipment::armor_stats)
            .map_or(0.0, |a| a.damage_reduction)
    }

    /// Skills unlocked at the current level, in unlock order.
    pub fn available_skills(&self) -> Vec<&'static Skill> {
        self.class
            .skills()
            .iter()
            .filter(|s| s.is_unlocked_at(self.level()))
            .collect()
    }

    /// Inventory indices of every potion, in inventory order.
    pub fn potion_slots(&self) -> Vec<usize> {
        self.inventory
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_potion())
            .map(|(i, _)| i)
            .collect()
    }

    // ========================================================================
    // Inventory and equipment
    // ========================================================================

    pub fn add_item(&mut self, item: Item) {
        self.inventory.push(item);
    }

    pub fn remove_item(&mut self, index: usize) -> Result<Item, InventoryError> {
        if index >= self.inventory.len() {
            return Err(InventoryError::NoSuchItem(index));
        }
        Ok(self.inventory.remove(index))
    }

    pub fn equipped(&self, slot: EquipmentSlot) -> Option<&Equipment> {
        match slot {
            EquipmentSlot::Weapon => self.weapon.as_ref(),
            EquipmentSlot::Armor => self.armor.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: EquipmentSlot) -> &mut Option<Equipment> {
        match slot {
            EquipmentSlot::Weapon => &mut self.weapon,
            EquipmentSlot::Armor => &mut self.armor,
        }
    }

    /// Move equipment from the inventory into its slot.
    ///
    /// Whatever was in the slot goes back to the inventory. Broken gear and
    /// gear the player does not meet the requirements for is refused.
    pub fn equip(&mut self, index: usize) -> Result<(), InventoryError> {
        let item = self
            .inventory
            .get(index)
            .ok_or(InventoryError::NoSuchItem(index))?;
        let equipment = item
            .as_equipment()
            .ok_or_else(|| InventoryError::NotEquipment(item.name().to_string()))?;

        if equipment.is_broken() {
            return Err(InventoryError::Broken(equipment.name.clone()));
        }
        if self.level() < equipment.level_requirement {
            return Err(InventoryError::LevelTooLow {
                required: equipment.level_requirement,
                current: self.level(),
            });
        }
        if equipment.required_class.is_some_and(|c| c != self.class) {
            return Err(InventoryError::WrongClass {
                item: equipment.name.clone(),
                class: self.class,
            });
        }

        let Item::Equipment(equipment) = self.inventory.remove(index) else {
            return Err(InventoryError::NotEquipment(String::new()));
        };
        debug!(item = %equipment.name, "Equipped");
        let previous = self.slot_mut(equipment.slot()).replace(equipment);
        if let Some(previous) = previous {
            self.inventory.push(Item::Equipment(previous));
        }
        Ok(())
    }

    /// Move equipment from its slot back to the inventory.
    pub fn unequip(&mut self, slot: EquipmentSlot) -> Result<(), InventoryError> {
        let equipment = self
            .slot_mut(slot)
            .take()
            .ok_or(InventoryError::NothingEquipped(slot))?;
        debug!(item = %equipment.name, "Unequipped");
        self.inventory.push(Item::Equipment(equipment));
        Ok(())
    }

    /// Wear both equipped pieces by `amount`.
    ///
    /// Pieces that break are moved to the inventory; their names are returned.
    pub fn wear_equipment(&mut self, amount: u32) -> Vec<String> {
        let mut broken = Vec::new();
        for slot in [EquipmentSlot::Weapon, EquipmentSlot::Armor] {
            let Some(equipment) = self.slot_mut(slot).as_mut() else {
                continue;
            };
            equipment.reduce_durability(amount);
            if equipment.is_broken() {
                if let Some(equipment) = self.slot_mut(slot).take() {
                    warn!(item = %equipment.name, "Equipment broke");
                    broken.push(equipment.name.clone());
                    self.inventory.push(Item::Equipment(equipment));
                }
            }
        }
        broken
    }

    // ========================================================================
    // Consumables
    // ========================================================================

    /// Apply a potion effect, clamped to each pool's maximum.
    pub fn drink(&mut self, effect: PotionEffect) -> Restored {
        match effect {
            PotionEffect::Health(amount) => Restored {
                hp: self.character.heal(amount),
                ..Restored::default()
            },
            PotionEffect::Mana(amount) => Restored {
                mana: self.mana.restore(amount),
                ..Restored::default()
            },
            PotionEffect::Stamina(amount) => Restored {
                stamina: self.stamina.restore(amount),
                ..Restored::default()
            },
            PotionEffect::Universal { hp, mana, stamina } => Restored {
                hp: self.character.heal(hp),
                mana: self.mana.restore(mana),
                stamina: self.stamina.restore(stamina),
            },
        }
    }

    /// Drink the potion at inventory `index`.
    ///
    /// The potion is removed once its uses run out.
    pub fn use_potion(&mut self, index: usize) -> Result<(String, Restored), InventoryError> {
        let item = self
            .inventory
            .get_mut(index)
            .ok_or(InventoryError::NoSuchItem(index))?;
        let potion = match item {
            Item::Potion(potion) => potion,
            other => return Err(InventoryError::NotUsable(other.name().to_string())),
        };

        let name = potion.name.clone();
        let effect = potion
            .consume()
            .ok_or_else(|| InventoryError::NotUsable(name.clone()))?;
        if potion.is_empty() {
            self.inventory.remove(index);
        }

        let restored = self.drink(effect);
        debug!(potion = %name, ?restored, "Potion used");
        Ok((name, restored))
    }

    /// Use a potion or scroll outside battle.
    pub fn use_item(&mut self, index: usize) -> Result<ItemUse, InventoryError> {
        let item = self
            .inventory
            .get(index)
            .ok_or(InventoryError::NoSuchItem(index))?;

        match item {
            Item::Potion(_) => {
                let (name, restored) = self.use_potion(index)?;
                Ok(ItemUse::Potion { name, restored })
            }
            Item::Scroll(scroll) => {
                let effect = scroll.effect;
                self.inventory.remove(index);
                match effect {
                    ScrollEffect::ReturnToTown => {
                        self.location = TOWN.to_string();
                        Ok(ItemUse::ReturnedToTown)
                    }
                    ScrollEffect::Cleanse => Ok(ItemUse::Cleansed {
                        removed: status::cleanse(&mut self.character),
                    }),
                }
            }
            Item::Equipment(e) => Err(InventoryError::NotUsable(e.name.clone())),
        }
    }

    // ========================================================================
    // Shop transactions
    // ========================================================================

    pub fn spend_gold(&mut self, amount: u32) -> Result<(), InventoryError> {
        if amount > self.gold {
            return Err(InventoryError::NotEnoughGold {
                needed: amount,
                available: self.gold,
            });
        }
        self.gold -= amount;
        Ok(())
    }

    /// Buy an item at its listed price.
    pub fn buy(&mut self, item: Item) -> Result<(), InventoryError> {
        if item.price() > self.gold {
            return Err(InventoryError::NotEnoughGold {
                needed: item.price(),
                available: self.gold,
            });
        }
        if let Item::Equipment(equipment) = &item {
            if self.level() < equipment.level_requirement {
                return Err(InventoryError::LevelTooLow {
                    required: equipment.level_requirement,
                    current: self.level(),
                });
            }
            if equipment.required_class.is_some_and(|c| c != self.class) {
                return Err(InventoryError::WrongClass {
                    item: equipment.name.clone(),
                    class: self.class,
                });
            }
        }

        self.spend_gold(item.price())?;
        debug!(item = %item.name(), price = item.price(), "Bought");
        self.inventory.push(item);
        Ok(())
    }

    /// Sell the item at inventory `index`. Returns the gold received.
    pub fn sell(&mut self, index: usize) -> Result<u32, InventoryError> {
        let item = self
            .inventory
            .get(index)
            .ok_or(InventoryError::NoSuchItem(index))?;
        if !item.is_sellable() {
            return Err(InventoryError::NotSellable(item.name().to_string()));
        }

        let price = item.sell_price();
        let item = self.inventory.remove(index);
        self.gold += price;
        debug!(item = %item.name(), price, "Sold");
        Ok(price)
    }

    /// Repair a piece of equipment, charging its repair cost.
    pub fn repair(&mut self, target: RepairTarget) -> Result<u32, InventoryError> {
        let cost = {
            let equipment = self.repair_target(target)?;
            equipment.repair_cost()
        };
        self.spend_gold(cost)?;
        self.repair_target(target)?.repair();
        Ok(cost)
    }

    fn repair_target(&mut self, target: RepairTarget) -> Result<&mut Equipment, InventoryError> {
        match target {
            RepairTarget::Equipped(slot) => self
                .slot_mut(slot)
                .as_mut()
                .ok_or(InventoryError::NothingEquipped(slot)),
            RepairTarget::Inventory(index) => {
                let item = self
                    .inventory
                    .get_mut(index)
                    .ok_or(InventoryError::NoSuchItem(index))?;
                match item {
                    Item::Equipment(e) => Ok(e),
                    other => Err(InventoryError::NotEquipment(other.name().to_string())),
                }
            }
        }
    }

    // ========================================================================
    // Travel and rest
    // ========================================================================

    pub fn spend_stamina(&mut self, amount: i32) -> Result<(), InventoryError> {
        if self.stamina.current < amount {
            return Err(InventoryError::NotEnoughStamina {
                needed: amount,
                available: self.stamina.current,
            });
        }
        self.stamina.take(amount);
        Ok(())
    }

    pub fn is_unlocked(&self, location: &str) -> bool {
        self.unlocked_locations.iter().any(|l| l == location)
    }

    /// Unlock a location. Returns `false` if it was already unlocked.
    pub fn unlock_location(&mut self, location: &str) -> bool {
        if self.is_unlocked(location) {
            return false;
        }
        self.unlocked_locations.push(location.to_string());
        true
    }

    /// Move to `destination`, spending travel stamina.
    pub fn travel(&mut self, destination: &Location) -> Result<(), InventoryError> {
        if !self.is_unlocked(&destination.name) {
            return Err(InventoryError::LocationLocked(destination.name.clone()));
        }
        if !destination.suits(self.level()) {
            return Err(InventoryError::LocationUnsuitable {
                location: destination.name.clone(),
                level: self.level(),
            });
        }
        self.spend_stamina(TRAVEL_STAMINA_COST)?;
        self.location = destination.name.clone();
        debug!(to = %destination.name, "Travelled");
        Ok(())
    }

    /// Restore every resource, clear status effects and end the battle streak.
    pub fn rest(&mut self) {
        self.character.hp.refill();
        self.mana.refill();
        self.stamina.refill();
        status::cleanse(&mut self.character);
        self.consecutive_battles = 0;
    }

    /// Pay for a night at the inn, then rest.
    pub fn rest_at_inn(&mut self, price: u32) -> Result<(), InventoryError> {
        self.spend_gold(price)?;
        self.rest();
        Ok(())
    }

    /// Recover after a defeat: half hp, back in town.
    pub fn revive(&mut self) {
        let half = self.character.hp.maximum / 2;
        self.character.hp.set(half);
        self.location = TOWN.to_string();
    }
}
