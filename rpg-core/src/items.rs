//! Items and the equipment subsystem.
//!
//! Items form a closed union: equipment (weapon or armor), potions and
//! scrolls. Shared capabilities such as price, sell price and level
//! requirement are reached by matching on [`Item`].

use crate::world::PlayerClass;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Percent added to attack or defense by each enhancement.
pub const ENHANCE_PERCENT: i32 = 10;

// ============================================================================
// Item Union
// ============================================================================

/// Anything that can sit in an inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Equipment(Equipment),
    Potion(Potion),
    Scroll(Scroll),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Equipment(e) => &e.name,
            Item::Potion(p) => &p.name,
            Item::Scroll(s) => &s.name,
        }
    }

    pub fn price(&self) -> u32 {
        match self {
            Item::Equipment(e) => e.price,
            Item::Potion(p) => p.price,
            Item::Scroll(s) => s.price,
        }
    }

    pub fn level_requirement(&self) -> u32 {
        match self {
            Item::Equipment(e) => e.level_requirement,
            Item::Potion(p) => p.level_requirement,
            Item::Scroll(s) => s.level_requirement,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Item::Equipment(e) => &e.description,
            Item::Potion(p) => &p.description,
            Item::Scroll(s) => &s.description,
        }
    }

    /// Gold a shop pays for this item.
    pub fn sell_price(&self) -> u32 {
        match self {
            Item::Equipment(e) => e.sell_price(),
            Item::Potion(p) => p.sell_price(),
            Item::Scroll(s) => s.sell_price(),
        }
    }

    /// Generated loot carries no price and cannot be sold.
    pub fn is_sellable(&self) -> bool {
        self.price() > 0
    }

    pub fn as_equipment(&self) -> Option<&Equipment> {
        match self {
            Item::Equipment(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_equipment_mut(&mut self) -> Option<&mut Equipment> {
        match self {
            Item::Equipment(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_potion(&self) -> bool {
        matches!(self, Item::Potion(_))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Equipment(e) => write!(f, "{e}"),
            Item::Potion(p) => write!(f, "{} ({} uses)", p.name, p.uses),
            Item::Scroll(s) => write!(f, "{}", s.name),
        }
    }
}

// ============================================================================
// Equipment
// ============================================================================

/// Which slot a piece of equipment occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Weapon,
    Armor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub attack: i32,
    pub critical_chance: f64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmorStats {
    pub defense: i32,
    pub evasion: f64,
    pub damage_reduction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EquipmentKind {
    Weapon(WeaponStats),
    Armor(ArmorStats),
}

/// A weapon or armor piece with durability and enhancement.
///
/// Durability stays within `[0, max_durability]`; zero means broken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub name: String,
    pub price: u32,
    pub level_requirement: u32,
    pub required_class: Option<PlayerClass>,
    pub durability: u32,
    pub max_durability: u32,
    pub enhancement_level: u32,
    #[serde(default)]
    pub description: String,
    pub kind: EquipmentKind,
}

impl Equipment {
    pub fn weapon(
        name: impl Into<String>,
        price: u32,
        attack: i32,
        level_requirement: u32,
        durability: u32,
        critical_chance: f64,
        accuracy: f64,
    ) -> Self {
        Self::with_kind(
            name,
            price,
            level_requirement,
            durability,
            EquipmentKind::Weapon(WeaponStats {
                attack,
                critical_chance,
                accuracy,
            }),
        )
    }

    pub fn armor(
        name: impl Into<String>,
        price: u32,
        defense: i32,
        level_requirement: u32,
        durability: u32,
        evasion: f64,
        damage_reduction: f64,
    ) -> Self {
        Self::with_kind(
            name,
            price,
            level_requirement,
            durability,
            EquipmentKind::Armor(ArmorStats {
                defense,
                evasion,
                damage_reduction,
            }),
        )
    }

    fn with_kind(
        name: impl Into<String>,
        price: u32,
        level_requirement: u32,
        durability: u32,
        kind: EquipmentKind,
    ) -> Self {
        Self {
            name: name.into(),
            price,
            level_requirement,
            required_class: None,
            durability,
            max_durability: durability,
            enhancement_level: 0,
            description: String::new(),
            kind,
        }
    }

    pub fn for_class(mut self, class: PlayerClass) -> Self {
        self.required_class = Some(class);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn slot(&self) -> EquipmentSlot {
        match self.kind {
            EquipmentKind::Weapon(_) => EquipmentSlot::Weapon,
            EquipmentKind::Armor(_) => EquipmentSlot::Armor,
        }
    }

    /// Attack bonus; zero for armor.
    pub fn attack(&self) -> i32 {
        match self.kind {
            EquipmentKind::Weapon(w) => w.attack,
            EquipmentKind::Armor(_) => 0,
        }
    }

    /// Defense bonus; zero for weapons.
    pub fn defense(&self) -> i32 {
        match self.kind {
            EquipmentKind::Weapon(_) => 0,
            EquipmentKind::Armor(a) => a.defense,
        }
    }

    pub fn weapon_stats(&self) -> Option<&WeaponStats> {
        match &self.kind {
            EquipmentKind::Weapon(w) => Some(w),
            EquipmentKind::Armor(_) => None,
        }
    }

    pub fn armor_stats(&self) -> Option<&ArmorStats> {
        match &self.kind {
            EquipmentKind::Weapon(_) => None,
            EquipmentKind::Armor(a) => Some(a),
        }
    }

    pub fn reduce_durability(&mut self, amount: u32) {
        self.durability = self.durability.saturating_sub(amount);
    }

    pub fn is_broken(&self) -> bool {
        self.durability == 0
    }

    pub fn repair(&mut self) {
        self.durability = self.max_durability;
    }

    fn wear_fraction(&self) -> f64 {
        if self.max_durability == 0 {
            return 0.0;
        }
        f64::from(self.durability) / f64::from(self.max_durability)
    }

    /// `price * 0.1 * (1 - durability/max)`; free when undamaged.
    pub fn repair_cost(&self) -> u32 {
        (f64::from(self.price) * 0.1 * (1.0 - self.wear_fraction())) as u32
    }

    /// `price * 0.7 * durability/max`; a broken item sells for nothing.
    pub fn sell_price(&self) -> u32 {
        (f64::from(self.price) * 0.7 * self.wear_fraction()) as u32
    }

    /// Raise the enhancement level and the primary stat by 10%.
    ///
    /// Each call works from the current (already enhanced) value and
    /// truncates, so repeated enhancements compound.
    pub fn enhance(&mut self) {
        self.enhancement_level += 1;
        match &mut self.kind {
            EquipmentKind::Weapon(w) => w.attack += w.attack * ENHANCE_PERCENT / 100,
            EquipmentKind::Armor(a) => a.defense += a.defense * ENHANCE_PERCENT / 100,
        }
    }

    /// Whether `class` at `level` satisfies this item's requirements.
    pub fn usable_by(&self, class: PlayerClass, level: u32) -> bool {
        level >= self.level_requirement && self.required_class.map_or(true, |c| c == class)
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.enhancement_level > 0 {
            write!(f, " +{}", self.enhancement_level)?;
        }
        match self.kind {
            EquipmentKind::Weapon(w) => write!(f, " (atk {}", w.attack)?,
            EquipmentKind::Armor(a) => write!(f, " (def {}", a.defense)?,
        }
        write!(f, ", {}/{})", self.durability, self.max_durability)?;
        if self.is_broken() {
            write!(f, " [broken]")?;
        }
        Ok(())
    }
}

// ============================================================================
// Potions
// ============================================================================

/// What drinking a potion restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PotionEffect {
    Health(i32),
    Mana(i32),
    Stamina(i32),
    Universal { hp: i32, mana: i32, stamina: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Potion {
    pub name: String,
    pub price: u32,
    pub level_requirement: u32,
    pub uses: u32,
    pub effect: PotionEffect,
    #[serde(default)]
    pub description: String,
}

impl Potion {
    pub fn new(name: impl Into<String>, price: u32, effect: PotionEffect) -> Self {
        Self {
            name: name.into(),
            price,
            level_requirement: 1,
            uses: 1,
            effect,
            description: String::new(),
        }
    }

    pub fn health(name: impl Into<String>, price: u32, amount: i32) -> Self {
        Self::new(name, price, PotionEffect::Health(amount))
    }

    pub fn mana(name: impl Into<String>, price: u32, amount: i32) -> Self {
        Self::new(name, price, PotionEffect::Mana(amount))
    }

    pub fn stamina(name: impl Into<String>, price: u32, amount: i32) -> Self {
        Self::new(name, price, PotionEffect::Stamina(amount))
    }

    pub fn universal(name: impl Into<String>, price: u32, hp: i32, mana: i32, stamina: i32) -> Self {
        Self::new(name, price, PotionEffect::Universal { hp, mana, stamina })
    }

    pub fn with_level_requirement(mut self, level: u32) -> Self {
        self.level_requirement = level;
        self
    }

    pub fn with_uses(mut self, uses: u32) -> Self {
        self.uses = uses;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Spend one use. Returns the effect to apply, or `None` when empty.
    pub fn consume(&mut self) -> Option<PotionEffect> {
        if self.uses == 0 {
            return None;
        }
        self.uses -= 1;
        Some(self.effect)
    }

    pub fn is_empty(&self) -> bool {
        self.uses == 0
    }

    /// `price * 0.5 * uses/(uses+1)`
    pub fn sell_price(&self) -> u32 {
        let uses = f64::from(self.uses);
        (f64::from(self.price) * 0.5 * (uses / (uses + 1.0))) as u32
    }
}

// ============================================================================
// Scrolls
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollEffect {
    ReturnToTown,
    Cleanse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scroll {
    pub name: String,
    pub price: u32,
    pub level_requirement: u32,
    pub effect: ScrollEffect,
    #[serde(default)]
    pub description: String,
}

impl Scroll {
    pub fn new(name: impl Into<String>, price: u32, effect: ScrollEffect) -> Self {
        Self {
            name: name.into(),
            price,
            level_requirement: 1,
            effect,
            description: String::new(),
        }
    }

    pub fn with_level_requirement(mut self, level: u32) -> Self {
        self.level_requirement = level;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn sell_price(&self) -> u32 {
        (f64::from(self.price) * 0.7) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_sword() -> Equipment {
        Equipment::weapon("Long Sword", 200, 10, 1, 100, 0.1, 0.85)
    }

    #[test]
    fn test_durability_clamps_at_zero() {
        let mut sword = long_sword();
        sword.reduce_durability(30);
        assert_eq!(sword.durability, 70);
        sword.reduce_durability(500);
        assert_eq!(sword.durability, 0);
        assert!(sword.is_broken());

        sword.repair();
        assert_eq!(sword.durability, sword.max_durability);
        assert!(!sword.is_broken());
    }

    #[test]
    fn test_enhance_compounds() {
        let mut sword = long_sword();
        sword.enhance();
        assert_eq!(sword.attack(), 11);
        sword.enhance();
        // 11 * 1.1 = 12.1 -> 12
        assert_eq!(sword.attack(), 12);
        assert_eq!(sword.enhancement_level, 2);

        let mut plate = Equipment::armor("Plate Armor", 600, 15, 5, 150, 0.01, 0.25);
        plate.enhance();
        plate.enhance();
        // 15 -> 16 -> 17
        assert_eq!(plate.defense(), 17);
        assert_eq!(plate.attack(), 0);
    }

    #[test]
    fn test_sell_price_scales_with_durability() {
        let mut sword = long_sword();
        assert_eq!(sword.sell_price(), 140);
        sword.reduce_durability(50);
        assert_eq!(sword.sell_price(), 70);
        sword.reduce_durability(50);
        assert_eq!(sword.sell_price(), 0);
    }

    #[test]
    fn test_repair_cost() {
        let mut sword = long_sword();
        assert_eq!(sword.repair_cost(), 0);
        sword.reduce_durability(50);
        assert_eq!(sword.repair_cost(), 10);
        sword.reduce_durability(50);
        assert_eq!(sword.repair_cost(), 20);
    }

    #[test]
    fn test_usable_by() {
        let bow = Equipment::weapon("Long Bow", 320, 14, 3, 110, 0.15, 0.8).for_class(PlayerClass::Archer);
        assert!(bow.usable_by(PlayerClass::Archer, 3));
        assert!(!bow.usable_by(PlayerClass::Archer, 2));
        assert!(!bow.usable_by(PlayerClass::Mage, 10));
        assert!(long_sword().usable_by(PlayerClass::Mage, 1));
    }

    #[test]
    fn test_potion_consume_and_sell_price() {
        let mut potion = Potion::health("Lesser Health Potion", 50, 30);
        assert_eq!(potion.sell_price(), 12);
        assert_eq!(potion.consume(), Some(PotionEffect::Health(30)));
        assert!(potion.is_empty());
        assert_eq!(potion.consume(), None);
        assert_eq!(potion.sell_price(), 0);
    }

    #[test]
    fn test_item_capabilities() {
        let scroll = Item::Scroll(Scroll::new("Return Scroll", 200, ScrollEffect::ReturnToTown));
        assert_eq!(scroll.sell_price(), 140);
        assert!(scroll.is_sellable());

        let loot = Item::Potion(Potion::mana("Mana Potion", 0, 30));
        assert!(!loot.is_sellable());
        assert!(loot.is_potion());
        assert!(loot.as_equipment().is_none());
    }
}
