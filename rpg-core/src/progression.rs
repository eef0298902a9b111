//! Experience, level-ups and stat-point allocation.

use crate::class_data::STAT_POINTS_PER_LEVEL;
use crate::player::Player;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgressionError {
    #[error("No stat points available")]
    NoStatPoints,
}

/// Stats a point can be spent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Attack,
    Defense,
    Agility,
    Intelligence,
    /// +5 max hp, also healing 5.
    Vitality,
}

/// Hp gained per point spent on [`Stat::Vitality`].
pub const VITALITY_HP: i32 = 5;

/// Battle-streak experience bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakBonus {
    /// The bonus applies whenever the streak counter is a positive multiple
    /// of this value.
    pub interval: u32,
    pub percent: u32,
}

impl Default for StreakBonus {
    fn default() -> Self {
        Self {
            interval: 5,
            percent: 10,
        }
    }
}

impl StreakBonus {
    pub fn applies(&self, consecutive_battles: u32) -> bool {
        self.interval > 0 && consecutive_battles > 0 && consecutive_battles % self.interval == 0
    }

    pub fn apply(&self, amount: u32) -> u32 {
        amount * (100 + self.percent) / 100
    }
}

/// Result of one experience award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceAward {
    /// Experience actually added, after any streak bonus.
    pub amount: u32,
    pub streak_bonus: bool,
    /// Each level reached, in order.
    pub levels_gained: Vec<u32>,
}

impl Player {
    /// Add experience, then level up as many times as it allows.
    ///
    /// The streak bonus is judged on the counter as it stands now; callers
    /// advance the counter afterwards.
    pub fn award_experience(&mut self, amount: u32, streak: &StreakBonus) -> ExperienceAward {
        let streak_bonus = streak.applies(self.consecutive_battles);
        let amount = if streak_bonus {
            streak.apply(amount)
        } else {
            amount
        };

        self.experience += amount;
        let mut levels_gained = Vec::new();
        while self.exp_to_next > 0 && self.experience >= self.exp_to_next {
            levels_gained.push(self.level_up());
        }

        ExperienceAward {
            amount,
            streak_bonus,
            levels_gained,
        }
    }

    /// Advance one level: spend the threshold, grow it by half, grant stat
    /// points and class growth, then refill every resource.
    fn level_up(&mut self) -> u32 {
        self.experience -= self.exp_to_next;
        self.exp_to_next = self.exp_to_next * 3 / 2;
        self.character.level += 1;
        self.stat_points += STAT_POINTS_PER_LEVEL;

        let growth = self.class.data().growth;
        self.character.hp.grow(growth.max_hp);
        self.mana.grow(growth.max_mana);
        self.stamina.grow(growth.max_stamina);
        self.character.base_attack += growth.attack;
        self.character.base_defense += growth.defense;
        self.character.agility += growth.agility;
        self.character.intelligence += growth.intelligence;

        self.character.hp.refill();
        self.mana.refill();
        self.stamina.refill();

        info!(player = %self.name(), level = self.level(), "Level up");
        self.level()
    }

    /// Spend one stat point.
    pub fn allocate_stat(&mut self, stat: Stat) -> Result<(), ProgressionError> {
        if self.stat_points == 0 {
            return Err(ProgressionError::NoStatPoints);
        }

        match stat {
            Stat::Attack => self.character.base_attack += 1,
            Stat::Defense => self.character.base_defense += 1,
            Stat::Agility => self.character.agility += 1,
            Stat::Intelligence => self.character.intelligence += 1,
            Stat::Vitality => {
                self.character.hp.grow(VITALITY_HP);
                self.character.heal(VITALITY_HP);
            }
        }
        self.stat_points -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::PlayerClass;

    #[test]
    fn test_two_level_ups_from_one_award() {
        let mut player = Player::new("Brom", PlayerClass::Warrior);
        player.experience = 95;

        let award = player.award_experience(250, &StreakBonus::default());
        assert_eq!(award.levels_gained, vec![2, 3]);
        assert_eq!(player.level(), 3);
        assert_eq!(player.exp_to_next, 225);
        assert_eq!(player.experience, 95);
        assert_eq!(player.stat_points, 6);
    }

    #[test]
    fn test_warrior_growth() {
        let mut player = Player::new("Brom", PlayerClass::Warrior);
        player.character.hp.set(1);
        player.award_experience(100, &StreakBonus::default());

        assert_eq!(player.character.hp.maximum, 135);
        assert_eq!(player.character.hp.current, 135);
        assert_eq!(player.mana.maximum, 35);
        assert_eq!(player.stamina.maximum, 88);
        assert_eq!(player.character.base_attack, 14);
        assert_eq!(player.character.base_defense, 11);
    }

    #[test]
    fn test_archer_and_mage_growth() {
        let mut archer = Player::new("Aria", PlayerClass::Archer);
        archer.award_experience(100, &StreakBonus::default());
        assert_eq!(archer.stamina.maximum, 113);
        assert_eq!(archer.character.agility, 14);

        let mut mage = Player::new("Lyra", PlayerClass::Mage);
        mage.award_experience(100, &StreakBonus::default());
        assert_eq!(mage.mana.maximum, 135);
        assert_eq!(mage.character.intelligence, 18);
    }

    #[test]
    fn test_streak_bonus_on_multiples_of_five() {
        let streak = StreakBonus::default();
        assert!(!streak.applies(0));
        assert!(!streak.applies(4));
        assert!(streak.applies(5));
        assert!(streak.applies(10));

        let mut player = Player::new("Brom", PlayerClass::Warrior);
        player.consecutive_battles = 5;
        let award = player.award_experience(15, &streak);
        assert!(award.streak_bonus);
        assert_eq!(award.amount, 16);
        assert_eq!(player.experience, 16);
    }

    #[test]
    fn test_allocate_stat() {
        let mut player = Player::new("Brom", PlayerClass::Warrior);
        assert_eq!(player.allocate_stat(Stat::Attack), Err(ProgressionError::NoStatPoints));

        player.stat_points = 2;
        player.character.hp.set(100);
        player.allocate_stat(Stat::Vitality).expect("vitality");
        assert_eq!(player.character.hp.maximum, 125);
        assert_eq!(player.character.hp.current, 105);

        player.allocate_stat(Stat::Agility).expect("agility");
        assert_eq!(player.character.agility, 6);
        assert_eq!(player.stat_points, 0);
        assert!(player.allocate_stat(Stat::Defense).is_err());
        assert_eq!(player.character.base_defense, 10);
    }
}
