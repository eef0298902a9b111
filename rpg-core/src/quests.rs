//! Quest records and the kill tracker.
//!
//! Completion and reward are separate steps: a kill can complete a quest,
//! but rewards are only issued by [`Player::claim_quest`].

use crate::items::Item;
use crate::player::Player;
use crate::progression::{ExperienceAward, StreakBonus};
use crate::world::{LocationType, Monster, MonsterType};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Fame granted per level of a claimed quest's requirement.
pub const FAME_PER_LEVEL: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestError {
    #[error("Requires level {required} (currently {current})")]
    LevelTooLow { required: u32, current: u32 },

    #[error("Quest '{0}' was already taken")]
    AlreadyTaken(String),

    #[error("No active quest named '{0}'")]
    NotFound(String),

    #[error("Quest '{0}' is not completed yet")]
    NotCompleted(String),
}

/// Unique identifier for quests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestId(pub Uuid);

impl QuestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QuestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which defeated monsters count toward a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestPredicate {
    NameContains(String),
    MonsterType(MonsterType),
    /// Any monster defeated at a location of this type.
    LocationType(LocationType),
    AnyOf(Vec<QuestPredicate>),
}

impl QuestPredicate {
    /// Evaluate against a monster defeated at a location of type `location`.
    ///
    /// An empty `AnyOf` never matches.
    pub fn matches(&self, monster: &Monster, location: LocationType) -> bool {
        match self {
            QuestPredicate::NameContains(needle) => monster.name().contains(needle.as_str()),
            QuestPredicate::MonsterType(kind) => monster.kind == *kind,
            QuestPredicate::LocationType(kind) => location == *kind,
            QuestPredicate::AnyOf(predicates) => {
                predicates.iter().any(|p| p.matches(monster, location))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub title: String,
    pub description: String,
    pub predicate: QuestPredicate,
    pub required_progress: u32,
    pub current_progress: u32,
    pub level_requirement: u32,
    pub exp_reward: u32,
    pub gold_reward: u32,
    pub reward_item: Option<Item>,
    completed: bool,
}

impl Quest {
    pub fn new(
        title: impl Into<String>,
        predicate: QuestPredicate,
        required_progress: u32,
        exp_reward: u32,
        gold_reward: u32,
    ) -> Self {
        Self {
            id: QuestId::new(),
            title: title.into(),
            description: String::new(),
            predicate,
            required_progress,
            current_progress: 0,
            level_requirement: 1,
            exp_reward,
            gold_reward,
            reward_item: None,
            completed: required_progress == 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_level_requirement(mut self, level: u32) -> Self {
        self.level_requirement = level;
        self
    }

    pub fn with_reward_item(mut self, item: Item) -> Self {
        self.reward_item = Some(item);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Count a kill if the quest is open and the predicate matches.
    ///
    /// Progress rises by at most one per call and never past the
    /// requirement. Returns whether progress was made.
    pub fn record_kill(&mut self, monster: &Monster, location: LocationType) -> bool {
        if self.completed || !self.predicate.matches(monster, location) {
            return false;
        }
        self.current_progress += 1;
        if self.current_progress >= self.required_progress {
            self.completed = true;
        }
        true
    }
}

/// Progress reported for one quest after a kill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestProgress {
    pub title: String,
    pub progress: u32,
    pub required: u32,
    pub completed: bool,
}

/// Forward a defeated monster to every open quest.
pub fn track_kill(quests: &mut [Quest], monster: &Monster, location: LocationType) -> Vec<QuestProgress> {
    let mut updates = Vec::new();
    for quest in quests.iter_mut() {
        if quest.record_kill(monster, location) {
            debug!(quest = %quest.title, progress = quest.current_progress, "Quest progressed");
            if quest.is_completed() {
                info!(quest = %quest.title, "Quest completed");
            }
            updates.push(QuestProgress {
                title: quest.title.clone(),
                progress: quest.current_progress,
                required: quest.required_progress,
                completed: quest.is_completed(),
            });
        }
    }
    updates
}

/// Rewards issued by a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestReward {
    pub title: String,
    pub experience: ExperienceAward,
    pub gold: u32,
    pub item: Option<Item>,
    pub fame: u32,
}

impl Player {
    fn has_quest(&self, title: &str) -> bool {
        self.active_quests
            .iter()
            .chain(self.completed_quests.iter())
            .any(|q| q.title == title)
    }

    /// Take on a quest. Refused below its level or if it was taken before.
    pub fn accept_quest(&mut self, quest: Quest) -> Result<(), QuestError> {
        if self.level() < quest.level_requirement {
            return Err(QuestError::LevelTooLow {
                required: quest.level_requirement,
                current: self.level(),
            });
        }
        if self.has_quest(&quest.title) {
            return Err(QuestError::AlreadyTaken(quest.title));
        }
        info!(quest = %quest.title, "Quest accepted");
        self.active_quests.push(quest);
        Ok(())
    }

    /// Claim the rewards of a completed active quest and archive it.
    pub fn claim_quest(&mut self, title: &str, streak: &StreakBonus) -> Result<QuestReward, QuestError> {
        let index = self
            .active_quests
            .iter()
            .position(|q| q.title == title)
            .ok_or_else(|| QuestError::NotFound(title.to_string()))?;
        if !self.active_quests[index].is_completed() {
            return Err(QuestError::NotCompleted(title.to_string()));
        }

        let mut quest = self.active_quests.remove(index);
        let experience = self.award_experience(quest.exp_reward, streak);
        self.gold += quest.gold_reward;
        let item = quest.reward_item.take();
        if let Some(item) = &item {
            self.add_item(item.clone());
        }
        let fame = quest.level_requirement * FAME_PER_LEVEL;
        self.fame += fame;

        info!(quest = %quest.title, gold = quest.gold_reward, "Quest rewards claimed");
        let reward = QuestReward {
            title: quest.title.clone(),
            experience,
            gold: quest.gold_reward,
            item,
            fame,
        };
        self.completed_quests.push(quest);
        Ok(reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{MonsterTemplate, PlayerClass};

    fn monster(name: &str, kind: MonsterType) -> Monster {
        Monster::from_template(&MonsterTemplate::new(name, 40, 8, 4, 15, 1, kind))
    }

    #[test]
    fn test_predicates() {
        let goblin = monster("Goblin Grunt", MonsterType::Normal);
        let wolf = monster("Venom Wolf", MonsterType::Beast);

        let by_name = QuestPredicate::NameContains("Goblin".into());
        assert!(by_name.matches(&goblin, LocationType::Town));
        assert!(!by_name.matches(&wolf, LocationType::Town));

        let by_type = QuestPredicate::MonsterType(MonsterType::Beast);
        assert!(by_type.matches(&wolf, LocationType::Lake));

        let by_place = QuestPredicate::LocationType(LocationType::Forest);
        assert!(by_place.matches(&wolf, LocationType::Forest));
        assert!(!by_place.matches(&wolf, LocationType::Mountain));

        assert!(!QuestPredicate::AnyOf(vec![]).matches(&goblin, LocationType::Forest));
    }

    #[test]
    fn test_multi_clause_match_counts_once() {
        let goblin = monster("Goblin Grunt", MonsterType::Normal);
        let mut quest = Quest::new(
            "Forest Sweep",
            QuestPredicate::AnyOf(vec![
                QuestPredicate::NameContains("Goblin".into()),
                QuestPredicate::LocationType(LocationType::Forest),
            ]),
            3,
            10,
            10,
        );
        assert!(quest.record_kill(&goblin, LocationType::Forest));
        assert_eq!(quest.current_progress, 1);
    }

    #[test]
    fn test_progress_stops_at_completion() {
        let goblin = monster("Goblin Grunt", MonsterType::Normal);
        let mut quests = vec![Quest::new(
            "First Steps",
            QuestPredicate::NameContains("Goblin".into()),
            2,
            50,
            100,
        )];

        track_kill(&mut quests, &goblin, LocationType::Forest);
        let updates = track_kill(&mut quests, &goblin, LocationType::Forest);
        assert_eq!(updates.len(), 1);
        assert!(updates[0].completed);

        assert!(track_kill(&mut quests, &goblin, LocationType::Forest).is_empty());
        assert_eq!(quests[0].current_progress, 2);
        assert!(quests[0].is_completed());
    }

    #[test]
    fn test_accept_and_claim() {
        let mut player = Player::new("Brom", PlayerClass::Warrior);
        let quest = Quest::new("First Steps", QuestPredicate::NameContains("Goblin".into()), 1, 50, 100);

        player.accept_quest(quest.clone()).expect("accept");
        assert_eq!(
            player.accept_quest(quest),
            Err(QuestError::AlreadyTaken("First Steps".into()))
        );
        assert_eq!(
            player.claim_quest("First Steps", &StreakBonus::default()).map(|r| r.gold),
            Err(QuestError::NotCompleted("First Steps".into()))
        );

        let goblin = monster("Goblin Fighter", MonsterType::Normal);
        track_kill(&mut player.active_quests, &goblin, LocationType::Forest);

        let reward = player
            .claim_quest("First Steps", &StreakBonus::default())
            .expect("claim");
        assert_eq!(reward.experience.amount, 50);
        assert_eq!(reward.fame, 10);
        assert_eq!(player.gold, 200);
        assert_eq!(player.experience, 50);
        assert!(player.active_quests.is_empty());
        assert_eq!(player.completed_quests.len(), 1);

        assert_eq!(
            player.claim_quest("First Steps", &StreakBonus::default()).map(|r| r.gold),
            Err(QuestError::NotFound("First Steps".into()))
        );
    }

    #[test]
    fn test_accept_requires_level() {
        let mut player = Player::new("Brom", PlayerClass::Warrior);
        let quest = Quest::new("Dragon Slayer", QuestPredicate::MonsterType(MonsterType::Dragon), 1, 500, 1000)
            .with_level_requirement(5);
        assert_eq!(
            player.accept_quest(quest),
            Err(QuestError::LevelTooLow {
                required: 5,
                current: 1
            })
        );
    }
}
