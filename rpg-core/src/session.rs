//! GameSession - the primary public API for gameplay.
//!
//! A session owns the player, the random number generator, the game day
//! and the battle in progress, and routes every front-end request to the
//! engine modules. It is the only place that decides when to hit disk.

use crate::catalog::{self, ShopKind, TOWN};
use crate::combat::{ActionChoice, ActionSource, Battle, BattleEvent, CombatConfig, CombatError};
use crate::dice::{self, GameRng};
use crate::exploration::{self, Discovery};
use crate::persist::{self, PersistError, SavedGame};
use crate::player::{InventoryError, Player};
use crate::progression::{ProgressionError, Stat};
use crate::quests::{QuestError, QuestReward};
use crate::world::{Location, Monster, PlayerClass};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors from GameSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Combat error: {0}")]
    Combat(#[from] CombatError),

    #[error("{0}")]
    Inventory(#[from] InventoryError),

    #[error("{0}")]
    Quest(#[from] QuestError),

    #[error("{0}")]
    Progression(#[from] ProgressionError),

    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("No stock in slot {0}")]
    NoSuchStock(usize),

    #[error("No battle in progress")]
    NoBattle,

    #[error("A battle is in progress")]
    BattleInProgress,

    #[error("The player has been defeated and must be revived")]
    PlayerDefeated,
}

/// Configuration for creating a new game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub player_name: String,

    pub class: PlayerClass,

    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,

    pub starting_location: String,

    /// Auto-save after this many explorations. Zero disables auto-save.
    pub autosave_interval: u32,

    /// Gold charged for a night at the inn.
    pub inn_price: u32,

    /// Where auto-saves are written. `None` disables auto-save.
    pub auto_save_dir: Option<PathBuf>,

    pub combat: CombatConfig,
}

impl SessionConfig {
    pub fn new(player_name: impl Into<String>, class: PlayerClass) -> Self {
        Self {
            player_name: player_name.into(),
            class,
            seed: None,
            starting_location: TOWN.to_string(),
            autosave_interval: 5,
            inn_price: 50,
            auto_save_dir: None,
            combat: CombatConfig::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_starting_location(mut self, location: impl Into<String>) -> Self {
        self.starting_location = location.into();
        self
    }

    pub fn with_autosave_interval(mut self, interval: u32) -> Self {
        self.autosave_interval = interval;
        self
    }

    pub fn with_inn_price(mut self, price: u32) -> Self {
        self.inn_price = price;
        self
    }

    pub fn with_auto_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.auto_save_dir = Some(dir.into());
        self
    }

    pub fn with_combat(mut self, combat: CombatConfig) -> Self {
        self.combat = combat;
        self
    }

    fn rng(&self) -> GameRng {
        match self.seed {
            Some(seed) => dice::seeded(seed),
            None => dice::from_entropy(),
        }
    }
}

/// Time of day, cycling with each rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Day,
    Night,
}

impl TimeOfDay {
    pub fn from_day(day: u32) -> Self {
        match day % 3 {
            0 => TimeOfDay::Morning,
            1 => TimeOfDay::Day,
            _ => TimeOfDay::Night,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDay::Morning => write!(f, "Morning"),
            TimeOfDay::Day => write!(f, "Day"),
            TimeOfDay::Night => write!(f, "Night"),
        }
    }
}

/// What an exploration or a journey turned up.
#[derive(Debug, Clone, PartialEq)]
pub struct Outing {
    pub discovery: Discovery,
    /// Opening events of a battle started by an encounter.
    pub events: Vec<BattleEvent>,
    /// Path written by an auto-save triggered by this outing.
    pub auto_saved: Option<PathBuf>,
}

/// A single-player game session.
pub struct GameSession {
    player: Player,
    rng: GameRng,
    game_day: u32,
    config: SessionConfig,
    battle: Option<Battle>,
    explorations: u32,
}

impl GameSession {
    /// Create a fresh character at the configured starting location.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let start = catalog::location(&config.starting_location)
            .ok_or_else(|| SessionError::UnknownLocation(config.starting_location.clone()))?;

        let mut player = Player::new(config.player_name.clone(), config.class);
        player.location = start.name.clone();
        player.unlock_location(&start.name);
        info!(player = %player.name(), class = %player.class, "Session started");

        Ok(Self {
            player,
            rng: config.rng(),
            game_day: 0,
            config,
            battle: None,
            explorations: 0,
        })
    }

    /// Resume from a save file. The config supplies seed and rules; the
    /// player and day come from the save.
    pub async fn load(path: impl AsRef<Path>, config: SessionConfig) -> Result<Self, SessionError> {
        let saved = SavedGame::load_json(path).await?;
        let mut player = saved.player;
        player.location = saved.current_location;

        Ok(Self {
            player,
            rng: config.rng(),
            game_day: saved.game_day,
            config,
            battle: None,
            explorations: 0,
        })
    }

    /// Save the current game. In-memory state is never touched, so a failed
    /// save leaves the session playable.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        SavedGame::new(self.player.clone(), self.game_day)
            .save_json(path)
            .await?;
        Ok(())
    }

    /// Save to the auto-save slot, if an auto-save directory is configured.
    pub async fn auto_save(&self) -> Result<Option<PathBuf>, SessionError> {
        let Some(dir) = &self.config.auto_save_dir else {
            return Ok(None);
        };
        let path = persist::auto_save_path(dir, self.player.name());
        self.save(&path).await?;
        Ok(Some(path))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Direct access bypasses every rule check.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn game_day(&self) -> u32 {
        self.game_day
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_day(self.game_day)
    }

    pub fn battle(&self) -> Option<&Battle> {
        self.battle.as_ref()
    }

    pub fn in_battle(&self) -> bool {
        self.battle.is_some()
    }

    pub fn explorations(&self) -> u32 {
        self.explorations
    }

    pub fn current_location(&self) -> Result<&'static Location, SessionError> {
        catalog::location(&self.player.location)
            .ok_or_else(|| SessionError::UnknownLocation(self.player.location.clone()))
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.battle.is_some() {
            return Err(SessionError::BattleInProgress);
        }
        if !self.player.is_alive() {
            return Err(SessionError::PlayerDefeated);
        }
        Ok(())
    }

    // ========================================================================
    // Exploration and travel
    // ========================================================================

    /// Explore the current location. An encounter starts a battle.
    pub async fn explore(&mut self) -> Result<Outing, SessionError> {
        self.ensure_idle()?;
        let location = self.current_location()?;
        let discovery = exploration::explore(
            &mut self.player,
            location,
            &self.config.combat.streak,
            &mut self.rng,
        )?;
        self.explorations += 1;

        let events = self.begin_encounter(&discovery, location)?;

        let interval = self.config.autosave_interval;
        let auto_saved = if interval > 0 && self.explorations % interval == 0 {
            match self.auto_save().await {
                Ok(path) => path,
                Err(e) => {
                    warn!(error = %e, "Auto-save failed");
                    None
                }
            }
        } else {
            None
        };

        Ok(Outing {
            discovery,
            events,
            auto_saved,
        })
    }

    /// Travel to a named location and roll for an arrival event.
    pub fn travel(&mut self, destination: &str) -> Result<Outing, SessionError> {
        self.ensure_idle()?;
        let location = catalog::location(destination)
            .ok_or_else(|| SessionError::UnknownLocation(destination.to_string()))?;
        self.player.travel(location)?;
        info!(to = %location.name, "Arrived");

        let discovery = exploration::travel_event(
            &mut self.player,
            location,
            &self.config.combat.streak,
            &mut self.rng,
        );
        let events = self.begin_encounter(&discovery, location)?;
        Ok(Outing {
            discovery,
            events,
            auto_saved: None,
        })
    }

    fn begin_encounter(
        &mut self,
        discovery: &Discovery,
        location: &Location,
    ) -> Result<Vec<BattleEvent>, SessionError> {
        match discovery {
            Discovery::Encounter(monster) => self.start_battle_at(monster.clone(), location),
            _ => Ok(Vec::new()),
        }
    }

    // ========================================================================
    // Battle
    // ========================================================================

    /// Start a battle against `monster` at the current location.
    pub fn start_battle(&mut self, monster: Monster) -> Result<Vec<BattleEvent>, SessionError> {
        self.ensure_idle()?;
        let location = self.current_location()?;
        self.start_battle_at(monster, location)
    }

    fn start_battle_at(
        &mut self,
        monster: Monster,
        location: &Location,
    ) -> Result<Vec<BattleEvent>, SessionError> {
        let mut battle = Battle::new(monster, location.kind, self.config.combat.clone());
        let events = battle.start(&mut self.player, &mut self.rng)?;
        if !battle.is_over() {
            self.battle = Some(battle);
        }
        Ok(events)
    }

    /// Resolve the player's action in the current battle. The battle is
    /// dropped once it ends.
    pub fn submit_action(&mut self, choice: ActionChoice) -> Result<Vec<BattleEvent>, SessionError> {
        let battle = self.battle.as_mut().ok_or(SessionError::NoBattle)?;
        let events = battle.submit(&mut self.player, choice, &mut self.rng)?;
        if battle.is_over() {
            self.battle = None;
        }
        Ok(events)
    }

    /// Play the current battle to the end, asking `source` for every choice.
    pub fn fight<S: ActionSource>(&mut self, source: &mut S) -> Result<Vec<BattleEvent>, SessionError> {
        let mut battle = self.battle.take().ok_or(SessionError::NoBattle)?;
        let mut events = Vec::new();
        while !battle.is_over() {
            let choice = source.choose(&self.player, &battle);
            events.extend(battle.submit(&mut self.player, choice, &mut self.rng)?);
        }
        Ok(events)
    }

    // ========================================================================
    // Rest and recovery
    // ========================================================================

    /// Rest in the field: full recovery and a new day.
    pub fn rest(&mut self) -> Result<TimeOfDay, SessionError> {
        self.ensure_idle()?;
        self.player.rest();
        Ok(self.advance_day())
    }

    /// Rest at the inn for the configured price.
    pub fn rest_at_inn(&mut self) -> Result<TimeOfDay, SessionError> {
        self.ensure_idle()?;
        self.player.rest_at_inn(self.config.inn_price)?;
        Ok(self.advance_day())
    }

    fn advance_day(&mut self) -> TimeOfDay {
        self.game_day += 1;
        info!(day = self.game_day, time = %self.time_of_day(), "Rested");
        self.time_of_day()
    }

    /// Recover from a defeat.
    pub fn revive(&mut self) {
        self.battle = None;
        self.player.revive();
        info!(player = %self.player.name(), "Revived in town");
    }

    // ========================================================================
    // Town services
    // ========================================================================

    /// Buy the item in `slot` of a shop's stock as offered to this player.
    pub fn buy(&mut self, shop: ShopKind, slot: usize) -> Result<(), SessionError> {
        self.ensure_idle()?;
        let item = catalog::stock_for(shop, self.player.class)
            .into_iter()
            .nth(slot)
            .ok_or(SessionError::NoSuchStock(slot))?;
        self.player.buy(item)?;
        Ok(())
    }

    pub fn sell(&mut self, index: usize) -> Result<u32, SessionError> {
        self.ensure_idle()?;
        Ok(self.player.sell(index)?)
    }

    /// Accept a quest from the board by title.
    pub fn accept_quest(&mut self, title: &str) -> Result<(), SessionError> {
        let quest = catalog::quest(title).ok_or_else(|| QuestError::NotFound(title.to_string()))?;
        self.player.accept_quest(quest)?;
        Ok(())
    }

    pub fn claim_quest(&mut self, title: &str) -> Result<QuestReward, SessionError> {
        let streak = self.config.combat.streak;
        Ok(self.player.claim_quest(title, &streak)?)
    }

    pub fn allocate_stat(&mut self, stat: Stat) -> Result<(), SessionError> {
        Ok(self.player.allocate_stat(stat)?)
    }
}
