//! Turn-based combat and progression rules engine.
//!
//! This crate provides:
//! - A seedable battle state machine emitting structured `BattleEvent`s
//! - Equipment durability, enhancement and shop transactions
//! - Status effects, experience and level growth, quest tracking
//! - Exploration, static game data and JSON save files
//!
//! # Quick Start
//!
//! ```no_run
//! use rpg_core::{GameSession, PlayerClass, SessionConfig};
//! use rpg_core::testing::ScriptedInput;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::new("Thorin", PlayerClass::Warrior)
//!         .with_seed(7)
//!         .with_starting_location("Western Forest");
//!     let mut session = GameSession::new(config)?;
//!
//!     let outing = session.explore().await?;
//!     if session.in_battle() {
//!         for event in session.fight(&mut ScriptedInput::attacks())? {
//!             println!("{event}");
//!         }
//!     }
//!     println!("{:?}", outing.discovery);
//!
//!     session.save("thorin.json").await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod class_data;
pub mod combat;
pub mod dice;
pub mod exploration;
pub mod items;
pub mod logging;
pub mod persist;
pub mod player;
pub mod progression;
pub mod quests;
pub mod session;
pub mod skills;
pub mod status;
pub mod testing;
pub mod world;

// Primary public API
pub use combat::{ActionChoice, ActionSource, Battle, BattleEvent, BattleState, CombatConfig};
pub use items::{Equipment, Item, Potion, Scroll};
pub use player::{InventoryError, Player};
pub use session::{GameSession, SessionConfig, SessionError, TimeOfDay};
pub use testing::{ScriptedInput, TestHarness};
pub use world::{Character, LocationType, Monster, MonsterType, PlayerClass};
