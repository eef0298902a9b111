//! Save game persistence.
//!
//! A save is a flat snapshot of the player plus the game day and current
//! location, written as versioned JSON. The engine itself does no I/O; only
//! this module and [`GameSession`](crate::session::GameSession) touch disk.

use crate::player::Player;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current save file version.
pub const SAVE_VERSION: u32 = 1;

/// A saved game with all state needed to resume play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGame {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// When the save was created, in seconds since the Unix epoch.
    pub saved_at: String,

    pub player: Player,

    pub game_day: u32,

    pub current_location: String,

    pub metadata: SaveMetadata,
}

/// Summary shown in a load menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub player_name: String,
    pub class: String,
    pub level: u32,
    pub location: String,
    pub game_day: u32,
    pub gold: u32,

    /// Duplicated from the parent so it can be peeked.
    #[serde(default)]
    pub saved_at: String,
}

impl SaveMetadata {
    /// Save time in seconds since the Unix epoch. Unparseable stamps sort
    /// as the oldest.
    pub fn saved_at_secs(&self) -> u64 {
        self.saved_at.parse().unwrap_or(0)
    }
}

impl SavedGame {
    /// Snapshot a player. The player's own location is the current location.
    pub fn new(player: Player, game_day: u32) -> Self {
        let saved_at = timestamp_now();
        let metadata = SaveMetadata {
            player_name: player.name().to_string(),
            class: player.class.name().to_string(),
            level: player.level(),
            location: player.location.clone(),
            game_day,
            gold: player.gold,
            saved_at: saved_at.clone(),
        };

        Self {
            version: SAVE_VERSION,
            saved_at,
            current_location: player.location.clone(),
            player,
            game_day,
            metadata,
        }
    }

    /// Save to a JSON file, creating parent directories as needed.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        info!(path = %path.display(), player = %self.metadata.player_name, "Game saved");
        Ok(())
    }

    /// Load from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let saved: Self = serde_json::from_str(&content)?;
        check_version(saved.version)?;
        info!(path = %path.display(), player = %saved.metadata.player_name, "Game loaded");
        Ok(saved)
    }

    /// Read only the metadata of a save.
    pub async fn peek_metadata(path: impl AsRef<Path>) -> Result<SaveMetadata, PersistError> {
        let content = fs::read_to_string(path).await?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: SaveMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;
        check_version(partial.version)?;
        Ok(partial.metadata)
    }
}

fn check_version(found: u32) -> Result<(), PersistError> {
    if found != SAVE_VERSION {
        return Err(PersistError::VersionMismatch {
            expected: SAVE_VERSION,
            found,
        });
    }
    Ok(())
}

/// Information about a save file.
#[derive(Debug, Clone)]
pub struct SaveInfo {
    pub path: PathBuf,
    pub metadata: SaveMetadata,
}

/// List every readable save in a directory, most recent first.
///
/// Files that fail to parse are skipped. A missing directory yields an
/// empty list.
pub async fn list_saves(dir: impl AsRef<Path>) -> Result<Vec<SaveInfo>, PersistError> {
    let dir = dir.as_ref();
    let mut saves = Vec::new();
    if !fs::try_exists(dir).await? {
        return Ok(saves);
    }

    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            match SavedGame::peek_metadata(&path).await {
                Ok(metadata) => saves.push(SaveInfo { path, metadata }),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable save"),
            }
        }
    }

    saves.sort_by(|a, b| {
        b.metadata
            .saved_at_secs()
            .cmp(&a.metadata.saved_at_secs())
            .then_with(|| a.path.cmp(&b.path))
    });
    Ok(saves)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Auto-save file name for a player.
pub fn auto_save_path(base_dir: impl AsRef<Path>, player_name: &str) -> PathBuf {
    base_dir
        .as_ref()
        .join(format!("{}_autosave.json", sanitize(player_name)))
}

/// Manual save file name for a player, stamped with the current time.
pub fn manual_save_path(base_dir: impl AsRef<Path>, player_name: &str) -> PathBuf {
    base_dir
        .as_ref()
        .join(format!("{}_{}.json", sanitize(player_name), timestamp_now()))
}

fn timestamp_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", now.as_secs())
}
