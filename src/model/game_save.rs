use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::inventory::Inventory;
use crate::model::message::ChatMessage;
use crate::model::phase::GamePhase;
use crate::model::player::PlayerStats;

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSave {
    pub version: u32,
    pub phase: GamePhase,
    pub stats: PlayerStats,
    pub inventory: Inventory,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed save file: {0}")]
    Format(#[from] serde_json::Error),

    #[error("unsupported save version {0} (expected {SAVE_VERSION})")]
    UnsupportedVersion(u32),
}

impl GameSave {
    pub fn write_to(&self, path: &Path) -> Result<(), SaveError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, SaveError> {
        let json = fs::read_to_string(path)?;
        let save: GameSave = serde_json::from_str(&json)?;
        if save.version != SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion(save.version));
        }
        Ok(save)
    }
}

pub fn autosave_path() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("earth_online");
    path.push("autosave.json");
    path
}
