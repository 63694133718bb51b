use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStep {
    Role,
    Goal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "step", rename_all = "snake_case")]
pub enum GamePhase {
    Start,
    Settings,
    Setup(SetupStep),
    Playing,
}

impl Default for GamePhase {
    fn default() -> Self {
        GamePhase::Start
    }
}

impl GamePhase {
    /// Phases where the HUD and chat are on screen.
    pub fn is_in_game(&self) -> bool {
        matches!(self, GamePhase::Setup(_) | GamePhase::Playing)
    }
}
