use std::path::PathBuf;

use crate::engine::llm_client::LlmSettings;
use crate::engine::session::SessionSnapshot;
use crate::model::player::StatsPatch;

pub enum EngineCommand {
    StartGame,
    SubmitInput(String),
    /// Asks the system to list every plan and the current state.
    RequestSummary,
    UpdateStats(StatsPatch),
    OpenSettings,
    CloseSettings,
    ApplyLlmSettings(LlmSettings),
    TestConnection,
    SaveGame(PathBuf),
    LoadGame(PathBuf),
    ContinueGame,
    NewGame,
}

pub enum EngineResponse {
    Snapshot(SessionSnapshot),

    /// A model request is in flight.
    Busy(bool),

    ConnectionStatus(String),

    /// One-off status line for the UI (save results, errors).
    Notice(String),
}
