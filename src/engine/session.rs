use thiserror::Error;

use crate::engine::apply_turn::apply_turn;
use crate::engine::llm_client::LlmBackend;
use crate::engine::prompt_builder::{turn_response_schema, PromptBuilder, SYSTEM_INSTRUCTION};
use crate::model::game_save::{GameSave, SAVE_VERSION};
use crate::model::inventory::Inventory;
use crate::model::message::{ChatMessage, TurnDetails};
use crate::model::phase::{GamePhase, SetupStep};
use crate::model::player::{PlayerStats, StatsPatch};
use crate::model::turn::{decode_turn_response, TurnResponse};

const ROLE_PROMPT: &str =
    "系统初始化完成。\n请输入您希望在此模拟中扮演的角色/职业 (例如: 学生, 工程师, 超级英雄)。";
const GREETING_FALLBACK: &str = "欢迎来到地球Online。";
const GREETING_EMPTY: &str = "欢迎来到地球Online。初始化完成。";

pub const SUMMARY_REQUEST: &str = "请列出我所有的计划和当前状态";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("input is only accepted during setup or play (current phase: {0:?})")]
    NotInGame(GamePhase),

    #[error("cannot {action} while in {phase:?}")]
    InvalidTransition {
        action: &'static str,
        phase: GamePhase,
    },
}

/// Input that still needs a model round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingInput {
    Greeting,
    Turn(String),
}

/// Everything the UI needs to draw one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub phase: GamePhase,
    pub stats: PlayerStats,
    pub inventory: Inventory,
    pub messages: Vec<ChatMessage>,
}

/// The single authoritative game state.
#[derive(Debug, Clone, Default)]
pub struct GameSession {
    phase: GamePhase,
    stats: PlayerStats,
    inventory: Inventory,
    messages: Vec<ChatMessage>,
}

impl GameSession {
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[cfg(test)]
    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    #[cfg(test)]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    #[cfg(test)]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            stats: self.stats.clone(),
            inventory: self.inventory.clone(),
            messages: self.messages.clone(),
        }
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != GamePhase::Start {
            return Err(SessionError::InvalidTransition {
                action: "start",
                phase: self.phase,
            });
        }

        self.phase = GamePhase::Setup(SetupStep::Role);
        self.messages.push(ChatMessage::system(ROLE_PROMPT));
        Ok(())
    }

    pub fn open_settings(&mut self) -> Result<(), SessionError> {
        self.transition(GamePhase::Start, GamePhase::Settings, "open settings")
    }

    pub fn close_settings(&mut self) -> Result<(), SessionError> {
        self.transition(GamePhase::Settings, GamePhase::Start, "close settings")
    }

    fn transition(
        &mut self,
        from: GamePhase,
        to: GamePhase,
        action: &'static str,
    ) -> Result<(), SessionError> {
        if self.phase != from {
            return Err(SessionError::InvalidTransition {
                action,
                phase: self.phase,
            });
        }
        self.phase = to;
        Ok(())
    }

    /// Records the player's line and performs every step that needs no model.
    /// Returns what is left to resolve, if anything.
    pub fn accept_input(&mut self, text: &str) -> Result<Option<PendingInput>, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        if !self.phase.is_in_game() {
            return Err(SessionError::NotInGame(self.phase));
        }

        self.messages.push(ChatMessage::user(text));

        match self.phase {
            GamePhase::Setup(SetupStep::Role) => {
                self.stats.role = text.to_string();
                self.phase = GamePhase::Setup(SetupStep::Goal);
                self.messages.push(ChatMessage::system(format!(
                    "角色已确认: [{text}]。\n现在, 请设定您的当前首要目标 (例如: \"通过考试\", \"存1万元\", \"减肥5斤\")。"
                )));
                Ok(None)
            }
            GamePhase::Setup(SetupStep::Goal) => {
                self.stats.current_goal = text.to_string();
                self.phase = GamePhase::Playing;
                Ok(Some(PendingInput::Greeting))
            }
            GamePhase::Playing => Ok(Some(PendingInput::Turn(text.to_string()))),
            GamePhase::Start | GamePhase::Settings => Err(SessionError::NotInGame(self.phase)),
        }
    }

    pub fn resolve(&mut self, pending: PendingInput, backend: &dyn LlmBackend) {
        match pending {
            PendingInput::Greeting => {
                let greeting = self.request_greeting(backend);
                self.messages.push(ChatMessage::system(greeting));
            }
            PendingInput::Turn(text) => {
                let turn = self.request_turn(&text, backend);
                self.apply(turn);
            }
        }
    }

    #[cfg(test)]
    pub fn submit(&mut self, text: &str, backend: &dyn LlmBackend) -> Result<(), SessionError> {
        if let Some(pending) = self.accept_input(text)? {
            self.resolve(pending, backend);
        }
        Ok(())
    }

    fn request_greeting(&self, backend: &dyn LlmBackend) -> String {
        let prompt = PromptBuilder::greeting(&self.stats.role, &self.stats.current_goal);
        match backend.generate_text(SYSTEM_INSTRUCTION, &prompt) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => GREETING_EMPTY.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "greeting request failed");
                GREETING_FALLBACK.to_string()
            }
        }
    }

    fn request_turn(&self, text: &str, backend: &dyn LlmBackend) -> TurnResponse {
        let prompt = PromptBuilder::turn(&self.stats, &self.inventory, text);
        let raw = match backend.generate_json(SYSTEM_INSTRUCTION, &prompt, &turn_response_schema()) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "turn request failed");
                return TurnResponse::fallback();
            }
        };

        decode_turn_response(&raw).unwrap_or_else(|e| {
            tracing::error!(error = %e, "could not decode turn response");
            TurnResponse::fallback()
        })
    }

    /// Applies a decoded turn and appends the annotated system message.
    pub fn apply(&mut self, turn: TurnResponse) {
        let report = apply_turn(&mut self.stats, &mut self.inventory, &turn);

        if report.leveled_up {
            tracing::info!(level = self.stats.level, "level up");
        }

        let text = report.decorate(&turn.system_feedback);
        self.messages.push(ChatMessage::system_with_details(
            text,
            TurnDetails {
                stat_changes: turn.stat_changes,
                inventory_updates: turn.inventory_updates,
            },
        ));
    }

    pub fn update_stats(&mut self, patch: StatsPatch) {
        self.stats.apply_patch(patch);
    }

    pub fn to_save(&self) -> GameSave {
        GameSave {
            version: SAVE_VERSION,
            phase: self.phase,
            stats: self.stats.clone(),
            inventory: self.inventory.clone(),
            messages: self.messages.clone(),
        }
    }

    pub fn from_save(save: GameSave) -> Self {
        // Saves are only taken in game; anything else resumes play.
        let phase = if save.phase.is_in_game() {
            save.phase
        } else {
            GamePhase::Playing
        };

        Self {
            phase,
            stats: save.stats,
            inventory: save.inventory,
            messages: save.messages,
        }
    }
}
