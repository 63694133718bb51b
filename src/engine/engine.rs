use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};

use crate::engine::llm_client::{HttpLlmClient, LlmBackend, LlmSettings};
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::session::{GameSession, SUMMARY_REQUEST};
use crate::model::game_save::GameSave;

pub type Notify = Box<dyn Fn() + Send>;

pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    session: GameSession,
    backend: Box<dyn LlmBackend>,
    autosave: Option<PathBuf>,
    notify: Option<Notify>,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        backend: Box<dyn LlmBackend>,
        autosave: Option<PathBuf>,
    ) -> Self {
        Self {
            rx,
            tx,
            session: GameSession::default(),
            backend,
            autosave,
            notify: None,
        }
    }

    /// Called after every response so the UI can wake up.
    pub fn with_notify(mut self, notify: Notify) -> Self {
        self.notify = Some(notify);
        self
    }

    pub fn run(&mut self) {
        tracing::info!("engine started");
        self.send_snapshot();

        while let Ok(cmd) = self.rx.recv() {
            self.handle(cmd);
        }

        tracing::info!("engine stopped");
    }

    pub fn handle(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::StartGame => {
                if let Err(e) = self.session.start() {
                    tracing::warn!(error = %e, "start ignored");
                }
                self.commit();
            }

            EngineCommand::SubmitInput(text) => self.submit(&text),

            EngineCommand::RequestSummary => self.submit(SUMMARY_REQUEST),

            EngineCommand::UpdateStats(patch) => {
                self.session.update_stats(patch);
                self.commit();
            }

            EngineCommand::OpenSettings => {
                if let Err(e) = self.session.open_settings() {
                    tracing::warn!(error = %e, "open settings ignored");
                }
                self.send_snapshot();
            }

            EngineCommand::CloseSettings => {
                if let Err(e) = self.session.close_settings() {
                    tracing::warn!(error = %e, "close settings ignored");
                }
                self.send_snapshot();
            }

            EngineCommand::ApplyLlmSettings(settings) => self.apply_llm_settings(settings),

            EngineCommand::TestConnection => {
                self.send(EngineResponse::Busy(true));
                let status = match self.backend.test_connection() {
                    Ok(status) => status,
                    Err(e) => {
                        tracing::warn!(error = %e, "connection test failed");
                        format!("Connection failed: {e}")
                    }
                };
                self.send(EngineResponse::Busy(false));
                self.send(EngineResponse::ConnectionStatus(status));
            }

            EngineCommand::SaveGame(path) => match self.session.to_save().write_to(&path) {
                Ok(()) => self.notice(format!("Saved to {}", path.display())),
                Err(e) => {
                    tracing::error!(error = %e, path = %path.display(), "save failed");
                    self.notice(format!("Save failed: {e}"));
                }
            },

            EngineCommand::LoadGame(path) => self.load(&path),

            EngineCommand::ContinueGame => match self.autosave.clone() {
                Some(path) if path.exists() => self.load(&path),
                _ => self.notice("No saved game found.".to_string()),
            },

            EngineCommand::NewGame => {
                self.session = GameSession::default();
                self.send_snapshot();
            }
        }
    }

    fn submit(&mut self, text: &str) {
        let pending = match self.session.accept_input(text) {
            Ok(pending) => pending,
            Err(e) => {
                tracing::warn!(error = %e, "input rejected");
                return;
            }
        };

        self.commit();

        if let Some(pending) = pending {
            self.send(EngineResponse::Busy(true));
            self.session.resolve(pending, self.backend.as_ref());
            self.send(EngineResponse::Busy(false));
            self.commit();
        }
    }

    fn load(&mut self, path: &Path) {
        match GameSave::read_from(path) {
            Ok(save) => {
                self.session = GameSession::from_save(save);
                tracing::info!(path = %path.display(), "game loaded");
                self.send_snapshot();
            }
            Err(e) => {
                tracing::error!(error = %e, path = %path.display(), "load failed");
                self.notice(format!("Load failed: {e}"));
            }
        }
    }

    fn apply_llm_settings(&mut self, settings: LlmSettings) {
        match HttpLlmClient::new(settings) {
            Ok(client) => {
                self.backend = Box::new(client);
                tracing::info!("model settings applied");
            }
            Err(e) => {
                tracing::error!(error = %e, "could not build model client");
                self.notice(format!("Model settings rejected: {e}"));
            }
        }
    }

    /// Publishes the new state and autosaves while in game.
    fn commit(&mut self) {
        if self.session.phase().is_in_game() {
            if let Some(path) = &self.autosave {
                if let Err(e) = self.session.to_save().write_to(path) {
                    tracing::warn!(error = %e, "autosave failed");
                }
            }
        }
        self.send_snapshot();
    }

    fn send_snapshot(&self) {
        self.send(EngineResponse::Snapshot(self.session.snapshot()));
    }

    fn notice(&self, text: String) {
        self.send(EngineResponse::Notice(text));
    }

    fn send(&self, resp: EngineResponse) {
        let _ = self.tx.send(resp);
        if let Some(notify) = &self.notify {
            notify();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::session::SessionSnapshot;
    use crate::engine::testing::ScriptedBackend;
    use crate::model::phase::GamePhase;
    use crate::model::player::StatsPatch;
    use std::sync::mpsc;

    struct Harness {
        engine: Engine,
        resp_rx: mpsc::Receiver<EngineResponse>,
        _cmd_tx: mpsc::Sender<EngineCommand>,
    }

    impl Harness {
        fn new(backend: ScriptedBackend, autosave: Option<PathBuf>) -> Self {
            let (cmd_tx, cmd_rx) = mpsc::channel();
            let (resp_tx, resp_rx) = mpsc::channel();
            Self {
                engine: Engine::new(cmd_rx, resp_tx, Box::new(backend), autosave),
                resp_rx,
                _cmd_tx: cmd_tx,
            }
        }

        fn drain(&self) -> Vec<EngineResponse> {
            self.resp_rx.try_iter().collect()
        }

        fn last_snapshot(&self) -> SessionSnapshot {
            self.drain()
                .into_iter()
                .filter_map(|r| match r {
                    EngineResponse::Snapshot(s) => Some(s),
                    _ => None,
                })
                .last()
                .expect("no snapshot sent")
        }

        fn play_setup(&mut self) {
            self.engine.handle(EngineCommand::StartGame);
            self.engine.handle(EngineCommand::SubmitInput("学生".into()));
            self.engine.handle(EngineCommand::SubmitInput("通过考试".into()));
        }
    }

    #[test]
    fn busy_brackets_model_calls() {
        let backend = ScriptedBackend::default().with_text("欢迎");
        let mut h = Harness::new(backend, None);

        h.engine.handle(EngineCommand::StartGame);
        h.engine.handle(EngineCommand::SubmitInput("学生".into()));
        h.drain();

        h.engine.handle(EngineCommand::SubmitInput("通过考试".into()));
        let responses = h.drain();

        let busy: Vec<bool> = responses
            .iter()
            .filter_map(|r| match r {
                EngineResponse::Busy(b) => Some(*b),
                _ => None,
            })
            .collect();
        assert_eq!(busy, vec![true, false]);

        // user line is published before the model answers
        match &responses[0] {
            EngineResponse::Snapshot(s) => assert_eq!(s.messages.last().unwrap().text, "通过考试"),
            _ => panic!("expected snapshot first"),
        }
    }

    #[test]
    fn summary_request_is_sent_as_input() {
        let backend = ScriptedBackend::default()
            .with_text("欢迎")
            .with_json(r#"{"system_feedback": "计划如下"}"#);
        let mut h = Harness::new(backend, None);
        h.play_setup();

        h.engine.handle(EngineCommand::RequestSummary);
        let snap = h.last_snapshot();

        let texts: Vec<&str> = snap.messages.iter().map(|m| m.text.as_str()).collect();
        assert!(texts.contains(&SUMMARY_REQUEST));
        assert_eq!(*texts.last().unwrap(), "计划如下");
    }

    #[test]
    fn autosave_then_continue_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autosave.json");

        let mut h = Harness::new(ScriptedBackend::default(), Some(path.clone()));
        h.play_setup();
        h.engine.handle(EngineCommand::UpdateStats(StatsPatch {
            level: Some(4),
            ..Default::default()
        }));
        assert!(path.exists());

        let mut fresh = Harness::new(ScriptedBackend::default(), Some(path));
        fresh.engine.handle(EngineCommand::ContinueGame);
        let snap = fresh.last_snapshot();

        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.stats.level, 4);
        assert_eq!(snap.stats.role, "学生");
    }

    #[test]
    fn continue_without_save_sends_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = Harness::new(ScriptedBackend::default(), Some(dir.path().join("none.json")));

        h.engine.handle(EngineCommand::ContinueGame);

        assert!(h
            .drain()
            .iter()
            .any(|r| matches!(r, EngineResponse::Notice(n) if n.contains("No saved game"))));
    }

    #[test]
    fn new_game_resets_to_start() {
        let mut h = Harness::new(ScriptedBackend::default(), None);
        h.play_setup();

        h.engine.handle(EngineCommand::NewGame);
        let snap = h.last_snapshot();

        assert_eq!(snap.phase, GamePhase::Start);
        assert!(snap.messages.is_empty());
    }

    #[test]
    fn connection_test_reports_status() {
        let mut h = Harness::new(ScriptedBackend::default(), None);

        h.engine.handle(EngineCommand::TestConnection);

        assert!(h
            .drain()
            .iter()
            .any(|r| matches!(r, EngineResponse::ConnectionStatus(s) if s.starts_with("Connected"))));
    }

    #[test]
    fn input_at_start_screen_changes_nothing() {
        let mut h = Harness::new(ScriptedBackend::default(), None);

        h.engine.handle(EngineCommand::SubmitInput("hello".into()));

        assert!(h.drain().is_empty());
    }
}
