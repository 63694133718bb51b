use eframe::egui;
use std::sync::mpsc;
use std::time::Duration;

use crate::engine::engine::Engine;
use crate::engine::llm_client::build_backend;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::session::SessionSnapshot;
use crate::model::game_save::autosave_path;
use crate::model::phase::GamePhase;
use crate::ui::avatar::AvatarCache;
use crate::ui::settings::AppSettings;
use crate::ui::{chat_panel, hud, settings_window, start_screen};

/* =========================
   Palette
   ========================= */

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(34, 211, 238);
pub const PANEL_BG: egui::Color32 = egui::Color32::from_rgb(15, 23, 42);
pub const MUTED: egui::Color32 = egui::Color32::from_rgb(100, 116, 139);
pub const POSITIVE: egui::Color32 = egui::Color32::from_rgb(74, 222, 128);
pub const NEGATIVE: egui::Color32 = egui::Color32::from_rgb(248, 113, 113);
pub const GOLD: egui::Color32 = egui::Color32::from_rgb(250, 204, 21);

/* =========================
   UI State
   ========================= */

/// In-progress HUD edits. `Some` while the field is open.
#[derive(Default)]
pub struct HudEdit {
    pub role: Option<String>,
    pub level: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Default)]
pub struct UiState {
    pub snapshot: SessionSnapshot,
    pub busy: bool,
    pub input_text: String,
    pub should_auto_scroll: bool,

    pub notice: Option<String>,
    pub connection_status: Option<String>,

    /// Edited copy shown by the settings modal.
    pub settings_draft: AppSettings,
    pub hud_edit: HudEdit,
}

/* =========================
   App
   ========================= */

pub struct EarthOnlineApp {
    pub ui: UiState,
    pub settings: AppSettings,
    pub avatar: AvatarCache,

    cmd_tx: mpsc::Sender<EngineCommand>,
    resp_rx: mpsc::Receiver<EngineResponse>,
}

impl EarthOnlineApp {
    pub fn new(ctx: egui::Context, settings: AppSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        let llm = settings.llm.clone();
        let repaint_ctx = ctx.clone();
        std::thread::spawn(move || {
            let backend = build_backend(llm);
            let mut engine = Engine::new(cmd_rx, resp_tx, backend, Some(autosave_path()))
                .with_notify(Box::new(move || repaint_ctx.request_repaint()));
            engine.run();
        });

        Self {
            ui: UiState {
                settings_draft: settings.clone(),
                ..Default::default()
            },
            settings,
            avatar: AvatarCache::default(),
            cmd_tx,
            resp_rx,
        }
    }

    pub fn send_command(&self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::error!("engine thread is gone");
        }
    }

    fn drain_responses(&mut self) {
        while let Ok(resp) = self.resp_rx.try_recv() {
            match resp {
                EngineResponse::Snapshot(snapshot) => {
                    if snapshot.messages.len() != self.ui.snapshot.messages.len() {
                        self.ui.should_auto_scroll = true;
                    }
                    self.ui.snapshot = snapshot;
                }
                EngineResponse::Busy(busy) => {
                    self.ui.busy = busy;
                    self.ui.should_auto_scroll = true;
                }
                EngineResponse::ConnectionStatus(status) => {
                    self.ui.connection_status = Some(status);
                }
                EngineResponse::Notice(text) => {
                    self.ui.notice = Some(text);
                }
            }
        }
    }

    /// Called when the settings modal is opened from the start screen.
    pub fn open_settings(&mut self) {
        self.ui.settings_draft = self.settings.clone();
        self.ui.connection_status = None;
        self.send_command(EngineCommand::OpenSettings);
    }

    pub fn save_settings(&mut self) {
        let llm_changed = self.ui.settings_draft.llm != self.settings.llm;
        self.settings = self.ui.settings_draft.clone();
        crate::ui::settings_io::save_settings(&self.settings);

        if llm_changed {
            self.send_command(EngineCommand::ApplyLlmSettings(self.settings.llm.clone()));
        }
        self.send_command(EngineCommand::CloseSettings);
    }

    fn draw_menu(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("Game", |ui| {
                    if ui.button("Save as…").clicked() {
                        ui.close();
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Earth Online save", &["json"])
                            .set_file_name("earth_online_save.json")
                            .save_file()
                        {
                            self.send_command(EngineCommand::SaveGame(path));
                        }
                    }
                    if ui.button("Load…").clicked() {
                        ui.close();
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Earth Online save", &["json"])
                            .pick_file()
                        {
                            self.send_command(EngineCommand::LoadGame(path));
                        }
                    }
                    ui.separator();
                    if ui.button("New game").clicked() {
                        ui.close();
                        self.ui.input_text.clear();
                        self.send_command(EngineCommand::NewGame);
                    }
                });

                if let Some(notice) = self.ui.notice.clone() {
                    ui.separator();
                    ui.label(egui::RichText::new(notice).color(MUTED).small());
                    if ui.small_button("✖").clicked() {
                        self.ui.notice = None;
                    }
                }
            });
        });
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for EarthOnlineApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.settings.ui_scale);

        self.drain_responses();

        match self.ui.snapshot.phase {
            GamePhase::Start => start_screen::draw_start_screen(ctx, self),
            GamePhase::Settings => {
                start_screen::draw_start_screen(ctx, self);
                settings_window::draw_settings_window(ctx, self);
            }
            GamePhase::Setup(_) | GamePhase::Playing => {
                self.draw_menu(ctx);
                hud::draw_hud(ctx, self);
                chat_panel::draw_chat_panel(ctx, self);
            }
        }

        self.avatar.poll(ctx);

        if self.ui.busy {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        self.ui.should_auto_scroll = false;
    }
}
