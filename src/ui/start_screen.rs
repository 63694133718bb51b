use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::model::game_save::autosave_path;
use crate::model::phase::GamePhase;

use super::app::{EarthOnlineApp, ACCENT, MUTED};

const BUTTON_SIZE: [f32; 2] = [260.0, 48.0];

pub fn draw_start_screen(ctx: &egui::Context, app: &mut EarthOnlineApp) {
    // Modal is open on top of us: keep drawing, stop reacting.
    let interactive = app.ui.snapshot.phase == GamePhase::Start;
    let has_save = autosave_path().exists();

    egui::CentralPanel::default()
        .frame(egui::Frame::new().fill(egui::Color32::BLACK))
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.2);

                ui.label(
                    egui::RichText::new("地球 Online")
                        .size(52.0)
                        .strong()
                        .color(ACCENT),
                );
                ui.label(
                    egui::RichText::new("SYSTEM v4.2 // 需登录")
                        .monospace()
                        .color(ACCENT.gamma_multiply(0.6)),
                );

                ui.add_space(48.0);

                ui.add_enabled_ui(interactive, |ui| {
                    let start = egui::Button::new(
                        egui::RichText::new("▶ 开始游戏").size(20.0).strong().color(egui::Color32::BLACK),
                    )
                    .fill(egui::Color32::WHITE)
                    .min_size(BUTTON_SIZE.into());
                    if ui.add(start).clicked() {
                        app.send_command(EngineCommand::StartGame);
                    }

                    ui.add_space(12.0);

                    let resume = egui::Button::new(egui::RichText::new("💾 继续游戏").size(20.0))
                        .min_size(BUTTON_SIZE.into());
                    if ui.add_enabled(has_save, resume).clicked() {
                        app.send_command(EngineCommand::ContinueGame);
                    }

                    ui.add_space(12.0);

                    let settings = egui::Button::new(egui::RichText::new("⚙ 游戏设置").size(20.0))
                        .min_size(BUTTON_SIZE.into());
                    if ui.add(settings).clicked() {
                        app.open_settings();
                    }
                });

                ui.add_space(48.0);
                ui.label(
                    egui::RichText::new("🌐 服务器: 华夏一区 [爆满]")
                        .small()
                        .monospace()
                        .color(ACCENT.gamma_multiply(0.8)),
                );

                if let Some(notice) = &app.ui.notice {
                    ui.add_space(8.0);
                    ui.label(egui::RichText::new(notice).small().color(MUTED));
                }
            });
        });
}
