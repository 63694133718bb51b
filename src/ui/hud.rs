use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::model::inventory::Inventory;
use crate::model::player::{PlayerStats, StatsPatch, FATIGUE_MAX, INSPIRATION_PER_LEVEL};

use super::app::{EarthOnlineApp, ACCENT, GOLD, MUTED, PANEL_BG};

const AVATAR_SIZE: f32 = 48.0;
const FATIGUE_DANGER: f32 = 0.8;

pub fn draw_hud(ctx: &egui::Context, app: &mut EarthOnlineApp) {
    let stats = app.ui.snapshot.stats.clone();
    app.avatar.want(ctx, stats.avatar_url.as_deref());

    let mut patch: Option<StatsPatch> = None;

    egui::TopBottomPanel::top("hud")
        .frame(egui::Frame::new().fill(PANEL_BG).inner_margin(egui::Margin::same(12)))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                draw_avatar(ui, app, &stats, &mut patch);

                ui.vertical(|ui| {
                    draw_role(ui, app, &stats, &mut patch);
                    let goal = if stats.current_goal.is_empty() {
                        "未设定目标"
                    } else {
                        stats.current_goal.as_str()
                    };
                    ui.label(egui::RichText::new(goal).small().monospace().color(MUTED));
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.vertical(|ui| {
                        ui.label(
                            egui::RichText::new(format!("🪙 {} G", stats.money))
                                .monospace()
                                .strong()
                                .color(GOLD),
                        );
                        ui.label(egui::RichText::new("金钱").small().color(MUTED));
                    });
                });
            });

            ui.add_space(8.0);
            draw_attributes(ui, &stats);
            ui.add_space(8.0);
            draw_bars(ui, &stats);
            draw_inventory(ui, &app.ui.snapshot.inventory);
        });

    draw_avatar_prompt(ctx, app, &mut patch);

    if let Some(patch) = patch {
        app.send_command(EngineCommand::UpdateStats(patch));
    }
}

fn draw_avatar(
    ui: &mut egui::Ui,
    app: &mut EarthOnlineApp,
    stats: &PlayerStats,
    patch: &mut Option<StatsPatch>,
) {
    ui.vertical(|ui| {
        let size = egui::vec2(AVATAR_SIZE, AVATAR_SIZE);
        let clicked = match app.avatar.texture() {
            Some(texture) => ui
                .add(
                    egui::Image::new(egui::load::SizedTexture::from_handle(texture))
                        .fit_to_exact_size(size)
                        .corner_radius(AVATAR_SIZE / 2.0)
                        .sense(egui::Sense::click()),
                )
                .on_hover_text("设置头像")
                .clicked(),
            None => ui
                .add(egui::Button::new(egui::RichText::new("👤").size(24.0)).min_size(size))
                .on_hover_text("设置头像")
                .clicked(),
        };

        if clicked {
            app.ui.hud_edit.avatar_url = Some(stats.avatar_url.clone().unwrap_or_default());
        }

        // Level badge
        match app.ui.hud_edit.level.as_mut() {
            Some(value) => {
                let resp = ui.add(egui::TextEdit::singleline(value).desired_width(AVATAR_SIZE));
                resp.request_focus();
                if resp.lost_focus() {
                    if let Ok(level) = value.trim().parse::<u32>() {
                        *patch = Some(StatsPatch {
                            level: Some(level),
                            ..Default::default()
                        });
                    }
                    app.ui.hud_edit.level = None;
                }
            }
            None => {
                let badge = egui::Button::new(
                    egui::RichText::new(format!("LV.{}", stats.level))
                        .small()
                        .strong()
                        .color(egui::Color32::WHITE),
                )
                .fill(ACCENT.gamma_multiply(0.6));
                if ui.add(badge).clicked() {
                    app.ui.hud_edit.level = Some(stats.level.to_string());
                }
            }
        }
    });
}

fn draw_role(
    ui: &mut egui::Ui,
    app: &mut EarthOnlineApp,
    stats: &PlayerStats,
    patch: &mut Option<StatsPatch>,
) {
    match app.ui.hud_edit.role.as_mut() {
        Some(value) => {
            let resp = ui.add(egui::TextEdit::singleline(value).desired_width(140.0));
            resp.request_focus();
            if resp.lost_focus() {
                // Blank roles are dropped by the engine.
                *patch = Some(StatsPatch {
                    role: Some(value.clone()),
                    ..Default::default()
                });
                app.ui.hud_edit.role = None;
            }
        }
        None => {
            let role = if stats.role.is_empty() {
                "未设定角色"
            } else {
                stats.role.as_str()
            };
            let resp = ui
                .add(
                    egui::Label::new(egui::RichText::new(role).strong().color(ACCENT))
                        .sense(egui::Sense::click()),
                )
                .on_hover_text("✏ 编辑角色");
            if resp.clicked() {
                app.ui.hud_edit.role = Some(role.to_string());
            }
        }
    }
}

fn draw_avatar_prompt(ctx: &egui::Context, app: &mut EarthOnlineApp, patch: &mut Option<StatsPatch>) {
    let Some(url) = app.ui.hud_edit.avatar_url.as_mut() else {
        return;
    };

    let mut done = false;
    let mut cancelled = false;

    egui::Window::new("请输入头像图片链接 (URL)")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_TOP, [0.0, 80.0])
        .show(ctx, |ui| {
            ui.add(egui::TextEdit::singleline(url).desired_width(320.0));
            if let Some(error) = app.avatar.error() {
                ui.label(egui::RichText::new(error).small().color(MUTED));
            }
            ui.horizontal(|ui| {
                done = ui.button("OK").clicked();
                cancelled = ui.button("Cancel").clicked();
            });
        });

    if done {
        *patch = Some(StatsPatch {
            avatar_url: Some(url.clone()),
            ..Default::default()
        });
    }
    if done || cancelled {
        app.ui.hud_edit.avatar_url = None;
    }
}

fn draw_attributes(ui: &mut egui::Ui, stats: &PlayerStats) {
    ui.columns(3, |cols| {
        let cells = [
            ("🧠", "智力", stats.int, egui::Color32::from_rgb(96, 165, 250)),
            ("💪", "体力", stats.str, egui::Color32::from_rgb(248, 113, 113)),
            ("✨", "魅力", stats.cha, egui::Color32::from_rgb(192, 132, 252)),
        ];

        for (col, (icon, label, value, color)) in cols.iter_mut().zip(cells) {
            egui::Frame::new()
                .fill(egui::Color32::from_rgb(30, 41, 59))
                .corner_radius(4.0)
                .inner_margin(egui::Margin::same(6))
                .show(col, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.label(egui::RichText::new(icon).color(color));
                        ui.label(egui::RichText::new(label).small().color(MUTED));
                        ui.label(egui::RichText::new(value.to_string()).monospace().strong().size(18.0));
                    });
                });
        }
    });
}

fn draw_bars(ui: &mut egui::Ui, stats: &PlayerStats) {
    let fatigue = stats.fatigue_ratio();
    let fatigue_color = if fatigue > FATIGUE_DANGER {
        egui::Color32::from_rgb(220, 38, 38)
    } else {
        egui::Color32::from_rgb(22, 163, 74)
    };

    ui.add(
        egui::ProgressBar::new(fatigue)
            .fill(fatigue_color)
            .text(format!("🔋 疲劳度 {}/{}", stats.fatigue, FATIGUE_MAX)),
    );
    ui.add(
        egui::ProgressBar::new(stats.inspiration_ratio())
            .fill(ACCENT.gamma_multiply(0.8))
            .text(format!("🏆 灵感 {}/{}", stats.inspiration, INSPIRATION_PER_LEVEL)),
    );
}

fn draw_inventory(ui: &mut egui::Ui, inventory: &Inventory) {
    ui.collapsing(egui::RichText::new("🎒 背包").small().color(MUTED), |ui| {
        if inventory.is_empty() {
            ui.label(egui::RichText::new("空").small().color(MUTED));
            return;
        }
        ui.horizontal_wrapped(|ui| {
            for item in inventory.items() {
                ui.label(egui::RichText::new(format!("{} x{}", item.name, item.count)).small().monospace());
            }
        });
    });
}
