use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::model::message::{ChatMessage, Sender, TurnDetails};
use crate::model::phase::GamePhase;
use crate::ui::settings::AppSettings;

use super::app::{EarthOnlineApp, ACCENT, MUTED, NEGATIVE, POSITIVE};

pub fn draw_chat_panel(ctx: &egui::Context, app: &mut EarthOnlineApp) {
    let input_id = egui::Id::new("chat_input_box");
    let busy = app.ui.busy;

    // ---------- Input bar ----------
    egui::TopBottomPanel::bottom("chat_input").show(ctx, |ui| {
        ui.add_space(6.0);
        let mut send_now = false;
        let mut summary = false;

        ui.horizontal(|ui| {
            let input_width = ui.available_width() - 90.0;
            let response = ui.add_enabled(
                !busy,
                egui::TextEdit::singleline(&mut app.ui.input_text)
                    .id(input_id)
                    .hint_text("汇报你的行动...")
                    .desired_width(input_width),
            );

            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send_now = true;
            }

            let playing = app.ui.snapshot.phase == GamePhase::Playing;
            if ui
                .add_enabled(!busy && playing, egui::Button::new("📋"))
                .on_hover_text("一键总结")
                .clicked()
            {
                summary = true;
            }

            let has_text = !app.ui.input_text.trim().is_empty();
            if ui.add_enabled(!busy && has_text, egui::Button::new("➤ Send")).clicked() {
                send_now = true;
            }
        });
        ui.add_space(6.0);

        if summary {
            app.send_command(EngineCommand::RequestSummary);
        }

        if send_now && !busy {
            let text = app.ui.input_text.trim().to_string();

            if !text.is_empty() {
                app.send_command(EngineCommand::SubmitInput(text));
                app.ui.input_text.clear();
            }

            // Keep cursor focused
            ui.memory_mut(|m| m.request_focus(input_id));
        }
    });

    // ---------- Chat history ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(app.ui.should_auto_scroll)
            .show(ui, |ui| {
                for msg in &app.ui.snapshot.messages {
                    draw_message(ui, &app.settings, msg);
                }

                if busy {
                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        ui.add(egui::Spinner::new().color(ACCENT));
                        ui.label(egui::RichText::new("系统处理中...").small().color(MUTED));
                    });
                }
            });
    });
}

fn draw_message(ui: &mut egui::Ui, settings: &AppSettings, msg: &ChatMessage) {
    ui.add_space(8.0);

    match msg.sender {
        Sender::User => {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                bubble(ui, settings.color("User"), |ui| {
                    ui.label(egui::RichText::new(&msg.text).color(egui::Color32::WHITE));
                });
            });
        }
        Sender::System => {
            bubble(ui, settings.color("System"), |ui| {
                ui.label(egui::RichText::new("📢 系统").small().strong().color(ACCENT));
                ui.label(egui::RichText::new(&msg.text).color(egui::Color32::from_gray(210)));

                if let Some(details) = &msg.details {
                    draw_details(ui, details);
                }
            });
        }
    }
}

fn bubble(ui: &mut egui::Ui, color: egui::Color32, add_contents: impl FnOnce(&mut egui::Ui)) {
    let max_width = ui.available_width() * 0.85;
    egui::Frame::new()
        .fill(color)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.set_max_width(max_width);
            ui.vertical(add_contents);
        });
}

fn draw_details(ui: &mut egui::Ui, details: &TurnDetails) {
    let has_stats = !details.stat_changes.is_zero();
    let has_items = !details.inventory_updates.is_empty();
    if !has_stats && !has_items {
        return;
    }

    ui.separator();

    if has_stats {
        ui.label(egui::RichText::new("📊 属性变动").small().strong().color(MUTED));
        ui.horizontal_wrapped(|ui| {
            for (label, value) in details.stat_changes.labelled() {
                if value != 0 {
                    stat_chip(ui, label, value);
                }
            }
        });
    }

    if has_items {
        ui.label(egui::RichText::new("🎒 物品清单更新").small().strong().color(MUTED));
        for update in &details.inventory_updates {
            ui.label(
                egui::RichText::new(format!("{} {}", update.name, signed(update.quantity_change)))
                    .small()
                    .monospace()
                    .color(MUTED),
            );
        }
    }
}

fn stat_chip(ui: &mut egui::Ui, label: &str, value: i32) {
    let (color, arrow) = if value > 0 {
        (POSITIVE, "↑")
    } else {
        (NEGATIVE, "↓")
    };

    egui::Frame::new()
        .stroke(egui::Stroke::new(1.0, color.gamma_multiply(0.5)))
        .fill(color.gamma_multiply(0.1))
        .corner_radius(4.0)
        .inner_margin(egui::Margin::symmetric(4, 1))
        .show(ui, |ui| {
            ui.label(
                egui::RichText::new(format!("{label} {}{arrow}", signed(value)))
                    .small()
                    .monospace()
                    .color(color),
            );
        });
}

fn signed(value: i32) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}
