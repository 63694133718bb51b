use eframe::egui;

use crate::engine::llm_client::{LlmProvider, LlmSettings};
use crate::engine::protocol::EngineCommand;

use super::app::{EarthOnlineApp, ACCENT, MUTED};

pub fn draw_settings_window(ctx: &egui::Context, app: &mut EarthOnlineApp) {
    let mut save = false;
    let mut close = false;
    let mut test = false;

    egui::Window::new(egui::RichText::new("⚙ 系统设置").color(ACCENT).strong())
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            let draft = &mut app.ui.settings_draft;

            ui.heading("Model");
            ui.separator();

            egui::ComboBox::from_label("Provider")
                .selected_text(draft.llm.provider.label())
                .show_ui(ui, |ui| {
                    for provider in [LlmProvider::Gemini, LlmProvider::OpenAiCompatible] {
                        ui.selectable_value(&mut draft.llm.provider, provider, provider.label());
                    }
                });

            ui.horizontal(|ui| {
                if ui.small_button("Gemini defaults").clicked() {
                    draft.llm = LlmSettings::default();
                }
                if ui.small_button("LM Studio defaults").clicked() {
                    draft.llm = LlmSettings::lm_studio();
                }
            });

            ui.label("Endpoint");
            ui.text_edit_singleline(&mut draft.llm.endpoint);

            ui.label("Model");
            ui.text_edit_singleline(&mut draft.llm.model);

            ui.label("API key environment variable");
            ui.text_edit_singleline(&mut draft.llm.api_key_env);
            ui.label(
                egui::RichText::new("* The key itself is never stored. `.env` files are honoured.")
                    .small()
                    .color(MUTED),
            );

            ui.add(egui::Slider::new(&mut draft.llm.temperature, 0.0..=2.0).text("Temperature"));
            ui.add(
                egui::DragValue::new(&mut draft.llm.timeout_secs)
                    .range(5..=600)
                    .suffix(" s timeout"),
            );

            ui.horizontal(|ui| {
                if ui.add_enabled(!app.ui.busy, egui::Button::new("Test connection")).clicked() {
                    test = true;
                }
                if app.ui.busy {
                    ui.add(egui::Spinner::new());
                }
            });
            if let Some(status) = &app.ui.connection_status {
                ui.label(egui::RichText::new(status).small().color(MUTED));
            }

            ui.add_space(8.0);
            ui.heading("Display");
            ui.separator();

            ui.label("UI Scale");
            ui.add(egui::Slider::new(&mut draft.ui_scale, 0.75..=2.0));

            for (key, label) in [("User", "Your messages"), ("System", "System messages")] {
                ui.horizontal(|ui| {
                    let mut color = draft.color(key);
                    if ui.color_edit_button_srgba(&mut color).changed() {
                        draft.set_color(key, color);
                    }
                    ui.label(label);
                });
            }

            ui.add_space(12.0);
            ui.horizontal(|ui| {
                if ui.button("💾 保存设置").clicked() {
                    save = true;
                }
                if ui.button("Cancel").clicked() {
                    close = true;
                }
            });
        });

    // Testing uses the draft, so apply it first.
    if test {
        let llm = app.ui.settings_draft.llm.clone();
        app.send_command(EngineCommand::ApplyLlmSettings(llm));
        app.send_command(EngineCommand::TestConnection);
    }

    if save {
        app.save_settings();
    } else if close {
        // Undo a draft applied by a connection test.
        if app.ui.settings_draft.llm != app.settings.llm {
            app.send_command(EngineCommand::ApplyLlmSettings(app.settings.llm.clone()));
        }
        app.send_command(EngineCommand::CloseSettings);
    }
}
