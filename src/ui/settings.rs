use serde::{Deserialize, Serialize};
use egui::Color32;
use std::collections::HashMap;

use crate::engine::llm_client::LlmSettings;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub ui_scale: f32,

    // Speaker → color mapping
    pub speaker_colors: HashMap<String, [u8; 4]>,

    pub llm: LlmSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        let mut speaker_colors = HashMap::new();

        speaker_colors.insert("User".into(), [22, 78, 99, 255]);
        speaker_colors.insert("System".into(), [30, 41, 59, 255]);

        Self {
            ui_scale: 1.0,
            speaker_colors,
            llm: LlmSettings::default(),
        }
    }
}

impl AppSettings {
    pub fn color(&self, key: &str) -> Color32 {
        self.speaker_colors
            .get(key)
            .map(|c| Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3]))
            .unwrap_or(Color32::DARK_GRAY)
    }

    pub fn set_color(&mut self, key: &str, color: Color32) {
        self.speaker_colors.insert(
            key.to_string(),
            [color.r(), color.g(), color.b(), color.a()],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_speaker_gets_fallback_color() {
        assert_eq!(AppSettings::default().color("Narrator"), Color32::DARK_GRAY);
    }

    #[test]
    fn set_color_round_trips_through_rgba() {
        let mut settings = AppSettings::default();
        settings.set_color("User", Color32::from_rgb(1, 2, 3));

        assert_eq!(settings.color("User"), Color32::from_rgb(1, 2, 3));
    }
}
