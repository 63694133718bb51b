use std::fs;
use std::path::{Path, PathBuf};

use crate::ui::settings::AppSettings;

fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("earth_online");
    path.push("settings.json");
    path
}

pub fn load_settings() -> AppSettings {
    load_settings_from(&settings_path())
}

pub fn save_settings(settings: &AppSettings) {
    if let Err(e) = save_settings_to(settings, &settings_path()) {
        tracing::warn!(error = %e, "could not save settings");
    }
}

/// Missing or corrupt files fall back to defaults.
pub fn load_settings_from(path: &Path) -> AppSettings {
    let Ok(json) = fs::read_to_string(path) else {
        return AppSettings::default();
    };

    serde_json::from_str(&json).unwrap_or_else(|e| {
        tracing::warn!(error = %e, path = %path.display(), "ignoring corrupt settings file");
        AppSettings::default()
    })
}

pub fn save_settings_to(settings: &AppSettings, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(settings)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::llm_client::LlmSettings;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(load_settings_from(&dir.path().join("nope.json")), AppSettings::default());
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{{{").unwrap();

        assert_eq!(load_settings_from(&path), AppSettings::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("settings.json");

        let settings = AppSettings {
            ui_scale: 1.5,
            llm: LlmSettings::lm_studio(),
            ..Default::default()
        };
        save_settings_to(&settings, &path).unwrap();

        assert_eq!(load_settings_from(&path), settings);
    }
}
