use serde::{Deserialize, Serialize};

/// Inspiration needed for one level.
pub const INSPIRATION_PER_LEVEL: i32 = 50;

pub const FATIGUE_MAX: i32 = 100;

/// The player's real-life "character sheet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub level: u32,
    pub inspiration: i32,
    /// May go negative.
    pub money: i64,
    pub int: i32,
    pub str: i32,
    pub cha: i32,
    pub fatigue: i32,
    pub role: String,
    pub current_goal: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Manual edits made from the HUD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsPatch {
    pub role: Option<String>,
    pub level: Option<u32>,
    pub avatar_url: Option<String>,
}

impl PlayerStats {
    pub fn apply_patch(&mut self, patch: StatsPatch) {
        if let Some(role) = patch.role {
            let role = role.trim();
            if !role.is_empty() {
                self.role = role.to_string();
            }
        }

        if let Some(level) = patch.level {
            self.level = level;
        }

        if let Some(url) = patch.avatar_url {
            let url = url.trim();
            self.avatar_url = if url.is_empty() {
                None
            } else {
                Some(url.to_string())
            };
        }
    }

    pub fn fatigue_ratio(&self) -> f32 {
        (self.fatigue as f32 / FATIGUE_MAX as f32).clamp(0.0, 1.0)
    }

    pub fn inspiration_ratio(&self) -> f32 {
        (self.inspiration as f32 / INSPIRATION_PER_LEVEL as f32).clamp(0.0, 1.0)
    }

    pub fn is_exhausted(&self) -> bool {
        self.fatigue >= FATIGUE_MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_role_is_ignored() {
        let mut stats = PlayerStats {
            role: "学生".into(),
            ..Default::default()
        };

        stats.apply_patch(StatsPatch {
            role: Some("   ".into()),
            ..Default::default()
        });

        assert_eq!(stats.role, "学生");
    }

    #[test]
    fn patch_sets_level_and_trims_role() {
        let mut stats = PlayerStats::default();

        stats.apply_patch(StatsPatch {
            role: Some("  工程师 ".into()),
            level: Some(7),
            avatar_url: None,
        });

        assert_eq!(stats.role, "工程师");
        assert_eq!(stats.level, 7);
        assert_eq!(stats.avatar_url, None);
    }

    #[test]
    fn empty_avatar_url_clears_avatar() {
        let mut stats = PlayerStats {
            avatar_url: Some("https://example.com/a.png".into()),
            ..Default::default()
        };

        stats.apply_patch(StatsPatch {
            avatar_url: Some(String::new()),
            ..Default::default()
        });

        assert!(stats.avatar_url.is_none());
    }

    #[test]
    fn ratios_are_clamped() {
        let stats = PlayerStats {
            fatigue: 150,
            inspiration: -3,
            ..Default::default()
        };

        assert_eq!(stats.fatigue_ratio(), 1.0);
        assert_eq!(stats.inspiration_ratio(), 0.0);
    }
}
