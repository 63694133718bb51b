use crate::model::inventory::Inventory;
use crate::model::player::{PlayerStats, FATIGUE_MAX, INSPIRATION_PER_LEVEL};
use crate::model::turn::TurnResponse;

const LEVEL_UP_BANNER: &str = "\n\n🎉 等级提升! 系统权限已扩展! 🎉";
const EXHAUSTED_WARNING: &str = "\n\n⚠️ 疲劳度已满! 请立即休息!";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnReport {
    pub leveled_up: bool,
    /// Fatigue sits at the maximum after this turn.
    pub exhausted: bool,
    /// The model claimed a level up that the numbers do not support, or vice versa.
    pub level_flag_mismatch: bool,
}

impl TurnReport {
    /// Feedback text plus local banners.
    pub fn decorate(&self, feedback: &str) -> String {
        let mut text = feedback.to_string();
        if self.leveled_up {
            text.push_str(LEVEL_UP_BANNER);
        }
        if self.exhausted {
            text.push_str(EXHAUSTED_WARNING);
        }
        text
    }
}

/// Apply a model turn to the player, returning what happened.
/// At most one level is granted per turn; any surplus inspiration carries over.
/// The model's `is_level_up` is only compared, never trusted.
pub fn apply_turn(
    stats: &mut PlayerStats,
    inventory: &mut Inventory,
    turn: &TurnResponse,
) -> TurnReport {
    let delta = &turn.stat_changes;

    stats.inspiration = stats.inspiration.saturating_add(delta.inspiration);
    let leveled_up = stats.inspiration >= INSPIRATION_PER_LEVEL;
    if leveled_up {
        stats.level = stats.level.saturating_add(1);
        stats.inspiration -= INSPIRATION_PER_LEVEL;
    }

    stats.money = stats.money.saturating_add(i64::from(delta.money));
    stats.int = stats.int.saturating_add(delta.int).max(0);
    stats.str = stats.str.saturating_add(delta.str).max(0);
    stats.cha = stats.cha.saturating_add(delta.cha).max(0);
    stats.fatigue = stats
        .fatigue
        .saturating_add(delta.fatigue)
        .clamp(0, FATIGUE_MAX);

    for update in &turn.inventory_updates {
        inventory.apply_update(&update.name, update.quantity_change);
    }

    let level_flag_mismatch = turn.is_level_up != leveled_up;
    if level_flag_mismatch {
        tracing::debug!(
            claimed = turn.is_level_up,
            leveled_up,
            "model level-up flag disagrees with inspiration"
        );
    }

    TurnReport {
        leveled_up,
        exhausted: stats.is_exhausted(),
        level_flag_mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::turn::{InventoryUpdate, StatChanges};

    fn turn(changes: StatChanges, updates: Vec<InventoryUpdate>) -> TurnResponse {
        TurnResponse {
            system_feedback: "ok".into(),
            stat_changes: changes,
            inventory_updates: updates,
            is_level_up: false,
        }
    }

    #[test]
    fn levels_up_at_threshold_and_carries_remainder() {
        let mut stats = PlayerStats {
            inspiration: 45,
            ..Default::default()
        };
        let mut inv = Inventory::default();

        let report = apply_turn(
            &mut stats,
            &mut inv,
            &turn(StatChanges { inspiration: 10, ..Default::default() }, vec![]),
        );

        assert!(report.leveled_up);
        assert_eq!(stats.level, 1);
        assert_eq!(stats.inspiration, 5);
    }

    #[test]
    fn exactly_fifty_levels_up_to_zero() {
        let mut stats = PlayerStats::default();
        let mut inv = Inventory::default();

        apply_turn(
            &mut stats,
            &mut inv,
            &turn(StatChanges { inspiration: 50, ..Default::default() }, vec![]),
        );

        assert_eq!(stats.level, 1);
        assert_eq!(stats.inspiration, 0);
    }

    #[test]
    fn large_gain_grants_one_level_and_keeps_surplus() {
        let mut stats = PlayerStats::default();
        let mut inv = Inventory::default();

        let report = apply_turn(
            &mut stats,
            &mut inv,
            &turn(StatChanges { inspiration: 120, ..Default::default() }, vec![]),
        );

        assert!(report.leveled_up);
        assert_eq!(stats.level, 1);
        assert_eq!(stats.inspiration, 70);

        // The surplus pays for the next level on the following turn.
        apply_turn(&mut stats, &mut inv, &turn(StatChanges::default(), vec![]));
        assert_eq!(stats.level, 2);
        assert_eq!(stats.inspiration, 20);
    }

    #[test]
    fn inspiration_may_go_negative() {
        let mut stats = PlayerStats {
            inspiration: 5,
            ..Default::default()
        };
        let mut inv = Inventory::default();

        let report = apply_turn(
            &mut stats,
            &mut inv,
            &turn(StatChanges { inspiration: -10, ..Default::default() }, vec![]),
        );

        assert!(!report.leveled_up);
        assert_eq!(stats.level, 0);
        assert_eq!(stats.inspiration, -5);
    }

    #[test]
    fn clamps_attributes_and_fatigue() {
        let mut stats = PlayerStats {
            int: 2,
            fatigue: 95,
            ..Default::default()
        };
        let mut inv = Inventory::default();

        let report = apply_turn(
            &mut stats,
            &mut inv,
            &turn(
                StatChanges {
                    int: -5,
                    str: -1,
                    fatigue: 20,
                    inspiration: -10,
                    money: -30,
                    ..Default::default()
                },
                vec![],
            ),
        );

        assert_eq!(stats.int, 0);
        assert_eq!(stats.str, 0);
        assert_eq!(stats.fatigue, 100);
        assert_eq!(stats.inspiration, -10);
        assert_eq!(stats.money, -30);
        assert!(report.exhausted);
    }

    #[test]
    fn resting_never_drops_fatigue_below_zero() {
        let mut stats = PlayerStats {
            fatigue: 10,
            ..Default::default()
        };
        let mut inv = Inventory::default();

        apply_turn(
            &mut stats,
            &mut inv,
            &turn(StatChanges { fatigue: -40, ..Default::default() }, vec![]),
        );

        assert_eq!(stats.fatigue, 0);
    }

    #[test]
    fn applies_inventory_updates_in_order() {
        let mut stats = PlayerStats::default();
        let mut inv = Inventory::default();
        inv.apply_update("咖啡", 1);

        apply_turn(
            &mut stats,
            &mut inv,
            &turn(
                StatChanges::default(),
                vec![
                    InventoryUpdate { name: "咖啡".into(), quantity_change: -1 },
                    InventoryUpdate { name: "面包".into(), quantity_change: 2 },
                    InventoryUpdate { name: "面包".into(), quantity_change: -1 },
                ],
            ),
        );

        assert_eq!(inv.count_of("咖啡"), 0);
        assert_eq!(inv.count_of("面包"), 1);
    }

    #[test]
    fn flags_disagreement_with_model_level_claim() {
        let mut stats = PlayerStats::default();
        let mut inv = Inventory::default();
        let mut t = turn(StatChanges { inspiration: 3, ..Default::default() }, vec![]);
        t.is_level_up = true;

        let report = apply_turn(&mut stats, &mut inv, &t);

        assert!(report.level_flag_mismatch);
        assert_eq!(stats.level, 0);
    }

    #[test]
    fn decorate_appends_banners() {
        let report = TurnReport {
            leveled_up: true,
            exhausted: false,
            level_flag_mismatch: false,
        };
        let text = report.decorate("好");

        assert!(text.starts_with("好"));
        assert!(text.contains("等级提升"));
        assert!(!text.contains("疲劳度已满"));
    }

    #[test]
    fn decorate_appends_exhaustion_warning() {
        let report = TurnReport {
            leveled_up: false,
            exhausted: true,
            level_flag_mismatch: false,
        };
        let text = report.decorate("好");

        assert!(text.ends_with("⚠️ 疲劳度已满! 请立即休息!"));
        assert!(!text.contains("等级提升"));
    }
}
