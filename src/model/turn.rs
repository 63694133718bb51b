use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Signed deltas proposed by the model for one turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatChanges {
    pub int: i32,
    pub str: i32,
    pub cha: i32,
    pub fatigue: i32,
    pub money: i32,
    pub inspiration: i32,
}

impl StatChanges {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Label/value pairs in HUD order.
    pub fn labelled(&self) -> [(&'static str, i32); 6] {
        [
            ("智力", self.int),
            ("体力", self.str),
            ("魅力", self.cha),
            ("金钱", self.money),
            ("疲劳", self.fatigue),
            ("灵感", self.inspiration),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryUpdate {
    pub name: String,
    pub quantity_change: i32,
}

/// Output returned by the model for a played turn.
/// This does NOT mutate state directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResponse {
    pub system_feedback: String,
    #[serde(default)]
    pub stat_changes: StatChanges,
    #[serde(default)]
    pub inventory_updates: Vec<InventoryUpdate>,
    #[serde(default)]
    pub is_level_up: bool,
}

impl TurnResponse {
    pub fn fallback() -> Self {
        Self {
            system_feedback: "⚠️ 系统错误: 连接主机失败。请重试。".to_string(),
            stat_changes: StatChanges::default(),
            inventory_updates: Vec::new(),
            is_level_up: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty model output")]
    Empty,

    #[error("model output must be a JSON object")]
    NotAnObject,

    #[error("invalid model output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode raw model JSON into a typed TurnResponse
pub fn decode_turn_response(raw: &str) -> Result<TurnResponse, DecodeError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(DecodeError::Empty);
    }

    let value: Value = serde_json::from_str(body)?;
    if !value.is_object() {
        return Err(DecodeError::NotAnObject);
    }

    Ok(serde_json::from_value(value)?)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // ```json\n{...}\n```
    let rest = match rest.split_once('\n') {
        Some((_lang, body)) => body,
        None => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "system_feedback": "【📢 系统反馈】干得好!",
        "stat_changes": {"int": 1, "str": 0, "cha": 0, "fatigue": 2, "money": -15, "inspiration": 5},
        "inventory_updates": [{"name": "咖啡", "quantity_change": 1}],
        "is_level_up": false
    }"#;

    #[test]
    fn decodes_full_response() {
        let resp = decode_turn_response(SAMPLE).unwrap();

        assert_eq!(resp.stat_changes.int, 1);
        assert_eq!(resp.stat_changes.money, -15);
        assert_eq!(resp.inventory_updates[0].name, "咖啡");
        assert!(!resp.is_level_up);
    }

    #[test]
    fn tolerates_code_fences() {
        let fenced = format!("```json\n{}\n```", SAMPLE);
        let resp = decode_turn_response(&fenced).unwrap();

        assert_eq!(resp.stat_changes.fatigue, 2);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let resp = decode_turn_response(
            r#"{"system_feedback": "ok", "stat_changes": {"int": 3}}"#,
        )
        .unwrap();

        assert_eq!(resp.stat_changes.int, 3);
        assert_eq!(resp.stat_changes.cha, 0);
        assert!(resp.inventory_updates.is_empty());
    }

    #[test]
    fn rejects_empty_and_non_object_output() {
        assert!(matches!(decode_turn_response("  "), Err(DecodeError::Empty)));
        assert!(matches!(
            decode_turn_response("[1, 2]"),
            Err(DecodeError::NotAnObject)
        ));
        assert!(matches!(
            decode_turn_response("not json"),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn fallback_changes_nothing() {
        let fb = TurnResponse::fallback();

        assert!(fb.stat_changes.is_zero());
        assert!(fb.inventory_updates.is_empty());
        assert!(!fb.is_level_up);
    }
}
