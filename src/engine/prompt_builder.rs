use serde_json::{json, Value};

use crate::model::inventory::Inventory;
use crate::model::player::{PlayerStats, FATIGUE_MAX, INSPIRATION_PER_LEVEL};

pub const SYSTEM_INSTRUCTION: &str = "\
You are the \"Earth Online\" (地球Online) System Assistant.
Role: A female AI, smart, calm, lively, strict.
Language: SIMPLIFIED CHINESE (简体中文) ONLY.
Task: Manage the player's real-life stats based on their text input.

Core Rules:
1. Stats: 智力 (INT), 体力 (STR), 魅力 (CHA), 金钱 (Money), 疲劳度 (Fatigue 0-100), 灵感 (Inspiration 0-50).
2. Mechanics:
   - Analyze user input (e.g., \"背单词1小时\") -> Deduce stat changes (e.g., 智力+1, 疲劳度+2).
   - If Fatigue > 100, warn user strictly to rest.
   - Recognize item usage/gain (e.g., \"买了一杯咖啡\") -> Update inventory.
   - Rewards: Daily/Weekly tasks give Inspiration.
3. Tone:
   - Speak like a sci-fi system interface but with personality.
   - Be strict about laziness.
   - Be encouraging about progress.
   - Use emojis.
   - Output style example: \"【📢 系统反馈】... 【📊 属性变动】...\"

Output JSON ONLY. The structure MUST be exactly as requested.
";

/// Builds the text sent to the model.
/// Only formats text: no parsing, no networking.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn turn(stats: &PlayerStats, inventory: &Inventory, player_input: &str) -> String {
        let mut prompt = String::new();

        push_player_section(&mut prompt, stats);
        push_inventory_section(&mut prompt, inventory);
        push_player_action(&mut prompt, player_input);
        push_turn_reminder(&mut prompt);

        prompt
    }

    pub fn greeting(role: &str, goal: &str) -> String {
        format!(
            "The player has initialized as a \"{role}\" with the goal: \"{goal}\". \
Welcome them to Earth Online in Chinese. Be brief, mysterious, and lively."
        )
    }
}

fn push_player_section(prompt: &mut String, stats: &PlayerStats) {
    prompt.push_str("Current Player Stats:\n");
    prompt.push_str(&format!("Level: {}\n", stats.level));
    prompt.push_str(&format!("Role: {}\n", stats.role));
    prompt.push_str(&format!("Goal: {}\n", stats.current_goal));
    prompt.push_str(&format!("INT: {}\n", stats.int));
    prompt.push_str(&format!("STR: {}\n", stats.str));
    prompt.push_str(&format!("CHA: {}\n", stats.cha));
    prompt.push_str(&format!("Money: {}\n", stats.money));
    prompt.push_str(&format!("Fatigue: {}/{}\n", stats.fatigue, FATIGUE_MAX));
    prompt.push_str(&format!(
        "Inspiration: {}/{}\n\n",
        stats.inspiration, INSPIRATION_PER_LEVEL
    ));
}

fn push_inventory_section(prompt: &mut String, inventory: &Inventory) {
    prompt.push_str("Current Inventory: ");
    prompt.push_str(&inventory.summary());
    prompt.push_str("\n\n");
}

fn push_player_action(prompt: &mut String, input: &str) {
    prompt.push_str(&format!("User Input: \"{}\"\n\n", input.trim()));
}

fn push_turn_reminder(prompt: &mut String) {
    prompt.push_str(
        "Determine the outcome in Chinese.\n\
If the user performed a task, award stats and increase fatigue.\n\
If the user rested, decrease fatigue.\n",
    );
}

/// JSON schema the model must answer a turn with.
pub fn turn_response_schema() -> Value {
    let int = |description: &str| json!({ "type": "INTEGER", "description": description });

    json!({
        "type": "OBJECT",
        "properties": {
            "system_feedback": {
                "type": "STRING",
                "description": "The conversation response to the user in Chinese. Witty, strict, or encouraging."
            },
            "stat_changes": {
                "type": "OBJECT",
                "properties": {
                    "int": int("Change in Intelligence"),
                    "str": int("Change in Strength"),
                    "cha": int("Change in Charm"),
                    "fatigue": int("Change in Fatigue"),
                    "money": int("Change in Money"),
                    "inspiration": int("Change in Inspiration points")
                },
                "required": ["int", "str", "cha", "fatigue", "money", "inspiration"]
            },
            "inventory_updates": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "quantity_change": { "type": "INTEGER" }
                    },
                    "required": ["name", "quantity_change"]
                }
            },
            "is_level_up": {
                "type": "BOOLEAN",
                "description": "True if the inspiration gain caused a level up."
            }
        },
        "required": ["system_feedback", "stat_changes", "inventory_updates", "is_level_up"]
    })
}

/// Rewrites Gemini's uppercase `type` names into standard JSON-schema
/// spelling, for OpenAI-style servers.
pub fn to_json_schema(schema: &Value) -> Value {
    lowercase_types(schema.clone())
}

fn lowercase_types(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    let v = match (k.as_str(), v) {
                        ("type", Value::String(s)) => Value::String(s.to_lowercase()),
                        (_, v) => lowercase_types(v),
                    };
                    (k, v)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_types).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_prompt_carries_state_and_input() {
        let stats = PlayerStats {
            level: 2,
            role: "学生".into(),
            current_goal: "通过考试".into(),
            int: 5,
            fatigue: 30,
            inspiration: 12,
            money: 100,
            ..Default::default()
        };
        let mut inv = Inventory::default();
        inv.apply_update("咖啡", 2);
        inv.apply_update("笔记本", 1);

        let prompt = PromptBuilder::turn(&stats, &inv, " 背单词1小时 ");

        assert!(prompt.contains("Level: 2"));
        assert!(prompt.contains("Role: 学生"));
        assert!(prompt.contains("Goal: 通过考试"));
        assert!(prompt.contains("Fatigue: 30/100"));
        assert!(prompt.contains("Inspiration: 12/50"));
        assert!(prompt.contains("Current Inventory: 咖啡 x2, 笔记本 x1"));
        assert!(prompt.contains("User Input: \"背单词1小时\""));
    }

    #[test]
    fn greeting_names_role_and_goal() {
        let prompt = PromptBuilder::greeting("工程师", "存1万元");

        assert!(prompt.contains("\"工程师\""));
        assert!(prompt.contains("\"存1万元\""));
    }

    #[test]
    fn schema_requires_all_top_level_fields() {
        let schema = turn_response_schema();
        let required = schema["required"].as_array().unwrap();

        assert_eq!(required.len(), 4);
        assert_eq!(schema["properties"]["stat_changes"]["required"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn json_schema_uses_lowercase_types() {
        let schema = to_json_schema(&turn_response_schema());

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["inventory_updates"]["items"]["type"], "object");
        assert_eq!(schema["properties"]["is_level_up"]["type"], "boolean");
        // descriptions are untouched
        assert_eq!(
            schema["properties"]["stat_changes"]["properties"]["int"]["description"],
            "Change in Intelligence"
        );
    }
}
