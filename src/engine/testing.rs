//! Scripted model for engine tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use crate::engine::llm_client::{LlmBackend, LlmError};

/// Replays queued answers in order. An empty queue behaves like a dead host.
#[derive(Default)]
pub struct ScriptedBackend {
    json: Mutex<VecDeque<String>>,
    text: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn with_json(self, raw: &str) -> Self {
        self.json.lock().unwrap().push_back(raw.to_string());
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.text.lock().unwrap().push_back(text.to_string());
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn record(&self, prompt: &str) {
        self.prompts.lock().unwrap().push(prompt.to_string());
    }
}

impl LlmBackend for ScriptedBackend {
    fn generate_json(&self, _system: &str, prompt: &str, _schema: &Value) -> Result<String, LlmError> {
        self.record(prompt);
        self.json.lock().unwrap().pop_front().ok_or(LlmError::EmptyResponse)
    }

    fn generate_text(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
        self.record(prompt);
        self.text.lock().unwrap().pop_front().ok_or(LlmError::EmptyResponse)
    }

    fn test_connection(&self) -> Result<String, LlmError> {
        Ok("Connected (1 models available)".to_string())
    }
}
