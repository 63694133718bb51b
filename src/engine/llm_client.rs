use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::engine::prompt_builder::to_json_schema;

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_LM_STUDIO_ENDPOINT: &str = "http://localhost:1234/v1";

/// Checked when the configured variable is unset.
const FALLBACK_KEY_VAR: &str = "API_KEY";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key not configured (set {0})")]
    NoApiKey(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("no response from model")]
    EmptyResponse,

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("model client unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Gemini,
    /// LM Studio and other `/v1/chat/completions` servers.
    OpenAiCompatible,
}

impl LlmProvider {
    pub fn label(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "Gemini",
            LlmProvider::OpenAiCompatible => "OpenAI-compatible (LM Studio)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    /// Name of the environment variable holding the key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            endpoint: DEFAULT_GEMINI_ENDPOINT.into(),
            model: DEFAULT_GEMINI_MODEL.into(),
            temperature: 0.7,
            api_key_env: "GEMINI_API_KEY".into(),
            timeout_secs: 60,
        }
    }
}

impl LlmSettings {
    pub fn lm_studio() -> Self {
        Self {
            provider: LlmProvider::OpenAiCompatible,
            endpoint: DEFAULT_LM_STUDIO_ENDPOINT.into(),
            model: "local-model".into(),
            api_key_env: String::new(),
            ..Self::default()
        }
    }

    fn api_key(&self) -> Option<String> {
        let from = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let name = self.api_key_env.trim();
        (!name.is_empty())
            .then(|| from(name))
            .flatten()
            .or_else(|| from(FALLBACK_KEY_VAR))
    }
}

/// A hosted or local language model.
pub trait LlmBackend: Send {
    /// Completion constrained to `schema`; returns the raw JSON text.
    fn generate_json(&self, system: &str, prompt: &str, schema: &Value) -> Result<String, LlmError>;

    fn generate_text(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    fn test_connection(&self) -> Result<String, LlmError>;
}

/// Builds the HTTP client for `settings`, or a stand-in that fails every
/// request so the game still falls back gracefully.
pub fn build_backend(settings: LlmSettings) -> Box<dyn LlmBackend> {
    match HttpLlmClient::new(settings) {
        Ok(client) => Box::new(client),
        Err(e) => {
            tracing::error!(error = %e, "could not build model client");
            Box::new(UnavailableBackend(e.to_string()))
        }
    }
}

struct UnavailableBackend(String);

impl LlmBackend for UnavailableBackend {
    fn generate_json(&self, _: &str, _: &str, _: &Value) -> Result<String, LlmError> {
        Err(LlmError::Unavailable(self.0.clone()))
    }

    fn generate_text(&self, _: &str, _: &str) -> Result<String, LlmError> {
        Err(LlmError::Unavailable(self.0.clone()))
    }

    fn test_connection(&self) -> Result<String, LlmError> {
        Err(LlmError::Unavailable(self.0.clone()))
    }
}

pub struct HttpLlmClient {
    http: Client,
    settings: LlmSettings,
}

impl HttpLlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self { http, settings })
    }

    fn endpoint(&self) -> &str {
        self.settings.endpoint.trim_end_matches('/')
    }

    fn require_key(&self) -> Result<String, LlmError> {
        self.settings
            .api_key()
            .ok_or_else(|| LlmError::NoApiKey(self.settings.api_key_env.clone()))
    }

    fn post_json(&self, url: &str, body: &Value, key: Option<KeyHeader>) -> Result<Value, LlmError> {
        let req = with_key(self.http.post(url).json(body), key);
        read_body(req.send()?)
    }

    fn get_json(&self, url: &str, key: Option<KeyHeader>) -> Result<Value, LlmError> {
        let req = with_key(self.http.get(url), key);
        read_body(req.send()?)
    }

    fn gemini_generate(&self, system: &str, prompt: &str, schema: Option<&Value>) -> Result<String, LlmError> {
        let key = self.require_key()?;
        let url = format!("{}/models/{}:generateContent", self.endpoint(), self.settings.model);

        let mut generation_config = json!({ "temperature": self.settings.temperature });
        if let Some(schema) = schema {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseSchema"] = schema.clone();
        }

        let body = json!({
            "systemInstruction": { "parts": [{ "text": system }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": generation_config,
        });

        tracing::debug!(model = %self.settings.model, "gemini generateContent");
        let resp: GeminiResponse = serde_json::from_value(self.post_json(&url, &body, Some(KeyHeader::Google(key)))?)
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        resp.text().ok_or(LlmError::EmptyResponse)
    }

    fn chat_completion(&self, system: &str, prompt: &str, schema: Option<&Value>) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.endpoint());

        let req = ChatCompletionRequest {
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: prompt.to_string(),
                },
            ],
            response_format: schema.map(|schema| {
                json!({
                    "type": "json_schema",
                    "json_schema": { "name": "turn_response", "schema": schema }
                })
            }),
        };

        let body = serde_json::to_value(&req).map_err(|e| LlmError::Parse(e.to_string()))?;
        let key = self.settings.api_key().map(KeyHeader::Bearer);

        tracing::debug!(model = %self.settings.model, "chat completion");
        let resp: ChatCompletionResponse = serde_json::from_value(self.post_json(&url, &body, key)?)
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

enum KeyHeader {
    Google(String),
    Bearer(String),
}

fn with_key(req: RequestBuilder, key: Option<KeyHeader>) -> RequestBuilder {
    match key {
        Some(KeyHeader::Google(k)) => req.header("x-goog-api-key", k),
        Some(KeyHeader::Bearer(k)) => req.bearer_auth(k),
        None => req,
    }
}

fn read_body(resp: Response) -> Result<Value, LlmError> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().unwrap_or_default();
        return Err(LlmError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp.json()?)
}

impl LlmBackend for HttpLlmClient {
    fn generate_json(&self, system: &str, prompt: &str, schema: &Value) -> Result<String, LlmError> {
        match self.settings.provider {
            LlmProvider::Gemini => self.gemini_generate(system, prompt, Some(schema)),
            LlmProvider::OpenAiCompatible => {
                let schema = to_json_schema(schema);
                self.chat_completion(system, prompt, Some(&schema))
            }
        }
    }

    fn generate_text(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        match self.settings.provider {
            LlmProvider::Gemini => self.gemini_generate(system, prompt, None),
            LlmProvider::OpenAiCompatible => self.chat_completion(system, prompt, None),
        }
    }

    fn test_connection(&self) -> Result<String, LlmError> {
        let url = format!("{}/models", self.endpoint());

        let (resp, list_key) = match self.settings.provider {
            LlmProvider::Gemini => (
                self.get_json(&url, Some(KeyHeader::Google(self.require_key()?)))?,
                "models",
            ),
            LlmProvider::OpenAiCompatible => (
                self.get_json(&url, self.settings.api_key().map(KeyHeader::Bearer))?,
                "data",
            ),
        };

        Ok(format!(
            "Connected ({} models available)",
            resp[list_key].as_array().map(|a| a.len()).unwrap_or(0)
        ))
    }
}

/* =========================
   Gemini wire types
   ========================= */

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

impl GeminiResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/* =========================
   OpenAI-compatible wire types
   ========================= */

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}
