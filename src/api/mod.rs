use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// Body of a successful completion response.
///
/// Kept as raw JSON: any well-formed body is accepted, and a missing or
/// oddly shaped `choices[0].message.content` simply means there is no reply.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct ChatCompletionResponse(serde_json::Value);

impl ChatCompletionResponse {
    /// Trimmed text of the first choice, if there is any non-blank text.
    pub fn first_reply(&self) -> Option<String> {
        self.0
            .pointer("/choices/0/message/content")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned)
    }
}
