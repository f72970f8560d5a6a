//! Response envelopes returned by every capability handler.
//!
//! Handlers build these plain types; the server converts them into rmcp
//! model types at the protocol edge.

use rmcp::model::{CallToolResult, Content, GetPromptResult, PromptMessageRole};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn as_text(&self) -> &str {
        match self {
            ContentBlock::Text { text } => text,
        }
    }
}

/// Result of a tool call. Always holds at least one block, failures included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResponse {
    pub content: Vec<ContentBlock>,
}

impl ToolResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Pretty-print `value` as the single block.
    pub fn json(value: &serde_json::Value) -> Self {
        Self::text(serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string()))
    }

    /// Text of the first block.
    pub fn first_text(&self) -> &str {
        self.content.first().map(ContentBlock::as_text).unwrap_or("")
    }
}

impl From<ToolResponse> for CallToolResult {
    fn from(response: ToolResponse) -> Self {
        let content = response
            .content
            .into_iter()
            .map(|block| match block {
                ContentBlock::Text { text } => Content::text(text),
            })
            .collect();
        CallToolResult::success(content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: ContentBlock,
}

/// Result of rendering a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub messages: Vec<PromptMessage>,
}

impl PromptResponse {
    pub fn user(description: Option<String>, text: impl Into<String>) -> Self {
        Self {
            description,
            messages: vec![PromptMessage {
                role: Role::User,
                content: ContentBlock::text(text),
            }],
        }
    }

    /// Text of the first message.
    pub fn first_text(&self) -> &str {
        self.messages
            .first()
            .map(|m| m.content.as_text())
            .unwrap_or("")
    }
}

impl From<PromptResponse> for GetPromptResult {
    fn from(response: PromptResponse) -> Self {
        let messages = response
            .messages
            .into_iter()
            .map(|message| {
                let role = match message.role {
                    Role::User => PromptMessageRole::User,
                };
                let ContentBlock::Text { text } = message.content;
                rmcp::model::PromptMessage::new_text(role, text)
            })
            .collect();
        GetPromptResult {
            description: response.description,
            messages,
        }
    }
}
