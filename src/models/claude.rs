//! Anthropic Claude (Bedrock messages API) request body.

use serde_json::{json, Value};
use std::path::Path;
use tracing::debug;

use super::{Attachment, ModelRequest};
use crate::error::Result;

pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
pub const CLAUDE_MAX_TOKENS: u32 = 60_000;

#[derive(Debug, Clone)]
pub struct ClaudeRequest {
    model_id: String,
    max_tokens: u32,
    content: Vec<Value>,
}

impl ClaudeRequest {
    pub fn new(model_id: &str, prompt: &str, attachment: Option<&Path>) -> Result<Self> {
        let attachment = attachment.map(Attachment::load).transpose()?;

        let mut content = vec![json!({ "type": "text", "text": prompt })];
        match attachment {
            Some(ref a @ Attachment::Text { .. }) => {
                if let Some(text) = a.inline_text() {
                    content.push(json!({ "type": "text", "text": text }));
                }
            }
            Some(Attachment::Image { format, data, .. }) => {
                content.push(json!({
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": format.media_type(),
                        "data": data
                    }
                }));
            }
            Some(Attachment::Binary { .. }) | None => {}
        }
        debug!(model_id = %model_id, blocks = content.len(), "Claude request configured");

        Ok(Self {
            model_id: model_id.to_string(),
            max_tokens: CLAUDE_MAX_TOKENS,
            content,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

impl ModelRequest for ClaudeRequest {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn request_body(&self) -> Value {
        json!({
            "anthropic_version": ANTHROPIC_VERSION,
            "max_tokens": self.max_tokens,
            "messages": [
                {
                    "role": "user",
                    "content": self.content
                }
            ]
        })
    }
}
