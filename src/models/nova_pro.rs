//! Amazon Nova Pro request body.

use serde_json::{json, Value};
use std::path::Path;
use tracing::debug;

use super::{Attachment, ModelRequest};
use crate::error::Result;

pub const NOVA_PRO_MAX_TOKENS: u32 = 10_000;

#[derive(Debug, Clone)]
pub struct NovaProRequest {
    model_id: String,
    max_tokens: u32,
    content: Vec<Value>,
}

impl NovaProRequest {
    pub fn new(model_id: &str, prompt: &str, attachment: Option<&Path>) -> Result<Self> {
        let attachment = attachment.map(Attachment::load).transpose()?;
        let content = build_content(prompt, attachment.as_ref());
        debug!(model_id = %model_id, blocks = content.len(), "Nova Pro request configured");

        Ok(Self {
            model_id: model_id.to_string(),
            max_tokens: NOVA_PRO_MAX_TOKENS,
            content,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

fn build_content(prompt: &str, attachment: Option<&Attachment>) -> Vec<Value> {
    let mut content = vec![json!({ "text": prompt })];

    match attachment {
        Some(a @ Attachment::Text { .. }) => {
            if let Some(text) = a.inline_text() {
                content.push(json!({ "text": text }));
            }
        }
        Some(Attachment::Image { format, data, .. }) => {
            content.push(json!({
                "image": {
                    "format": format.name(),
                    "source": { "bytes": data }
                }
            }));
        }
        Some(Attachment::Binary { .. }) | None => {}
    }

    content
}

impl ModelRequest for NovaProRequest {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn request_body(&self) -> Value {
        json!({
            "inferenceConfig": {
                "max_new_tokens": self.max_tokens
            },
            "messages": [
                {
                    "role": "user",
                    "content": self.content
                }
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_prompt_only_body() {
        let request = NovaProRequest::new("amazon.nova-pro-v1:0", "hello there", None).unwrap();
        let body = request.request_body();

        assert_eq!(request.model_id(), "amazon.nova-pro-v1:0");
        assert_eq!(body["inferenceConfig"]["max_new_tokens"], 10_000);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], json!([{ "text": "hello there" }]));
    }

    #[test]
    fn test_text_attachment_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch_inicial.csv");
        fs::write(&path, "name\nana\n").unwrap();

        let request = NovaProRequest::new("m", "p", Some(&path)).unwrap().with_max_tokens(50);
        let body = request.request_body();
        let content = body["messages"][0]["content"].as_array().unwrap();

        assert_eq!(content.len(), 2);
        assert_eq!(content[1]["text"], "\n\nContents of file batch_inicial.csv:\nname\nana\n");
        assert_eq!(body["inferenceConfig"]["max_new_tokens"], 50);
    }

    #[test]
    fn test_image_attachment_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.png");
        fs::write(&path, b"png").unwrap();

        let request = NovaProRequest::new("m", "p", Some(&path)).unwrap();
        let body = request.request_body();
        let image = &body["messages"][0]["content"][1]["image"];
        assert_eq!(image["format"], "png");
        assert_eq!(image["source"]["bytes"], "cG5n");
    }

    #[test]
    fn test_binary_attachment_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        fs::write(&path, b"%PDF").unwrap();

        let request = NovaProRequest::new("m", "p", Some(&path)).unwrap();
        assert_eq!(request.request_body()["messages"][0]["content"].as_array().unwrap().len(), 1);
    }
}
