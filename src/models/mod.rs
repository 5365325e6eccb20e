//! Model Request Builders
//!
//! Request bodies for the supported model families. Each builder takes the
//! prompt and, optionally, a file to attach (usually the materialized batch).

pub mod claude;
pub mod llama;
pub mod nova_pro;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, error};

use crate::config::ModelIds;
use crate::error::{BatchError, Result};

pub use claude::ClaudeRequest;
pub use llama::LlamaRequest;
pub use nova_pro::NovaProRequest;

/// A model id plus the JSON body to send it
pub trait ModelRequest {
    fn model_id(&self) -> &str;
    fn request_body(&self) -> Value;

    fn request_body_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.request_body())?)
    }
}

/// Supported model families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    #[default]
    NovaPro,
    Claude,
    Llama,
}

impl ModelKind {
    pub fn model_id(self, ids: &ModelIds) -> &str {
        match self {
            ModelKind::NovaPro => &ids.nova_pro,
            ModelKind::Claude => &ids.claude,
            ModelKind::Llama => &ids.llama,
        }
    }

    /// Build the request for this family
    pub fn build_request(
        self,
        ids: &ModelIds,
        prompt: &str,
        attachment: Option<&Path>,
    ) -> Result<Box<dyn ModelRequest>> {
        let model_id = self.model_id(ids);
        Ok(match self {
            ModelKind::NovaPro => Box::new(NovaProRequest::new(model_id, prompt, attachment)?),
            ModelKind::Claude => Box::new(ClaudeRequest::new(model_id, prompt, attachment)?),
            ModelKind::Llama => Box::new(LlamaRequest::new(model_id, prompt)),
        })
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelKind::NovaPro => "nova-pro",
            ModelKind::Claude => "claude",
            ModelKind::Llama => "llama",
        })
    }
}

impl FromStr for ModelKind {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nova-pro" | "nova" => Ok(ModelKind::NovaPro),
            "claude" => Ok(ModelKind::Claude),
            "llama" => Ok(ModelKind::Llama),
            other => Err(BatchError::Config(format!("unknown model: {}", other))),
        }
    }
}

/// Image encodings accepted as attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    /// Short name, as Nova expects it
    pub fn name(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }

    /// MIME type, as Anthropic expects it
    pub fn media_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }
}

/// Extensions read as UTF-8 text and inlined into the prompt
const TEXT_EXTENSIONS: &[&str] = &["csv", "txt", "json", "jsonl"];

/// A file loaded for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    Text { file_name: String, content: String },
    Image { file_name: String, format: ImageFormat, data: String },
    /// Loaded as base64 but not representable in a message
    Binary { file_name: String, data: String },
}

impl Attachment {
    pub fn load(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let loaded = if TEXT_EXTENSIONS.contains(&extension.as_str()) {
            fs::read_to_string(path).map(|content| Attachment::Text {
                file_name: file_name.clone(),
                content,
            })
        } else {
            fs::read(path).map(|bytes| {
                let data = STANDARD.encode(bytes);
                match ImageFormat::from_extension(&extension) {
                    Some(format) => Attachment::Image { file_name: file_name.clone(), format, data },
                    None => Attachment::Binary { file_name: file_name.clone(), data },
                }
            })
        };

        match loaded {
            Ok(attachment) => {
                debug!(file = %file_name, "Attachment loaded");
                Ok(attachment)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to load attachment");
                Err(e.into())
            }
        }
    }

    /// Text block inlined after the prompt for text attachments
    pub fn inline_text(&self) -> Option<String> {
        match self {
            Attachment::Text { file_name, content } if !content.is_empty() => {
                Some(format!("\n\nContents of file {}:\n{}", file_name, content))
            }
            _ => None,
        }
    }
}
