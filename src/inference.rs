//! Model Invocation
//!
//! Blocking HTTP client for the Bedrock runtime `invoke` endpoint. One call
//! per request: no retry, no streaming.

use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::InferenceConfig;
use crate::error::{BatchError, Result};

/// Something that turns a model id and request body into generated text
pub trait InferenceService {
    fn invoke(&self, model_id: &str, body: &Value) -> Result<String>;
}

/// Bedrock runtime client
#[derive(Clone)]
pub struct BedrockClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BedrockClient {
    pub fn new(config: &InferenceConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: config.endpoint_url(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn invoke_url(&self, model_id: &str) -> String {
        format!("{}/model/{}/invoke", self.base_url, model_id)
    }
}

impl InferenceService for BedrockClient {
    fn invoke(&self, model_id: &str, body: &Value) -> Result<String> {
        debug!(model_id = %model_id, "Invoking model");

        let mut request = self
            .http
            .post(self.invoke_url(model_id))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().map_err(|e| {
            error!(model_id = %model_id, error = %e, "Model invocation failed");
            BatchError::from(e)
        })?;

        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            error!(model_id = %model_id, status = %status, "Model invocation rejected");
            return Err(BatchError::Inference(format!("{} ({}): {}", model_id, status, text)));
        }

        let response: Value = serde_json::from_str(&text).map_err(|e| {
            error!(model_id = %model_id, error = %e, "Unparseable model response");
            BatchError::Inference(format!("invalid response body: {}", e))
        })?;

        let generated = extract_generated_text(&response)?;
        info!(model_id = %model_id, chars = generated.len(), "Model invocation complete");
        Ok(generated)
    }
}

/// Pull the generated text out of a provider response.
///
/// Anthropic: `content[0].text`. Nova: `output.message.content[0].text`.
/// Llama: `generation`.
pub fn extract_generated_text(response: &Value) -> Result<String> {
    let text = response
        .pointer("/output/message/content/0/text")
        .or_else(|| response.pointer("/content/0/text"))
        .or_else(|| response.get("generation"))
        .and_then(Value::as_str);

    match text {
        Some(t) => Ok(t.to_string()),
        None => {
            error!("Model response has no generated text");
            Err(BatchError::Inference(format!(
                "unrecognized response shape: {}",
                truncate(&response.to_string(), 200)
            )))
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}
