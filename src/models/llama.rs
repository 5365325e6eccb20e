//! Meta Llama request body. Text only; attachments are not supported.

use serde_json::{json, Value};

use super::ModelRequest;

pub const LLAMA_MAX_GEN_LEN: u32 = 2048;

#[derive(Debug, Clone)]
pub struct LlamaRequest {
    model_id: String,
    prompt: String,
    max_gen_len: u32,
    temperature: f64,
    top_p: f64,
}

impl LlamaRequest {
    pub fn new(model_id: &str, prompt: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            prompt: prompt.to_string(),
            max_gen_len: LLAMA_MAX_GEN_LEN,
            temperature: 0.2,
            top_p: 0.9,
        }
    }
}

impl ModelRequest for LlamaRequest {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn request_body(&self) -> Value {
        json!({
            "prompt": self.prompt,
            "max_gen_len": self.max_gen_len,
            "temperature": self.temperature,
            "top_p": self.top_p
        })
    }
}
