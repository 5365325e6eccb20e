//! Invocation Handler
//!
//! Event in, structured response out. Any failure along the way becomes a
//! 500 response carrying the error message.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::batcher::ContextBatcher;
use crate::config::Config;
use crate::context::tokens::count_tokens;
use crate::error::Result;
use crate::inference::InferenceService;
use crate::models::ModelKind;
use crate::prompt::PromptTemplate;

/// Incoming invocation event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvocationEvent {
    /// Text embedded into the prompt template
    pub context: Option<String>,
    /// Context file to batch and attach
    pub context_path: Option<PathBuf>,
    pub model: ModelKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: Value,
}

impl HandlerResponse {
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Handle one event end to end.
pub fn handle(event: &InvocationEvent, config: &Config, service: &dyn InferenceService) -> HandlerResponse {
    info!(model = %event.model, "Invocation started");
    debug!(event = ?event, "Event");

    match run(event, config, service) {
        Ok(data) => HandlerResponse {
            status_code: 200,
            body: json!({
                "message": "File processed and saved successfully.",
                "data": data,
            }),
        },
        Err(e) => {
            error!(error = %e, "Invocation failed");
            HandlerResponse {
                status_code: 500,
                body: json!({
                    "error": e.to_string(),
                    "message": "Error processing files",
                }),
            }
        }
    }
}

fn run(event: &InvocationEvent, config: &Config, service: &dyn InferenceService) -> Result<Map<String, Value>> {
    let prompt = PromptTemplate::new(event.context.as_deref().unwrap_or_default());
    debug!(prompt_tokens = count_tokens(prompt.text()), "Prompt generated");

    let batcher = ContextBatcher::new(&config.batcher, prompt.text(), event.context_path.as_deref())?;

    let request = event
        .model
        .build_request(&config.models, prompt.text(), batcher.batch_path())?;
    let body = request.request_body();
    debug!(
        model_id = %request.model_id(),
        request_tokens = count_tokens(&body.to_string()),
        "Request body size"
    );

    let generated = service.invoke(request.model_id(), &body)?;

    let mut data = Map::new();
    data.insert(request.model_id().to_string(), Value::String(generated));
    Ok(data)
}
