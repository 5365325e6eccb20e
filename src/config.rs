//! Configuration
//!
//! Everything the batcher and the inference client need is carried in an
//! explicit `Config` value. It is built from defaults, an optional JSON file
//! and environment overrides, then passed into constructors.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::batch::DEFAULT_OUTPUT_DIR;
use crate::context::budget::{TokenBudget, DEFAULT_CEILING};
use crate::error::{BatchError, Result};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_NOVA_PRO_MODEL_ID: &str = "amazon.nova-pro-v1:0";
pub const DEFAULT_CLAUDE_MODEL_ID: &str = "anthropic.claude-3-5-haiku-20241022-v1:0";
pub const DEFAULT_LLAMA_MODEL_ID: &str = "meta.llama3-3-70b-instruct-v1:0";

/// Config file looked up under the user config dir when no path is given
const CONFIG_FILE_NAME: &str = "config.json";
const APP_DIR_NAME: &str = "context-batcher";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub batcher: BatcherConfig,
    pub inference: InferenceConfig,
    pub models: ModelIds,
}

/// Batch sizing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatcherConfig {
    /// Ceiling on inflated prompt plus batch tokens
    pub ceiling: u32,
    /// Directory receiving `batch_inicial.<ext>`
    pub output_dir: PathBuf,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_CEILING,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl BatcherConfig {
    pub fn budget(&self) -> TokenBudget {
        TokenBudget::new(self.ceiling)
    }
}

/// Model invocation endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceConfig {
    pub region: String,
    /// Overrides the regional Bedrock runtime URL
    pub endpoint: Option<String>,
    /// Bearer API key; never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl InferenceConfig {
    pub fn endpoint_url(&self) -> String {
        match self.endpoint {
            Some(ref url) => url.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region),
        }
    }
}

/// Model identifiers per supported family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelIds {
    pub nova_pro: String,
    pub claude: String,
    pub llama: String,
}

impl Default for ModelIds {
    fn default() -> Self {
        Self {
            nova_pro: DEFAULT_NOVA_PRO_MODEL_ID.to_string(),
            claude: DEFAULT_CLAUDE_MODEL_ID.to_string(),
            llama: DEFAULT_LLAMA_MODEL_ID.to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, or the user config file if present, then apply the
    /// process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| BatchError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ceiling) = lookup("CONTEXT_BATCHER_CEILING") {
            self.batcher.ceiling = ceiling
                .trim()
                .parse()
                .map_err(|_| BatchError::Config(format!("CONTEXT_BATCHER_CEILING: {}", ceiling)))?;
        }
        if let Some(dir) = lookup("CONTEXT_BATCHER_OUTPUT_DIR") {
            self.batcher.output_dir = PathBuf::from(dir);
        }
        if let Some(region) = lookup("AWS_REGION") {
            self.inference.region = region;
        }
        if let Some(endpoint) = lookup("BEDROCK_ENDPOINT") {
            self.inference.endpoint = Some(endpoint);
        }
        if let Some(key) = lookup("AWS_BEARER_TOKEN_BEDROCK") {
            self.inference.api_key = Some(key);
        }
        if let Some(id) = lookup("AMAZON_NOVA_PRO_MODEL_ID") {
            self.models.nova_pro = id;
        }
        if let Some(id) = lookup("ANTHROPIC_CLAUDE_MODEL_ID") {
            self.models.claude = id;
        }
        if let Some(id) = lookup("META_LLAMA_70B_MODEL_ID") {
            self.models.llama = id;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.batcher.ceiling == 0 {
            return Err(BatchError::Config("ceiling must be greater than zero".to_string()));
        }
        if self.inference.timeout_secs == 0 {
            return Err(BatchError::Config("timeout_secs must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// `<config dir>/context-batcher/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}
