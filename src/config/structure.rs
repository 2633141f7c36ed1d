use serde::{Deserialize, Serialize};

use crate::llm::EmbeddingProvider;

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct AppConfigToml {
    pub config: AppConfigInner,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfigInner {
    pub server: ServerConfig,
    pub vector: VectorConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LLMConfig,
}

impl AppConfigInner {
    /// Applies environment overrides on top of the file values so containers
    /// can inject credentials and ports without touching the config file.
    ///
    /// The lookup is injected instead of read from `std::env` directly so it
    /// can be driven from a plain map in tests.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("GROQ_API_KEY") {
            self.llm.api_key = key;
        }
        if let Some(key) = lookup("EMBEDDING_API_KEY") {
            self.embedding.api_key = key;
        }
        if let Some(host) = lookup("QDRANT_HOST") {
            self.vector.host = host;
        }
        if let Some(port) = lookup("QDRANT_PORT")
            && let Ok(port) = port.parse()
        {
            self.vector.port = Some(port);
        }
        if let Some(port) = lookup("MOVIEBOT_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VectorConfig {
    pub host: String,
    pub port: Option<u16>,
    pub https: Option<bool>,
    pub collection: String,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            https: None,
            collection: "movies".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub api_key: String,
    pub model: String,
    /// Requested embedding width; the model's native width when omitted.
    pub vector_size: Option<usize>,
    pub custom_url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            api_key: String::new(),
            model: "text-embedding-3-small".to_string(),
            vector_size: None,
            custom_url: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LLMConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "llama-3.1-8b-instant".to_string(),
            max_tokens: None,
            temperature: None,
            top_p: None,
        }
    }
}
