use std::fmt::Display;

use async_trait::async_trait;

use rig::{
    embeddings::{Embedding, EmbeddingError, EmbeddingModel},
    providers::{azure, cohere, gemini, openai, xai},
};
use serde::{Deserialize, Serialize};

use crate::config::structure::EmbeddingConfig;

/// Object-safe wrapper over [`rig::embeddings::EmbeddingModel`] so the
/// provider choice can stay a runtime configuration value.
#[async_trait]
pub trait DynEmbeddingModel: Send + Sync {
    async fn embed_text(&self, input: &str) -> Result<Embedding, EmbeddingError>;
    fn ndims(&self) -> usize;
}

#[async_trait]
impl<T> DynEmbeddingModel for T
where
    T: rig::embeddings::EmbeddingModel + Send + Sync,
{
    async fn embed_text(&self, input: &str) -> Result<Embedding, EmbeddingError> {
        EmbeddingModel::embed_text(self, input).await
    }

    fn ndims(&self) -> usize {
        EmbeddingModel::ndims(self)
    }
}

/// Hosted providers that serve embedding models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmbeddingProvider {
    #[serde(rename = "azure")]
    Azure,

    #[serde(rename = "cohere")]
    Cohere,

    #[serde(rename = "gemini")]
    Gemini,

    #[serde(rename = "openai")]
    #[serde(alias = "openai-api")]
    #[serde(alias = "openai-compatible")]
    OpenAI,

    #[serde(rename = "xai")]
    Xai,
}

impl Default for EmbeddingProvider {
    fn default() -> Self {
        Self::OpenAI
    }
}

impl TryFrom<String> for EmbeddingProvider {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        serde_plain::from_str(&value).map_err(|e| anyhow::anyhow!("{}", e))
    }
}

impl Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        serde_plain::to_string(self)
            .map_err(|_| std::fmt::Error)?
            .fmt(f)
    }
}

impl EmbeddingProvider {
    /// Builds the embedding model named by `config`. Cohere distinguishes
    /// query and document embeddings, so callers pass the input type they
    /// are embedding for ("search_query" or "search_document").
    pub fn model(
        &self,
        config: &EmbeddingConfig,
        input_type: &str,
    ) -> anyhow::Result<Box<dyn DynEmbeddingModel>> {
        let api_key = config.api_key.as_str();
        let custom_url = config.custom_url.as_deref();

        Ok(match self {
            EmbeddingProvider::Azure => {
                let url = custom_url
                    .ok_or(anyhow::anyhow!("Azure API requires a custom url"))?;
                let client = azure::Client::new(api_key, "2024-10-21", url);
                match config.vector_size {
                    Some(ndims) => {
                        Box::new(client.embedding_model_with_ndims(&config.model, ndims))
                    }
                    None => Box::new(client.embedding_model(&config.model)),
                }
            }
            EmbeddingProvider::Cohere => {
                let client = match custom_url {
                    None => cohere::Client::new(api_key),
                    Some(url) => cohere::Client::from_url(api_key, url),
                };
                match config.vector_size {
                    Some(ndims) => Box::new(client.embedding_model_with_ndims(
                        &config.model,
                        input_type,
                        ndims,
                    )),
                    None => Box::new(client.embedding_model(&config.model, input_type)),
                }
            }
            EmbeddingProvider::Gemini => {
                let client = match custom_url {
                    None => gemini::Client::new(api_key),
                    Some(url) => gemini::Client::from_url(api_key, url),
                };
                match config.vector_size {
                    Some(ndims) => {
                        Box::new(client.embedding_model_with_ndims(&config.model, ndims))
                    }
                    None => Box::new(client.embedding_model(&config.model)),
                }
            }
            EmbeddingProvider::OpenAI => {
                let client = match custom_url {
                    None => openai::Client::new(api_key),
                    Some(url) => openai::Client::from_url(api_key, url),
                };
                match config.vector_size {
                    Some(ndims) => {
                        Box::new(client.embedding_model_with_ndims(&config.model, ndims))
                    }
                    None => Box::new(client.embedding_model(&config.model)),
                }
            }
            EmbeddingProvider::Xai => {
                let client = xai::Client::new(api_key);
                match config.vector_size {
                    Some(ndims) => {
                        Box::new(client.embedding_model_with_ndims(&config.model, ndims))
                    }
                    None => Box::new(client.embedding_model(&config.model)),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_round_trip() {
        for (name, provider) in [
            ("openai", EmbeddingProvider::OpenAI),
            ("cohere", EmbeddingProvider::Cohere),
            ("gemini", EmbeddingProvider::Gemini),
            ("xai", EmbeddingProvider::Xai),
            ("azure", EmbeddingProvider::Azure),
        ] {
            assert_eq!(
                EmbeddingProvider::try_from(name.to_string()).unwrap(),
                provider
            );
            assert_eq!(provider.to_string(), name);
        }
    }

    #[test]
    fn openai_aliases_are_accepted() {
        assert_eq!(
            EmbeddingProvider::try_from("openai-compatible".to_string()).unwrap(),
            EmbeddingProvider::OpenAI
        );
    }

    #[test]
    fn unknown_provider_is_an_error() {
        assert!(EmbeddingProvider::try_from("groq".to_string()).is_err());
    }

    #[test]
    fn azure_requires_a_custom_url() {
        let config = EmbeddingConfig {
            provider: EmbeddingProvider::Azure,
            ..EmbeddingConfig::default()
        };

        assert!(
            EmbeddingProvider::Azure
                .model(&config, "search_query")
                .is_err()
        );
    }
}
