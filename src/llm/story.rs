use futures::{StreamExt, stream::BoxStream};
use genai::{
    Client, ModelIden, ServiceTarget,
    adapter::AdapterKind,
    chat::{ChatMessage, ChatOptions, ChatRequest, ChatStreamEvent},
    resolver::{AuthData, Endpoint, ServiceTargetResolver},
};

use crate::config::structure::LLMConfig;

const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/";

const SYSTEM_PROMPT: &str = "You are a chatbot, follow instructions";

/// Streaming completion client that rewrites a movie plot as a short story
/// with a vector database as the protagonist.
pub struct StoryTeller {
    client: Client,
    model: String,
    options: ChatOptions,
}

impl StoryTeller {
    pub fn new(config: &LLMConfig) -> Self {
        let api_key = config.api_key.clone();

        // Pin every request to Groq's OpenAI-compatible endpoint with the
        // configured key, regardless of how genai would map the model name.
        let target_resolver = ServiceTargetResolver::from_resolver_fn(
            move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                let ServiceTarget { model, .. } = target;

                Ok(ServiceTarget {
                    endpoint: Endpoint::from_static(GROQ_ENDPOINT),
                    auth: AuthData::from_single(api_key.clone()),
                    model: ModelIden::new(AdapterKind::Groq, model.model_name),
                })
            },
        );

        let client = Client::builder()
            .with_service_target_resolver(target_resolver)
            .build();

        let mut options = ChatOptions::default().with_max_tokens(config.max_tokens.unwrap_or(150));
        if let Some(temperature) = config.temperature {
            options = options.with_temperature(temperature);
        }
        if let Some(top_p) = config.top_p {
            options = options.with_top_p(top_p);
        }

        Self {
            client,
            model: config.model.clone(),
            options,
        }
    }

    /// Streams the generated story for `plot`, one text chunk per item.
    /// Empty chunks are dropped.
    pub async fn stream_story(
        &self,
        plot: &str,
    ) -> anyhow::Result<BoxStream<'static, anyhow::Result<String>>> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(story_prompt(plot)),
        ]);

        let response = self
            .client
            .exec_chat_stream(&self.model, request, Some(&self.options))
            .await?;

        Ok(response
            .stream
            .filter_map(|event| async move {
                match event {
                    Ok(ChatStreamEvent::Chunk(chunk)) => {
                        (!chunk.content.trim().is_empty()).then_some(Ok(chunk.content))
                    }
                    Ok(_) => None,
                    Err(e) => Some(Err(anyhow::anyhow!(e))),
                }
            })
            .boxed())
    }
}

fn story_prompt(plot: &str) -> String {
    format!(
        "Max 100 words. Rewrite the following movie plot as if it were a story \
         about a blazing-fast vector database. Treat the database as the \
         protagonist. Keep the spirit and structure of the movie, but make it \
         fit the database world. Don't mention any real databases by name. \
         The plot: {plot}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_the_plot() {
        let prompt = story_prompt("A heist goes sideways in Monaco.");

        assert!(prompt.starts_with("Max 100 words."));
        assert!(prompt.ends_with("The plot: A heist goes sideways in Monaco."));
    }

    #[test]
    fn default_token_budget_is_applied() {
        let config = LLMConfig::default();
        let teller = StoryTeller::new(&config);

        assert_eq!(teller.options.max_tokens, Some(150));
    }
}
