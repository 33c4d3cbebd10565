use std::sync::Arc;

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;

use crate::config::LlmConfig;
use crate::error::{AskdeskError, Result};
use crate::models::{ConversationTurn, Role};

use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
};

use super::api::{assistant_message, user_message, CompletionOptions, LlmApiClient};
use super::{prompts, AnswerGenerator, AnswerStream, QueryRewriter};

/// Routes completion calls to whichever configured model the toggle selects.
///
/// Both model slots get a client eagerly so a bad configuration fails at
/// startup rather than mid-conversation.
#[derive(Clone)]
pub struct LlmProvider {
    config: Arc<LlmConfig>,
    primary: LlmApiClient,
    secondary: LlmApiClient,
}

impl LlmProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let primary = LlmApiClient::new(config, &config.primary_model)?;
        let secondary = LlmApiClient::new(config, &config.secondary_model)?;

        Ok(Self {
            config: Arc::new(config.clone()),
            primary,
            secondary,
        })
    }

    pub fn primary_model(&self) -> &str {
        &self.config.primary_model
    }

    pub fn secondary_model(&self) -> &str {
        &self.config.secondary_model
    }

    /// Resolve a chat model id to one of the configured clients. Unknown ids
    /// are a validation error; the toggle endpoint only hands out known ones.
    fn client_for(&self, chat_model: &str) -> Result<&LlmApiClient> {
        if chat_model == self.config.primary_model {
            Ok(&self.primary)
        } else if chat_model == self.config.secondary_model {
            Ok(&self.secondary)
        } else {
            Err(AskdeskError::Validation(format!(
                "Unknown chat model: {chat_model}"
            )))
        }
    }

    /// Run a prompt against the primary model, returning the parsed JSON.
    /// Used by the classification and masking utilities.
    pub async fn json_completion(&self, prompt: &str) -> Result<serde_json::Value> {
        let options = CompletionOptions {
            temperature: Some(0.0),
            ..Default::default()
        };
        self.primary.complete_json(prompt, Some(&options)).await
    }
}

#[async_trait]
impl QueryRewriter for LlmProvider {
    async fn rewrite(&self, turns: &[ConversationTurn], chat_model: &str) -> Result<String> {
        if turns.is_empty() {
            return Err(AskdeskError::Validation(
                "Cannot rewrite an empty conversation".to_string(),
            ));
        }

        let client = self.client_for(chat_model)?;

        // Replay the conversation as-is, then ask for the standalone query.
        let mut messages = Vec::with_capacity(turns.len() + 1);
        for turn in turns {
            let message = match turn.role {
                Role::User => user_message(&turn.content)?,
                Role::Assistant => assistant_message(&turn.content)?,
            };
            messages.push(message);
        }
        messages.push(user_message(prompts::QUERY_TRANSFORM_INSTRUCTION)?);

        let options = CompletionOptions {
            temperature: Some(0.0),
            ..Default::default()
        };

        let rewritten = client.complete_messages(messages, Some(&options)).await?;
        Ok(rewritten.trim().to_string())
    }
}

#[async_trait]
impl AnswerGenerator for LlmProvider {
    async fn stream_answer(
        &self,
        question: &str,
        context: &str,
        chat_model: &str,
    ) -> Result<AnswerStream> {
        let client = self.client_for(chat_model)?;

        // The primary slot answers in the precise, length-capped style; the
        // secondary slot answers conversationally from a system prompt.
        let messages: Vec<ChatCompletionRequestMessage> =
            if chat_model == self.config.secondary_model {
                let system = ChatCompletionRequestSystemMessageArgs::default()
                    .content(prompts::conversational_answer_system(context))
                    .build()
                    .map_err(|error| {
                        AskdeskError::Validation(format!("Invalid system prompt: {error}"))
                    })?
                    .into();
                vec![system, user_message(question)?]
            } else {
                let prompt = prompts::precise_answer_prompt(question, context);
                vec![user_message(&prompt)?]
            };

        let options = CompletionOptions {
            temperature: Some(self.config.answer_temperature),
            ..Default::default()
        };

        let mut upstream = client.stream_messages(messages, Some(&options)).await?;

        let fragments = stream! {
            while let Some(chunk) = upstream.next().await {
                match chunk {
                    Ok(response) => {
                        for choice in response.choices {
                            if let Some(content) = choice.delta.content {
                                if !content.is_empty() {
                                    yield Ok(content);
                                }
                            }
                        }
                    }
                    Err(error) => {
                        yield Err(LlmApiClient::map_openai_error(error));
                        return;
                    }
                }
            }
        };

        Ok(Box::pin(fragments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> LlmConfig {
        LlmConfig {
            primary_model: "ollama/llama3".to_string(),
            secondary_model: "ollama/llama3.1".to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 30,
            max_retries: 0,
            answer_temperature: 0.05,
            rewrite_cache_size: 0,
        }
    }

    #[test]
    fn test_client_resolution() {
        let provider = LlmProvider::new(&test_config()).unwrap();

        assert!(provider.client_for("ollama/llama3").is_ok());
        assert!(provider.client_for("ollama/llama3.1").is_ok());
        assert!(matches!(
            provider.client_for("openai/gpt-4o"),
            Err(AskdeskError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_rewrite_rejects_empty_history() {
        let provider = LlmProvider::new(&test_config()).unwrap();

        let result = provider.rewrite(&[], "ollama/llama3").await;
        assert!(matches!(result, Err(AskdeskError::Validation(_))));
    }
}
