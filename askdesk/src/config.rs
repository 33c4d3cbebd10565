use serde::Deserialize;
use std::env;

use crate::models::EmbeddingBackend;
use crate::search::MissingFieldPolicy;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub embeddings: EmbeddingsConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
}

/// Vector index configuration.
///
/// `result_limit` and `num_candidates` are the knobs the retrieval stage
/// passes through to the index (13 rows with a candidate pool of 3 in the
/// shipped setup); they are not structural constants.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub url: String,
    pub collection: String,
    /// Payload field holding the retrievable text used for grounding.
    pub context_field: String,
    /// Additional payload fields returned alongside the context field.
    pub extra_fields: Vec<String>,
    pub result_limit: u64,
    pub num_candidates: u64,
    pub missing_field_policy: MissingFieldPolicy,
    /// Bounded wait for the index to become reachable at startup.
    pub ready_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub openai: RemoteEmbeddingConfig,
    pub huggingface: RemoteEmbeddingConfig,
    pub default_backend: EmbeddingBackend,
}

/// One remote embedding backend (OpenAI-compatible or Hugging Face Inference).
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEmbeddingConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

/// LLM configuration for the chat/completion models.
///
/// Two model slots are configured; the active one is selected at runtime by
/// the chat-model toggle endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub primary_model: String,
    pub secondary_model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub answer_temperature: f32,
    // Cache size for query rewrite results
    pub rewrite_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("ASKDESK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("ASKDESK_PORT", 5000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:askdesk.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
            },
            search: SearchConfig {
                url: env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6334".to_string()),
                collection: env::var("QDRANT_COLLECTION").unwrap_or_else(|_| "products".to_string()),
                context_field: env::var("CONTEXT_FIELD")
                    .unwrap_or_else(|_| "assembled_for_embedding".to_string()),
                extra_fields: env::var("SEARCH_EXTRA_FIELDS")
                    .map(|raw| {
                        raw.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_else(|_| vec!["source".to_string()]),
                result_limit: parse_env_or("SEARCH_RESULT_LIMIT", 13),
                num_candidates: parse_env_or("SEARCH_NUM_CANDIDATES", 3),
                missing_field_policy: parse_env_or("CONTEXT_MISSING_FIELD", MissingFieldPolicy::Fail),
                ready_timeout_secs: parse_env_or("STORE_READY_TIMEOUT_SECS", 5),
            },
            embeddings: EmbeddingsConfig {
                openai: RemoteEmbeddingConfig {
                    model: env::var("EMBEDDING_MODEL")
                        .unwrap_or_else(|_| "text-embedding-ada-002".to_string()),
                    api_key: env::var("OPENAI_API_KEY").ok(),
                    base_url: env::var("EMBEDDING_BASE_URL")
                        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                    timeout_secs: parse_env_or("EMBEDDING_TIMEOUT", 30),
                    max_retries: parse_env_or("EMBEDDING_MAX_RETRIES", 3),
                },
                huggingface: RemoteEmbeddingConfig {
                    model: env::var("HF_EMBEDDING_MODEL")
                        .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string()),
                    api_key: env::var("HF_API_KEY").ok(),
                    base_url: env::var("HF_BASE_URL")
                        .unwrap_or_else(|_| "https://api-inference.huggingface.co".to_string()),
                    timeout_secs: parse_env_or("HF_TIMEOUT", 30),
                    max_retries: parse_env_or("HF_MAX_RETRIES", 3),
                },
                default_backend: parse_env_or("DEFAULT_EMBEDDING_BACKEND", EmbeddingBackend::OpenAi),
            },
            llm: LlmConfig {
                primary_model: env::var("LLM_MODEL").unwrap_or_else(|_| "openai/gpt-4o".to_string()),
                secondary_model: env::var("LLM_SECONDARY_MODEL")
                    .unwrap_or_else(|_| "openai/gpt-4o-mini".to_string()),
                api_key: env::var("LLM_API_KEY").ok().or_else(|| env::var("OPENAI_API_KEY").ok()),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 30),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 3),
                answer_temperature: parse_env_or("LLM_ANSWER_TEMPERATURE", 0.05),
                rewrite_cache_size: parse_env_or("QUERY_REWRITE_CACHE_SIZE", 1000),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}
