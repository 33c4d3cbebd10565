use std::sync::Arc;

use serde_json::Value;

use crate::error::{AskdeskError, Result};
use crate::llm::{prompts, LlmProvider};

/// Normalize masker input to the text handed to the masking prompt. Same
/// contract as the tagger: strings pass through, objects are serialized.
pub fn mask_input_text(input: &Value) -> Result<String> {
    match input {
        Value::String(text) => Ok(text.clone()),
        Value::Object(_) => Ok(input.to_string()),
        _ => Err(AskdeskError::Validation(
            "Masker input must be a string or a JSON object".to_string(),
        )),
    }
}

/// LLM-backed masking of sensitive fields (phone numbers, ids, addresses,
/// emails) in a JSON document.
#[derive(Clone)]
pub struct PiiMasker {
    llm: Arc<LlmProvider>,
}

impl PiiMasker {
    pub fn new(llm: Arc<LlmProvider>) -> Self {
        Self { llm }
    }

    /// Returns the document with sensitive values replaced by placeholders.
    pub async fn mask(&self, input: &Value) -> Result<Value> {
        let text = mask_input_text(input)?;
        let prompt = prompts::pii_mask_prompt(&text);

        let masked = self.llm.json_completion(&prompt).await?;

        if !masked.is_object() {
            return Err(AskdeskError::Llm(
                "Masker response is not a JSON object".to_string(),
            ));
        }

        Ok(masked)
    }
}
