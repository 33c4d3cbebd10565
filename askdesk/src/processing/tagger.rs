use std::sync::Arc;

use serde_json::Value;

use crate::error::{AskdeskError, Result};
use crate::llm::{prompts, LlmProvider};

/// Labels the classifier may return.
pub const METADATA_TAG_LABELS: &[&str] = &["internal_policies", "insurance_product"];

/// Normalize tagger input to the text handed to the classifier prompt.
/// Strings pass through; objects are serialized; anything else is rejected.
pub fn tag_input_text(input: &Value) -> Result<String> {
    match input {
        Value::String(text) => Ok(text.clone()),
        Value::Object(_) => Ok(input.to_string()),
        _ => Err(AskdeskError::Validation(
            "Tagger input must be a string or a JSON object".to_string(),
        )),
    }
}

/// LLM-backed document classifier for the metadata-tag endpoint.
#[derive(Clone)]
pub struct MetadataTagger {
    llm: Arc<LlmProvider>,
}

impl MetadataTagger {
    pub fn new(llm: Arc<LlmProvider>) -> Self {
        Self { llm }
    }

    pub async fn tag(&self, input: &Value) -> Result<String> {
        let text = tag_input_text(input)?;
        let prompt = prompts::metadata_tag_prompt(&text);

        let response = self.llm.json_completion(&prompt).await?;

        let label = response
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AskdeskError::Llm("Classifier response missing 'type' field".to_string())
            })?;

        if !METADATA_TAG_LABELS.contains(&label) {
            return Err(AskdeskError::Llm(format!(
                "Classifier returned unknown label: {label}"
            )));
        }

        Ok(label.to_string())
    }
}
