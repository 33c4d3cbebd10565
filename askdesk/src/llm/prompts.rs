//! Prompt templates for query rewriting, answer generation, and tagging.

/// Appended after the replayed conversation to turn the exchange into a
/// standalone retrieval query.
pub const QUERY_TRANSFORM_INSTRUCTION: &str = "Given the above conversation, generate a search \
query to look up in order to get information relevant to the conversation. Only respond with \
the query, nothing else.";

/// System prompt used when the answer should stay conversational.
pub const CONVERSATIONAL_ANSWER_SYSTEM: &str =
    "Answer the user's questions based on the below context:\n\n{context}";

/// Prompt for the precise answer style: grounded in the retrieved context and
/// capped at five sentences.
pub fn precise_answer_prompt(question: &str, context: &str) -> String {
    format!(
        "Answer the following question incorporating the following context:\n\
         <context>\n\
         {context}\n\
         </context>\n\
         \n\
         The answer should be precise and professional, and no longer than 5 sentences.\n\
         \n\
         Question: {question}"
    )
}

/// Fill the conversational system prompt with the retrieved context.
pub fn conversational_answer_system(context: &str) -> String {
    CONVERSATIONAL_ANSWER_SYSTEM.replace("{context}", context)
}

/// Prompt for classifying a document into one of the known metadata tags.
/// The model must answer with bare JSON so the caller can parse it directly.
pub fn metadata_tag_prompt(document: &str) -> String {
    format!(
        "Classify the following document as either describing internal company policies or \
         an insurance product. Respond with JSON only, in the form \
         {{\"type\": \"internal_policies\"}} or {{\"type\": \"insurance_product\"}}. \
         Do not include any other text.\n\
         \n\
         Document:\n\
         {document}"
    )
}

/// Prompt for masking sensitive fields in a JSON document. The model must
/// return the transformed document as bare JSON.
pub fn pii_mask_prompt(document: &str) -> String {
    format!(
        "The input below is a JSON document. Scan it, identify all occurrences of sensitive \
         information such as phone numbers, ids, addresses, or emails, and mask them with a \
         placeholder: for an id, replace the last four digits with 'xxxx'; for a phone number \
         use 'xxx-xxx-xxxx'; for an email use 'xxxx@xxxx.xxxx'; for anything else use \
         'xxxxxxxx'. Return the transformed document as a JSON object with all property names \
         in double quotes, and no other text.\n\
         \n\
         Input:\n\
         {document}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precise_prompt_embeds_context_and_question() {
        let prompt = precise_answer_prompt("What is covered?", "Policy covers water damage.");
        assert!(prompt.contains("<context>\nPolicy covers water damage.\n</context>"));
        assert!(prompt.ends_with("Question: What is covered?"));
        assert!(prompt.contains("no longer than 5 sentences"));
    }

    #[test]
    fn test_pii_prompt_embeds_document() {
        let prompt = pii_mask_prompt(r#"{"phone": "555-0100"}"#);
        assert!(prompt.ends_with(r#"Input:
{"phone": "555-0100"}"#));
        assert!(prompt.contains("xxx-xxx-xxxx"));
    }

    #[test]
    fn test_conversational_system_substitutes_context() {
        let prompt = conversational_answer_system("ctx here");
        assert!(prompt.ends_with("ctx here"));
        assert!(!prompt.contains("{context}"));
    }
}
