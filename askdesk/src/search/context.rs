use serde_json::Value;

use crate::error::{AskdeskError, Result};
use crate::models::SearchHit;

use super::MissingFieldPolicy;

/// Grounding material assembled from a search result, in hit order.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContext {
    /// Context-field values joined for the answer prompt.
    pub context: String,
    pub document_ids: Vec<String>,
    /// Full payloads of the hits that contributed to the context.
    pub documents: Vec<Value>,
}

impl AssembledContext {
    pub fn is_empty(&self) -> bool {
        self.document_ids.is_empty()
    }
}

/// Join the context field of each hit into one prompt-ready block.
///
/// Hits without the field are handled per `policy`: a skipped hit contributes
/// neither context nor a document id.
pub fn assemble_context(
    hits: &[SearchHit],
    context_field: &str,
    policy: MissingFieldPolicy,
) -> Result<AssembledContext> {
    let mut chunks = Vec::with_capacity(hits.len());
    let mut document_ids = Vec::with_capacity(hits.len());
    let mut documents = Vec::with_capacity(hits.len());

    for hit in hits {
        let Some(text) = hit.field_str(context_field) else {
            match policy {
                MissingFieldPolicy::Fail => {
                    return Err(AskdeskError::Context(format!(
                        "Hit {} is missing context field '{}'",
                        hit.id, context_field
                    )));
                }
                MissingFieldPolicy::Skip => {
                    tracing::warn!(
                        hit_id = %hit.id,
                        field = context_field,
                        "Dropping hit without context field"
                    );
                    continue;
                }
            }
        };

        chunks.push(text);
        document_ids.push(hit.id.clone());
        documents.push(Value::Object(hit.fields.clone()));
    }

    Ok(AssembledContext {
        context: chunks.join("\n"),
        document_ids,
        documents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn hit(id: &str, fields: &[(&str, Value)]) -> SearchHit {
        let mut map = Map::new();
        for (name, value) in fields {
            map.insert(name.to_string(), value.clone());
        }
        SearchHit {
            id: id.to_string(),
            score: 1.0,
            fields: map,
        }
    }

    #[test]
    fn test_joins_context_in_hit_order() {
        let hits = vec![
            hit("a", &[("text", json!("first"))]),
            hit("b", &[("text", json!("second"))]),
        ];

        let assembled = assemble_context(&hits, "text", MissingFieldPolicy::Fail).unwrap();
        assert_eq!(assembled.context, "first\nsecond");
        assert_eq!(assembled.document_ids, vec!["a", "b"]);
        assert_eq!(assembled.documents.len(), 2);
    }

    #[test]
    fn test_missing_field_fails_by_default_policy() {
        let hits = vec![
            hit("a", &[("text", json!("first"))]),
            hit("b", &[("source", json!("catalog"))]),
        ];

        let result = assemble_context(&hits, "text", MissingFieldPolicy::Fail);
        assert!(matches!(result, Err(AskdeskError::Context(_))));
    }

    #[test]
    fn test_skip_policy_drops_hit_entirely() {
        let hits = vec![
            hit("a", &[("text", json!("first"))]),
            hit("b", &[("source", json!("catalog"))]),
            hit("c", &[("text", json!("third"))]),
        ];

        let assembled = assemble_context(&hits, "text", MissingFieldPolicy::Skip).unwrap();
        assert_eq!(assembled.context, "first\nthird");
        assert_eq!(assembled.document_ids, vec!["a", "c"]);
    }

    #[test]
    fn test_empty_hits_yield_empty_context() {
        let assembled = assemble_context(&[], "text", MissingFieldPolicy::Fail).unwrap();
        assert!(assembled.is_empty());
        assert_eq!(assembled.context, "");
    }
}
