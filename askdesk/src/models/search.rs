use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A k-NN request against the remote index. `embedding_field` selects the
/// per-backend vector field; `fields` selects which payload fields come back.
#[derive(Debug, Clone)]
pub struct KnnRequest {
    pub embedding_field: String,
    pub vector: Vec<f32>,
    pub fields: Vec<String>,
    pub limit: u64,
    pub num_candidates: u64,
}

/// One row of a vector search result, ordered by decreasing score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub fields: Map<String, Value>,
}

impl SearchHit {
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}
