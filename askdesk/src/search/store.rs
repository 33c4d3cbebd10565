use async_trait::async_trait;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, value::Kind, PayloadIncludeSelector, SearchParamsBuilder,
    SearchPointsBuilder,
};
use qdrant_client::Qdrant;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::config::SearchConfig;
use crate::error::{AskdeskError, Result};
use crate::models::{KnnRequest, SearchHit};

use super::VectorIndex;

/// Qdrant-backed product index.
///
/// The collection carries one named vector per embedding backend; the request
/// picks which one to search with `embedding_field`.
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
}

impl QdrantIndex {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Qdrant::from_url(&config.url)
            .build()
            .map_err(|e| AskdeskError::Search(format!("Qdrant client build failed: {e}")))?;

        Ok(Self {
            client,
            collection: config.collection.clone(),
        })
    }

    fn point_id_string(point_id: &qdrant_client::qdrant::PointId) -> Option<String> {
        match point_id.point_id_options.as_ref()? {
            PointIdOptions::Uuid(uuid) => Some(uuid.clone()),
            PointIdOptions::Num(num) => Some(num.to_string()),
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn knn(&self, request: &KnnRequest) -> Result<Vec<SearchHit>> {
        if request.vector.is_empty() {
            return Err(AskdeskError::Validation(
                "Search vector cannot be empty".to_string(),
            ));
        }

        let builder = SearchPointsBuilder::new(
            &self.collection,
            request.vector.clone(),
            request.limit,
        )
        .vector_name(request.embedding_field.clone())
        .with_payload(PayloadIncludeSelector {
            fields: request.fields.clone(),
        })
        .params(SearchParamsBuilder::default().hnsw_ef(request.num_candidates));

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| AskdeskError::Search(format!("Vector search failed: {e}")))?;

        let mut hits = Vec::with_capacity(response.result.len());
        for point in response.result {
            let Some(id) = point.id.as_ref().and_then(Self::point_id_string) else {
                continue;
            };

            let mut fields = JsonMap::new();
            for (name, value) in point.payload {
                fields.insert(name, qdrant_value_to_json(value));
            }

            hits.push(SearchHit {
                id,
                score: point.score,
                fields,
            });
        }

        Ok(hits)
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .health_check()
            .await
            .map(|_| ())
            .map_err(|e| AskdeskError::Search(format!("Index unreachable: {e}")))
    }
}

fn qdrant_value_to_json(value: qdrant_client::qdrant::Value) -> JsonValue {
    match value.kind {
        Some(Kind::NullValue(_)) | None => JsonValue::Null,
        Some(Kind::BoolValue(b)) => JsonValue::Bool(b),
        Some(Kind::IntegerValue(i)) => JsonValue::from(i),
        Some(Kind::DoubleValue(d)) => {
            serde_json::Number::from_f64(d).map_or(JsonValue::Null, JsonValue::Number)
        }
        Some(Kind::StringValue(s)) => JsonValue::String(s),
        Some(Kind::ListValue(list)) => {
            JsonValue::Array(list.values.into_iter().map(qdrant_value_to_json).collect())
        }
        Some(Kind::StructValue(map)) => {
            let mut object = JsonMap::new();
            for (key, nested) in map.fields {
                object.insert(key, qdrant_value_to_json(nested));
            }
            JsonValue::Object(object)
        }
    }
}
