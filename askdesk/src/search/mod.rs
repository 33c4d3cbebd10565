pub mod context;
pub mod rewrite_cache;
mod store;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{KnnRequest, SearchHit};

pub use context::{assemble_context, AssembledContext};
pub use rewrite_cache::RewriteCache;
pub use store::QdrantIndex;

/// What to do when a retrieved hit lacks the configured context field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    /// Abort the turn with a context error.
    Fail,
    /// Drop the hit and assemble context from the rest.
    Skip,
}

impl std::str::FromStr for MissingFieldPolicy {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown missing-field policy '{other}'")),
        }
    }
}

impl std::fmt::Display for MissingFieldPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fail => write!(f, "fail"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Approximate k-NN over the product index.
///
/// Hits come back ordered by descending similarity; ties keep the index's
/// own order. An empty result is a valid outcome, not an error.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn knn(&self, request: &KnnRequest) -> Result<Vec<SearchHit>>;

    /// Cheap reachability probe used by the startup readiness wait.
    async fn ping(&self) -> Result<()>;
}
