mod pipeline;
mod session;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ServerEvent;

pub use pipeline::{ChatPipeline, USER_ID};
pub use session::ChatSession;

/// Outbound half of one client connection.
///
/// The pipeline awaits every emit before pulling the next answer fragment,
/// so an implementation's send completing is what preserves fragment order.
/// A failed emit aborts the turn.
#[async_trait]
pub trait EventSink: Send {
    async fn emit(&mut self, event: &ServerEvent) -> Result<()>;
}
