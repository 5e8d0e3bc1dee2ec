use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::types::book_snapshot::BookSnapshot;
use crate::types::instrument::Instrument;

#[async_trait]
pub trait BookSource: Send + Sync {
    /// Streams validated top-of-book snapshots until the connection ends.
    async fn subscribe(&self, instrument: &Instrument, channel: Sender<BookSnapshot>) -> Result<()>;
}
