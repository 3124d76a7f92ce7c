// src/fetch/mod.rs
pub mod gateway;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::Message;

/// Incremental fetch capability for one channel.
///
/// Implementations return messages strictly newer than `after_id`,
/// ascending by id. With no watermark they bound themselves to the last
/// `lookback_hours` instead of walking full history.
#[async_trait]
pub trait ChannelFetcher: Send + Sync {
    async fn fetch_since(
        &self,
        channel: &str,
        after_id: Option<i64>,
        lookback_hours: u32,
    ) -> Result<Vec<Message>, FetchError>;

    fn name(&self) -> &'static str;
}
