use async_trait::async_trait;

use crate::common::error::LoadError;
use crate::pipeline::ingestion::resource::Resource;

/// Fetches the raw bytes of a tabular resource.
///
/// Implementations must fail with [`LoadError::TooLarge`] as soon as either
/// the declared or the received size exceeds `max_bytes`, and with
/// [`LoadError::Status`] on a non-success response. Timeouts are applied by
/// the caller, which drops the returned future to cancel the transfer.
#[async_trait]
pub trait ResourceFetcherPort: Send + Sync {
    async fn fetch(&self, resource: &Resource, max_bytes: u64) -> Result<Vec<u8>, LoadError>;
}
