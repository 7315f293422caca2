// Adapters behind the application ports

pub mod file_source;
pub mod http_client;

use async_trait::async_trait;

use crate::app::ports::ResourceFetcherPort;
use crate::common::error::LoadError;
use crate::pipeline::ingestion::resource::Resource;
use http_client::ReqwestHttp;

/// Fetches URLs over HTTP(S) and paths from the local filesystem.
#[derive(Default)]
pub struct DefaultFetcher {
    http: ReqwestHttp,
}

impl DefaultFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http(http: ReqwestHttp) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ResourceFetcherPort for DefaultFetcher {
    async fn fetch(&self, resource: &Resource, max_bytes: u64) -> Result<Vec<u8>, LoadError> {
        match resource {
            Resource::Url(url) => self.http.get(url, max_bytes).await,
            Resource::File(path) => file_source::read_bounded(path, max_bytes).await,
        }
    }
}
