use reqwest::header::CONTENT_LENGTH;
use tracing::debug;
use url::Url;

use crate::common::error::LoadError;

/// Streams an HTTP(S) body, refusing anything larger than `max_bytes`.
pub struct ReqwestHttp {
    client: reqwest::Client,
}

impl Default for ReqwestHttp {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestHttp {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, url: &Url, max_bytes: u64) -> Result<Vec<u8>, LoadError> {
        let resource = url.to_string();
        let transport = |e: reqwest::Error| LoadError::Transport {
            resource: resource.clone(),
            message: e.to_string(),
        };

        let mut resp = self.client.get(url.clone()).send().await.map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                resource: resource.clone(),
                status: status.as_u16(),
            });
        }

        let declared: Option<u64> = resp
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        if let Some(size) = declared {
            if size > max_bytes {
                return Err(LoadError::TooLarge {
                    resource: resource.clone(),
                    size,
                    limit: max_bytes,
                });
            }
        }

        let mut bytes = Vec::with_capacity(declared.unwrap_or(0) as usize);
        while let Some(chunk) = resp.chunk().await.map_err(transport)? {
            let received = (bytes.len() + chunk.len()) as u64;
            if received > max_bytes {
                return Err(LoadError::TooLarge {
                    resource: resource.clone(),
                    size: received,
                    limit: max_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        debug!(resource = %resource, bytes = bytes.len(), "fetched remote resource");
        Ok(bytes)
    }
}
