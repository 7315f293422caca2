use std::path::Path;

use crate::common::error::LoadError;

/// Reads a local extract after checking its size against `max_bytes`.
pub async fn read_bounded(path: &Path, max_bytes: u64) -> Result<Vec<u8>, LoadError> {
    let resource = path.display().to_string();
    let io_err = |source: std::io::Error| LoadError::Io {
        resource: resource.clone(),
        source,
    };

    let size = tokio::fs::metadata(path).await.map_err(io_err)?.len();
    if size > max_bytes {
        return Err(LoadError::TooLarge {
            resource: resource.clone(),
            size,
            limit: max_bytes,
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(io_err)?;
    // The file may have grown between the two calls.
    if bytes.len() as u64 > max_bytes {
        return Err(LoadError::TooLarge {
            resource: resource.clone(),
            size: bytes.len() as u64,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}
