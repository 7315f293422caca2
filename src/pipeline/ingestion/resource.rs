use std::fmt;
use std::path::PathBuf;

use url::Url;

use crate::common::error::LoadError;

/// A tabular source: remote (`http`/`https`) or a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Url(Url),
    File(PathBuf),
}

impl Resource {
    pub fn parse(location: &str) -> Result<Self, LoadError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(LoadError::InvalidResource(location.to_string()));
        }
        let lowered = location.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            let url = Url::parse(location)
                .map_err(|e| LoadError::InvalidResource(format!("{}: {}", location, e)))?;
            return Ok(Resource::Url(url));
        }
        Ok(Resource::File(PathBuf::from(location)))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Url(url) => write!(f, "{}", url),
            Resource::File(path) => write!(f, "{}", path.display()),
        }
    }
}
