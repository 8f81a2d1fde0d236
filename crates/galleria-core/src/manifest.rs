//! Read-only baseline photo list.

use std::path::{Path, PathBuf};

use crate::model::{parse_records, PhotoRecord};

pub trait ManifestSource {
    /// Raw response body.
    fn fetch(&self) -> anyhow::Result<String>;
    fn describe(&self) -> String;
}

pub struct FileManifest {
    path: PathBuf,
}

impl FileManifest {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ManifestSource for FileManifest {
    fn fetch(&self) -> anyhow::Result<String> {
        Ok(std::fs::read_to_string(&self.path)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Manifest that is always empty, for pages without one.
pub struct NoManifest;

impl ManifestSource for NoManifest {
    fn fetch(&self) -> anyhow::Result<String> {
        Ok("[]".to_string())
    }

    fn describe(&self) -> String {
        "none".to_string()
    }
}

#[cfg(feature = "http")]
pub struct HttpManifest {
    url: String,
}

#[cfg(feature = "http")]
impl HttpManifest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[cfg(feature = "http")]
impl ManifestSource for HttpManifest {
    fn fetch(&self) -> anyhow::Result<String> {
        let resp = reqwest::blocking::Client::new()
            .get(&self.url)
            .header("Cache-Control", "no-store")
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("manifest request answered HTTP {}", status);
        }
        Ok(resp.text()?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Pick a source from a location string: http(s) URLs go over the network,
/// anything else is a file path.
pub fn source_for(location: &str) -> Box<dyn ManifestSource> {
    #[cfg(feature = "http")]
    {
        if location.starts_with("http://") || location.starts_with("https://") {
            return Box::new(HttpManifest::new(location));
        }
    }
    Box::new(FileManifest::new(location))
}

/// Fetch and normalize. Network failures and malformed bodies yield an
/// empty list.
pub fn load_manifest(source: &dyn ManifestSource) -> Vec<PhotoRecord> {
    match source.fetch() {
        Ok(body) => {
            let list = parse_records(&body);
            tracing::debug!(source = %source.describe(), count = list.len(), "manifest loaded");
            list
        }
        Err(e) => {
            tracing::warn!(source = %source.describe(), error = %e, "manifest unavailable; showing local photos only");
            Vec::new()
        }
    }
}
